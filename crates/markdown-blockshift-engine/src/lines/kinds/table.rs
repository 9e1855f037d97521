/// Pipe table rows.
pub struct TableRow;

impl TableRow {
    pub const PIPE: char = '|';

    /// A table line starts with `|` once indentation is skipped.
    pub fn is_row(remainder: &str) -> bool {
        remainder.trim_start().starts_with(Self::PIPE)
    }
}
