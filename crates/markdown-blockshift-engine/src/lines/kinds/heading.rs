/// ATX headings (`#` through `######`).
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: u8 = 6;

    /// Heading level of an unindented ATX heading line.
    pub fn level(remainder: &str) -> Option<u8> {
        let hashes = remainder.chars().take_while(|&c| c == Self::MARKER).count();
        if hashes == 0 || hashes > Self::MAX_LEVEL as usize {
            return None;
        }
        match remainder[hashes..].chars().next() {
            None | Some(' ') | Some('\t') => Some(hashes as u8),
            Some(_) => None,
        }
    }
}
