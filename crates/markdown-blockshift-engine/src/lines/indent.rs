use serde::{Deserialize, Serialize};

/// Column width and byte length of the leading whitespace of `text`.
///
/// Tabs advance to the next multiple of `tab_width`.
pub fn leading_width(text: &str, tab_width: usize) -> (usize, usize) {
    let tab_width = tab_width.max(1);
    let mut width = 0usize;
    let mut bytes = 0usize;
    for b in text.bytes() {
        match b {
            b' ' => width += 1,
            b'\t' => width += tab_width - (width % tab_width),
            _ => break,
        }
        bytes += 1;
    }
    (width, bytes)
}

/// Indentation style detected in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize), // Number of spaces per indent level
    Tabs,          // Tab characters
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(2)
    }
}

impl IndentStyle {
    /// Detect the indent style by finding the first indented, non-blank line.
    pub fn detect<'a>(lines: impl IntoIterator<Item = &'a str>) -> IndentStyle {
        for line in lines {
            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            // Check for tab indentation first
            if line.starts_with('\t') {
                return IndentStyle::Tabs;
            }

            // Check for space indentation
            let spaces = line.chars().take_while(|&c| c == ' ').count();
            if spaces > 0 {
                return IndentStyle::Spaces(spaces);
            }
        }

        IndentStyle::default()
    }

    /// Column width of one indent level.
    pub fn unit_width(&self, tab_width: usize) -> usize {
        match self {
            IndentStyle::Tabs => tab_width.max(1),
            IndentStyle::Spaces(n) => (*n).max(1),
        }
    }

    /// Renders whitespace covering `width` columns in this style.
    pub fn render(&self, width: usize, tab_width: usize) -> String {
        match self {
            IndentStyle::Tabs => {
                let tab_width = tab_width.max(1);
                let mut out = "\t".repeat(width / tab_width);
                out.push_str(&" ".repeat(width % tab_width));
                out
            }
            IndentStyle::Spaces(_) => " ".repeat(width),
        }
    }
}
