/// Horizontal rule (`---`, `* * *`, `___`).
pub struct ThematicBreak;

impl ThematicBreak {
    pub const CHARS: [char; 3] = ['-', '*', '_'];

    /// Three or more of the same rule character, optionally space separated,
    /// and nothing else on the line.
    pub fn is_break(remainder: &str) -> bool {
        let mut rule_char = None;
        let mut count = 0usize;
        for c in remainder.trim().chars() {
            match c {
                ' ' | '\t' => continue,
                c if Self::CHARS.contains(&c) => match rule_char {
                    None => {
                        rule_char = Some(c);
                        count = 1;
                    }
                    Some(r) if r == c => count += 1,
                    Some(_) => return false,
                },
                _ => return false,
            }
        }
        count >= 3
    }
}
