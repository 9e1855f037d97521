// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\nParagraph with some content.\n\n- Bullet point\n  - Nested item\n    - Deeper item\n- Another item\n\n1. First\n2. Second\n\n> Quoted line\n> [!note] Callout\n> body\n\n| a | b |\n| - | - |\n\n```rust\nfn example() {}\n```\n\n---\n";
    base.repeat(size)
}

/// Roughly `lines` lines of mixed markdown.
#[allow(dead_code)]
pub fn generate_lines(lines: usize) -> String {
    let per_repeat = generate_markdown_content(1).lines().count();
    generate_markdown_content(lines.div_ceil(per_repeat))
}

#[allow(dead_code)]
pub fn generate_deep_list(depth: usize) -> String {
    let mut content = String::new();
    for level in 0..depth {
        content.push_str(&"  ".repeat(level));
        content.push_str(&format!("- level {level}\n"));
    }
    content
}
