//! Fixed-width text normalization.

/// Pads `text` with trailing spaces and truncates it to exactly `cols` characters.
///
/// Width is counted in Unicode scalar values, one per display cell.
pub fn normalize(text: &str, cols: usize) -> String {
    let mut line: String = text.chars().take(cols).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(cols - len));
    line
}

/// Returns a line of `cols` spaces.
pub fn blank(cols: usize) -> String {
    " ".repeat(cols)
}
