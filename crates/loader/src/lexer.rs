//! Line scanner for FlowCode source text.

/// Reduce a source line to its meaningful words.
///
/// A `#` begins a comment running to end of line; words are separated by any
/// whitespace. Blank and comment-only lines come back empty.
pub(crate) fn split_line(line: &str) -> Vec<&str> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.split_whitespace().collect()
}

/// Whether a word is the source header, case-insensitively.
pub(crate) fn is_header(word: &str) -> bool {
    word.eq_ignore_ascii_case(".FLOWCODE")
}
