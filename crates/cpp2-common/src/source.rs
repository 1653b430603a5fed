//! Source lines and their provenance.

use serde::Serialize;

/// Where a line of source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineCategory {
    /// Written by the user in the translation unit.
    Authored,
    /// Synthesized by a meta-function at compile time.
    Generated,
}

/// One line of source text, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub text: String,
    pub category: LineCategory,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, category: LineCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Split `text` into lines on `\n` boundaries.
///
/// A trailing line terminator does not produce an extra empty line, and a
/// `\r` before the terminator is dropped. Empty input yields no lines.
pub fn split_lines(text: &str, category: LineCategory) -> Vec<SourceLine> {
    let mut lines: Vec<SourceLine> = text
        .split('\n')
        .map(|line| SourceLine::new(line.strip_suffix('\r').unwrap_or(line), category))
        .collect();
    if text.is_empty() || text.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Join lines back into one text, one `\n` between consecutive lines.
pub fn join_lines(lines: &[SourceLine]) -> String {
    let mut text = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(&line.text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[SourceLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn single_line_is_its_own_line() {
        let lines = split_lines("x: int;", LineCategory::Generated);
        assert_eq!(texts(&lines), ["x: int;"]);
        assert_eq!(lines[0].category, LineCategory::Generated);
    }

    #[test]
    fn splits_on_newlines_and_keeps_blank_lines() {
        let lines = split_lines("a: int;\n\nb: int;\n", LineCategory::Authored);
        assert_eq!(texts(&lines), ["a: int;", "", "b: int;"]);
    }

    #[test]
    fn crlf_terminators() {
        let lines = split_lines("a\r\nb", LineCategory::Authored);
        assert_eq!(texts(&lines), ["a", "b"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(split_lines("", LineCategory::Generated).is_empty());
    }

    #[test]
    fn join_round_trips_without_trailing_newline() {
        let lines = split_lines("f: () = {\n}", LineCategory::Generated);
        assert_eq!(join_lines(&lines), "f: () = {\n}");
    }
}
