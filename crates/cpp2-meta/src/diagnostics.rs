//! Ariadne-based rendering of unit diagnostics.
//!
//! A diagnostic points either into the authored file or into one of the
//! unit's generated-source records; rendering resolves the position against
//! whichever text it came from. Unknown positions render as a bare message.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use serde::Serialize;

use cpp2_common::diagnostic::Diagnostic;
use cpp2_common::span::{LineIndex, SourceOrigin};

use crate::generated::GeneratedSources;

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticOptions {
    /// Colorize human-readable output.
    pub color: bool,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
}

impl DiagnosticOptions {
    /// Plain text, no color: the form used in tests.
    pub fn colorless() -> Self {
        Self::default()
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    severity: &'static str,
    message: &'a str,
    line: u32,
    col: u32,
    /// Generated-source record number, `null` for authored code.
    generated: Option<u32>,
}

/// Render one diagnostic as a single JSON line (without trailing newline).
pub fn render_json(diagnostic: &Diagnostic) -> String {
    let generated = match diagnostic.position.origin {
        SourceOrigin::Authored => None,
        SourceOrigin::Generated(n) => Some(n),
    };
    let json = JsonDiagnostic {
        severity: "error",
        message: &diagnostic.message,
        line: diagnostic.position.line,
        col: diagnostic.position.col,
        generated,
    };
    serde_json::to_string(&json).unwrap_or_else(|_| diagnostic.to_string())
}

/// Render one diagnostic for humans, or as JSON when `options.json` is set.
///
/// `source` is the authored text; positions in generated code are resolved
/// against the matching record in `generated`.
pub fn render_diagnostic(
    diagnostic: &Diagnostic,
    source: &str,
    generated: &GeneratedSources,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    if options.json {
        return format!("{}\n", render_json(diagnostic));
    }

    let config = Config::default()
        .with_color(options.color)
        .with_index_type(IndexType::Byte);
    let position = diagnostic.position;

    let (text, file) = match position.origin {
        SourceOrigin::Authored => (source.to_string(), filename.to_string()),
        SourceOrigin::Generated(n) => match generated.record_text(n) {
            Some(text) => (text, format!("<generated #{n}>")),
            None => (String::new(), format!("<generated #{n}>")),
        },
    };

    let span = if position.is_unknown() {
        None
    } else {
        label_range(&text, position.line, position.col)
    };

    let report = match span {
        Some(span) => {
            let label_color = if options.color { Color::Red } else { Color::Primary };
            Report::build(ReportKind::Error, span.clone())
                .with_message(&diagnostic.message)
                .with_config(config)
                .with_label(
                    Label::new(span)
                        .with_message(format!("in {file}"))
                        .with_color(label_color),
                )
                .finish()
        }
        None => Report::build(ReportKind::Error, 0..0)
            .with_message(&diagnostic.message)
            .with_config(config)
            .finish(),
    };

    let mut buf = Vec::new();
    if report.write(Source::from(text.as_str()), &mut buf).is_err() {
        return format!("{diagnostic}\n");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Byte range of the character at (line, col), clamped to the text.
fn label_range(text: &str, line: u32, col: u32) -> Option<Range<usize>> {
    if text.is_empty() {
        return None;
    }
    let offset = LineIndex::new(text).offset(line, col)? as usize;
    let mut start = offset.min(text.len() - 1);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let width = text[start..].chars().next().map_or(1, char::len_utf8);
    Some(start..start + width)
}
