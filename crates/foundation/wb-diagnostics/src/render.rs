//! Text rendering of collected diagnostics

use crate::{Diagnostic, Severity};
use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use codespan_reporting::files::{Error as FilesError, Files, SimpleFiles};
use codespan_reporting::term;
use std::fmt::Write as _;
use std::string::FromUtf8Error;

/// Failure while rendering diagnostics against source text
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The source database rejected a lookup
    #[error("failed to map diagnostic onto source: {0}")]
    Files(#[from] FilesError),

    /// The terminal renderer produced invalid UTF-8
    #[error("rendered diagnostics are not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// Render diagnostics one per line in `line:column ***ERROR*** message` form
pub fn render_plain<'diag>(diagnostics: impl IntoIterator<Item = &'diag Diagnostic>) -> String {
    let mut output = String::new();
    for diagnostic in diagnostics {
        // Writing to a String cannot fail
        let _ignored = writeln!(output, "{diagnostic}");
    }
    output
}

/// Render diagnostics as rustc-style snippets of `source`
///
/// # Errors
///
/// Returns [`RenderError`] if the renderer fails to write its output.
pub fn render_rich<'diag>(
    diagnostics: impl IntoIterator<Item = &'diag Diagnostic>,
    file_name: &str,
    source: &str,
) -> Result<String, RenderError> {
    let mut files = SimpleFiles::new();
    let file_id = files.add(file_name.to_string(), source.to_string());

    let mut buffer = Vec::new();
    let config = term::Config::default();
    for diagnostic in diagnostics {
        let converted = to_codespan_diagnostic(diagnostic, file_id, &files);
        #[allow(deprecated, reason = "emit still writes into a plain byte buffer")]
        term::emit(&mut buffer, &config, &files, &converted)?;
    }

    Ok(String::from_utf8(buffer)?)
}

/// Convert to codespan diagnostic for rustc-style output
///
/// The label covers the character at the diagnostic's position. A
/// position that falls outside the file yields an unlabelled diagnostic.
pub fn to_codespan_diagnostic(
    diagnostic: &Diagnostic,
    file_id: usize,
    files: &SimpleFiles<String, String>,
) -> CodespanDiagnostic<usize> {
    let converted = match diagnostic.severity {
        Severity::Error => CodespanDiagnostic::error(),
        Severity::Warning => CodespanDiagnostic::warning(),
    }
    .with_message(diagnostic.message.clone());

    match files.line_range(file_id, diagnostic.pos.line_index()) {
        Ok(line) => {
            let start = (line.start + diagnostic.pos.column_offset()).min(line.end);
            let end = (start + 1).min(line.end);
            converted.with_labels(vec![Label::primary(file_id, start..end)])
        }
        Err(_) => converted.with_notes(vec![format!("at {}", diagnostic.pos)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_span::Position;

    #[test]
    fn test_render_plain() {
        let diagnostics = vec![
            Diagnostic::error(Position::new(1, 5), "Non-function declared void"),
            Diagnostic::error(Position::new(2, 6), "Multiply declared identifier"),
        ];

        assert_eq!(
            render_plain(&diagnostics),
            "1:5 ***ERROR*** Non-function declared void\n\
             2:6 ***ERROR*** Multiply declared identifier\n"
        );
    }

    #[test]
    fn test_codespan_label_points_at_column() {
        let source = "int x;\nvoid y;\n";
        let mut files = SimpleFiles::new();
        let file_id = files.add("<input>".to_string(), source.to_string());

        let diagnostic = Diagnostic::error(Position::new(2, 6), "Non-function declared void");
        let converted = to_codespan_diagnostic(&diagnostic, file_id, &files);

        assert_eq!(converted.labels.len(), 1);
        assert_eq!(converted.labels[0].range, 12..13);
        assert_eq!(&source[converted.labels[0].range.clone()], "y");
    }

    #[test]
    fn test_codespan_out_of_range_position() {
        let mut files = SimpleFiles::new();
        let file_id = files.add("<input>".to_string(), "int x;".to_string());

        let diagnostic = Diagnostic::error(Position::new(40, 1), "Undeclared identifier");
        let converted = to_codespan_diagnostic(&diagnostic, file_id, &files);

        assert!(converted.labels.is_empty());
        assert_eq!(converted.notes, vec!["at 40:1".to_string()]);
    }

    #[test]
    fn test_render_rich_includes_source_line() {
        let source = "int x;\nvoid y;\n";
        let diagnostics = vec![Diagnostic::error(
            Position::new(2, 6),
            "Non-function declared void",
        )];

        let output = render_rich(&diagnostics, "prog.wumbo", source).unwrap();
        assert!(output.contains("Non-function declared void"));
        assert!(output.contains("void y;"));
        assert!(output.contains("prog.wumbo"));
    }
}
