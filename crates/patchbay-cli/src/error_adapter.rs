//! Error adapter for converting PatchbayError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! A document rejected for invalid entries carries one issue per entry; each
//! issue is rendered independently. JSON syntax errors point at the offending
//! location in the document.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use patchbay::{PatchbayError, schema::SchemaError};

/// A single problem found in a patch document.
pub struct SchemaDiagnostic<'a> {
    message: String,
    label: Option<(SourceSpan, &'static str)>,
    help: Option<&'static str>,
    src: &'a str,
}

impl<'a> SchemaDiagnostic<'a> {
    /// A JSON syntax or shape error at a 1-based line and column.
    fn syntax(message: String, line: usize, column: usize, src: &'a str) -> Self {
        let label = line_column_to_offset(src, line, column).map(|offset| {
            let len = usize::from(offset < src.len());
            (SourceSpan::new(offset.into(), len), "here")
        });
        Self {
            message,
            label,
            help: Some("patch documents hold `symbols`, `cables` and `version`"),
            src,
        }
    }

    /// An invalid entry with no source location.
    fn issue(message: String, src: &'a str) -> Self {
        Self {
            message,
            label: None,
            help: None,
            src,
        }
    }
}

impl fmt::Debug for SchemaDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDiagnostic")
            .field("message", &self.message)
            .field("label", &self.label)
            .finish()
    }
}

impl fmt::Display for SchemaDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SchemaDiagnostic<'_> {}

impl MietteDiagnostic for SchemaDiagnostic<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("patchbay::schema"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.label
            .is_some()
            .then_some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (span, message) = self.label?;
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some(message.to_string()), span),
        )))
    }
}

/// Adapter for [`PatchbayError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a PatchbayError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            PatchbayError::Io(_) => "patchbay::io",
            PatchbayError::Schema { .. } => "patchbay::schema",
            PatchbayError::Export(_) => "patchbay::export",
            PatchbayError::Config(_) => "patchbay::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A document problem, possibly with a source location.
    Diagnostic(SchemaDiagnostic<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to the end of `src`.
fn line_column_to_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(src.len()))
}

/// Convert a [`PatchbayError`] into a list of reportable errors.
///
/// A schema rejected for invalid entries yields one [`Reportable`] per
/// issue; every other error yields exactly one.
pub fn to_reportables(err: &PatchbayError) -> Vec<Reportable<'_>> {
    match err {
        PatchbayError::Schema {
            err: SchemaError::Json(json),
            src,
        } => vec![Reportable::Diagnostic(SchemaDiagnostic::syntax(
            json.to_string(),
            json.line(),
            json.column(),
            src,
        ))],
        PatchbayError::Schema {
            err: SchemaError::Invalid(issues),
            src,
        } => issues
            .iter()
            .map(|issue| Reportable::Diagnostic(SchemaDiagnostic::issue(issue.to_string(), src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use patchbay::schema::{SchemaData, SchemaIssue};

    use super::*;

    #[test]
    fn test_json_error_points_at_location() {
        let src = "{\n  \"symbols\": [,]\n}";
        let err = SchemaData::from_json(src).unwrap_err();
        let err = PatchbayError::new_schema_error(err, src);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let labels: Vec<_> = reportables[0].labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        // The label sits on the second line, where the stray comma is
        assert_eq!(src[..labels[0].offset()].matches('\n').count(), 1);
        assert!(reportables[0].source_code().is_some());
    }

    #[test]
    fn test_one_reportable_per_issue() {
        let issues = vec![
            SchemaIssue::DuplicateSymbolId("a".into()),
            SchemaIssue::DuplicateCableId("b".into()),
        ];
        let err = PatchbayError::new_schema_error(SchemaError::Invalid(issues), "{}");

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "duplicate symbol id `a`");
        assert_eq!(reportables[1].to_string(), "duplicate cable id `b`");
        assert!(reportables[0].labels().is_none());
    }

    #[test]
    fn test_non_schema_error() {
        let err = PatchbayError::Config("bad color".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad color");
                assert_eq!(e.code().unwrap().to_string(), "patchbay::config");
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_error_codes_per_variant() {
        let cases = [
            (
                PatchbayError::Io(std::io::Error::other("disk")),
                "patchbay::io",
            ),
            (
                PatchbayError::Export(patchbay::export::Error::Render("bad size".into())),
                "patchbay::export",
            ),
            (PatchbayError::Config("bad".into()), "patchbay::config"),
        ];

        for (err, code) in cases {
            let reportables = to_reportables(&err);
            assert_eq!(reportables.len(), 1);
            assert_eq!(reportables[0].code().unwrap().to_string(), code);
        }
    }

    #[test]
    fn test_offset_clamps_past_end() {
        assert_eq!(line_column_to_offset("ab\ncd", 2, 1), Some(3));
        assert_eq!(line_column_to_offset("ab\ncd", 2, 9), Some(5));
        assert_eq!(line_column_to_offset("ab", 0, 1), None);
    }
}
