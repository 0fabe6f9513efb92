//! Adapters for rendering tikzedit diagnostics and errors with miette.
//!
//! The library reports absorbed anomalies as [`Diagnostic`]s on the model
//! and outer-surface failures as [`TikzEditError`]. Both are bridged here to
//! miette's rich report formatting; each diagnostic is rendered on its own.

use std::fmt;

use miette::{
    Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, Severity as MietteSeverity,
    SourceSpan,
};

use tikzedit::{Diagnostic, Model, Severity, TikzEditError};

/// Adapter for a single tikzedit diagnostic.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Warning => MietteSeverity::Warning,
            Severity::Note => MietteSeverity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`TikzEditError`], which carries no source location.
pub struct ErrorAdapter<'a>(pub &'a TikzEditError);

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
            TikzEditError::Io(_) => "tikzedit::io",
            TikzEditError::Config(_) => "tikzedit::config",
            TikzEditError::UnknownNode(_) | TikzEditError::UnknownGroup(_) => "tikzedit::edit",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            TikzEditError::UnknownNode(_) => Some(Box::new("check the name passed to --move")),
            TikzEditError::UnknownGroup(_) => Some(Box::new("check the name passed to --resize")),
            _ => None,
        }
    }
}

/// Convert a parser [`Span`](tikzedit_parser::Span) to a miette [`SourceSpan`].
fn span_to_miette(span: tikzedit_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// One adapter per diagnostic attached to `model`, in report order.
pub fn diagnostic_adapters(model: &Model) -> Vec<DiagnosticAdapter<'_>> {
    model
        .diagnostics()
        .iter()
        .map(|diag| DiagnosticAdapter::new(diag, model.source()))
        .collect()
}

/// Renders a report to a string with miette's graphical handler.
pub fn render(report: &dyn MietteDiagnostic) -> String {
    let reporter = GraphicalReportHandler::new();
    let mut writer = String::new();
    if let Err(err) = reporter.render_report(&mut writer, report) {
        writer = format!("{report} (report rendering failed: {err})");
    }
    writer
}

#[cfg(test)]
mod tests {
    use tikzedit::{DiagnosticCode, parse};
    use tikzedit_parser::Span;

    use super::*;

    #[test]
    fn test_model_diagnostics_are_adapted() {
        let model = parse(r"\node (a) at (0,0) {A}; \draw (a) -- (ghost);");
        let adapters = diagnostic_adapters(&model);
        assert_eq!(adapters.len(), 1);
        assert_eq!(
            adapters[0].code().map(|c| c.to_string()),
            Some(DiagnosticCode::W204.to_string())
        );
        assert_eq!(adapters[0].severity(), Some(MietteSeverity::Warning));
        assert!(render(&adapters[0]).contains("ghost"));
    }

    #[test]
    fn test_all_labels_returned() {
        let diag = Diagnostic::note("duplicate")
            .with_label(Span::new(0..5), "primary label")
            .with_secondary_label(Span::new(10..15), "secondary label");

        let adapter = DiagnosticAdapter::new(&diag, "some source code");

        let labels: Vec<_> = adapter.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("primary label"));
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(adapter.severity(), Some(MietteSeverity::Advice));
    }

    #[test]
    fn test_error_codes() {
        let err = TikzEditError::UnknownNode("api".to_string());
        let adapter = ErrorAdapter(&err);
        assert_eq!(adapter.to_string(), "Unknown node `api`");
        assert_eq!(adapter.code().map(|c| c.to_string()), Some("tikzedit::edit".to_string()));
        assert!(adapter.help().is_some());
    }
}
