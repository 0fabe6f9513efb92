//! Collector for accumulating diagnostics during a processing phase.

use log::{debug, warn};

use crate::error::Diagnostic;

/// Accumulates diagnostics so a phase can report every anomaly it absorbed
/// instead of stopping at the first one.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_warning() {
            warn!(code:? = diagnostic.code(); "{}", diagnostic.message());
        } else {
            debug!(code:? = diagnostic.code(); "{}", diagnostic.message());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Number of diagnostics emitted so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish collection and return every diagnostic in emission order.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticCode;

    #[test]
    fn test_collector_new_is_empty() {
        let collector = DiagnosticCollector::new();
        assert!(collector.is_empty());
        assert!(collector.finish().is_empty());
    }

    #[test]
    fn test_collector_preserves_order() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("first").with_code(DiagnosticCode::W002));
        collector.emit(Diagnostic::note("second"));
        collector.emit(Diagnostic::warning("third"));

        assert_eq!(collector.len(), 3);
        let messages: Vec<_> = collector
            .finish()
            .iter()
            .map(|d| d.message().to_string())
            .collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }
}
