//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// Nothing in a document is fatal: every anomaly is absorbed and reported.
/// - [`Severity::Warning`] marks input that was skipped or guessed at
/// - [`Severity::Note`] marks input that was accepted but is probably not
///   what the author meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Note,
}

impl Severity {
    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Returns `true` if this is a note severity.
    pub fn is_note(&self) -> bool {
        matches!(self, Severity::Note)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}
