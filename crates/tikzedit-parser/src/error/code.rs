//! Diagnostic codes.
//!
//! Codes are organized by phase:
//! - `W0xx` - Declaration scanning
//! - `W1xx` - Position clauses
//! - `W2xx` - Position resolution
//! - `W3xx` - Groups

use std::fmt;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // =========================================================================
    // Declaration scanning (W0xx)
    // =========================================================================
    /// A `[` style clause was never closed.
    W001,

    /// A `\node` marker is not followed by a `(name)`.
    W002,

    /// A node declaration has no `{label}`.
    W003,

    /// A node label's braces are unbalanced.
    W004,

    /// A node name is declared more than once.
    ///
    /// The first declaration is used for the model; later ones are still
    /// rewritten on export.
    W005,

    /// A node with `fit=` appears outside a background layer scope.
    W006,

    /// A `\begin{scope}` has no matching `\end{scope}`.
    W007,

    // =========================================================================
    // Position clauses (W1xx)
    // =========================================================================
    /// An `at (x,y)` coordinate could not be read.
    W101,

    /// An `xshift=`/`yshift=` value could not be read.
    W102,

    // =========================================================================
    // Position resolution (W2xx)
    // =========================================================================
    /// A node was placed using a loosely matched reference.
    W201,

    /// A node was placed next to the source of a connector pointing at it.
    W202,

    /// A node was placed on the fallback grid.
    W203,

    /// A connector endpoint does not name a placed node.
    W204,

    // =========================================================================
    // Groups (W3xx)
    // =========================================================================
    /// A group has no member that names a placed node.
    W301,

    /// A group member names no placed node.
    W302,
}

impl DiagnosticCode {
    /// Returns the code as a string (e.g., "W001").
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::W001 => "W001",
            DiagnosticCode::W002 => "W002",
            DiagnosticCode::W003 => "W003",
            DiagnosticCode::W004 => "W004",
            DiagnosticCode::W005 => "W005",
            DiagnosticCode::W006 => "W006",
            DiagnosticCode::W007 => "W007",
            DiagnosticCode::W101 => "W101",
            DiagnosticCode::W102 => "W102",
            DiagnosticCode::W201 => "W201",
            DiagnosticCode::W202 => "W202",
            DiagnosticCode::W203 => "W203",
            DiagnosticCode::W204 => "W204",
            DiagnosticCode::W301 => "W301",
            DiagnosticCode::W302 => "W302",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticCode::W001 => "unterminated style clause",
            DiagnosticCode::W002 => "missing node name",
            DiagnosticCode::W003 => "missing node label",
            DiagnosticCode::W004 => "unterminated node label",
            DiagnosticCode::W005 => "duplicate node name",
            DiagnosticCode::W006 => "fit node outside background layer",
            DiagnosticCode::W007 => "unterminated scope",
            DiagnosticCode::W101 => "unreadable coordinate",
            DiagnosticCode::W102 => "unreadable shift",
            DiagnosticCode::W201 => "loose reference match",
            DiagnosticCode::W202 => "position inferred from connector",
            DiagnosticCode::W203 => "grid fallback placement",
            DiagnosticCode::W204 => "dangling connector",
            DiagnosticCode::W301 => "group without resolvable members",
            DiagnosticCode::W302 => "unknown group member",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(DiagnosticCode::W001.to_string(), "W001");
        assert_eq!(DiagnosticCode::W302.to_string(), "W302");
    }

    #[test]
    fn test_description() {
        assert_eq!(DiagnosticCode::W203.description(), "grid fallback placement");
    }
}
