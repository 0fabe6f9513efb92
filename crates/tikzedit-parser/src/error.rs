//! Diagnostic system for the tikzedit parser.
//!
//! Parsing never fails. Every anomaly (an unreadable declaration, a guessed
//! position, a dangling reference) is absorbed locally and reported as a
//! [`Diagnostic`] carrying a [`DiagnosticCode`], labeled source spans and
//! optional help text.
//!
//! # Example
//!
//! ```
//! # use tikzedit_parser::{Span, error::{Diagnostic, DiagnosticCode}};
//! let diag = Diagnostic::warning("node label is never closed")
//!     .with_code(DiagnosticCode::W004)
//!     .with_label(Span::new(40..52), "label starts here")
//!     .with_help("balance the braces of the label");
//! assert!(diag.severity().is_warning());
//! ```

mod code;
mod collector;
mod diagnostic;
mod label;
mod severity;

pub use code::DiagnosticCode;
pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use label::Label;
pub use severity::Severity;
