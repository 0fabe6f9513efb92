//! Node and group names backed by string interning
//!
//! Names are compared constantly during resolution (every relative reference,
//! every connector endpoint, every group member), so they are interned once and
//! handled as [`Id`] copies afterwards.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for name storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned name of a node or group
///
/// # Examples
///
/// ```
/// use tikzedit_core::identifier::Id;
///
/// let api = Id::new("api");
/// assert_eq!(api, "api");
/// assert_eq!(api, Id::new("api"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Looks up a name without interning it.
    ///
    /// Returns `None` when the name was never seen, which means no node or
    /// group can carry it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tikzedit_core::identifier::Id;
    ///
    /// let db = Id::new("orders_db");
    /// assert_eq!(Id::lookup("orders_db"), Some(db));
    /// assert_eq!(Id::lookup("never_interned_name_xyz"), None);
    /// ```
    pub fn lookup(name: &str) -> Option<Self> {
        interner().get(name).map(Self)
    }

    /// Runs `f` with the string behind this identifier.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }

    /// Case-insensitive comparison against a plain string.
    pub fn eq_ignore_case(self, other: &str) -> bool {
        self.with_str(|s| s.eq_ignore_ascii_case(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.with_str(str::to_owned);
        f.write_str(&name)
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
