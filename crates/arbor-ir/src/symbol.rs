//! Names interned once per process so nodes can carry them by value.

use std::fmt;
use std::sync::LazyLock;

use lasso::{Rodeo, Spur};
use parking_lot::RwLock;

static NAMES: LazyLock<RwLock<Rodeo>> = LazyLock::new(|| RwLock::new(Rodeo::default()));

/// Interned name of a value, callee, declaration or type.
///
/// Equality is key equality; the text is only looked up for display.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    pub fn new(text: &'static str) -> Self {
        if let Some(key) = NAMES.read().get(text) {
            return Symbol(key);
        }
        Symbol(NAMES.write().get_or_intern_static(text))
    }

    /// Intern a name built at runtime.
    pub fn from_dynamic(text: &str) -> Self {
        if let Some(key) = NAMES.read().get(text) {
            return Symbol(key);
        }
        Symbol(NAMES.write().get_or_intern(text))
    }

    fn resolve<R>(self, f: impl FnOnce(&str) -> R) -> R {
        // Recursive so a nested `Display` on the same thread cannot deadlock.
        f(NAMES.read_recursive().resolve(&self.0))
    }
}

impl From<&'static str> for Symbol {
    fn from(text: &'static str) -> Self {
        Symbol::new(text)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.resolve(|text| text == *other)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.resolve(|text| f.write_str(text))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.resolve(|text| write!(f, "Symbol({text:?})"))
    }
}
