use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a record across renders.
///
/// `Index` is the positional fallback used when no key accessor is set. It
/// keeps the old behaviour of matching by position, which means a reordered
/// dataset is reconciled as a set of in-place updates rather than moves.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Index(usize),
    Field(String),
}

impl Key {
    pub fn field(value: impl Into<String>) -> Self {
        Self::Field(value.into())
    }

    /// Key of a child inside a hierarchy: `parent/child`.
    pub fn child(&self, segment: &Key) -> Self {
        Self::Field(format!("{self}/{segment}"))
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Field(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Field(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Field(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}
