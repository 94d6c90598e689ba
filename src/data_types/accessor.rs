//! Typed accessor functions.
//!
//! The engine never looks inside a record. Every field it needs is read
//! through one of these accessors, so records can be any caller type.

use super::key::Key;
use crate::error::{AccessorError, ChartError};
use crate::theme::Color;
use std::fmt;
use std::rc::Rc;

/// A value read from a record by the x accessor. Bars use categories, lines
/// and scatter plots use numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Category(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Category(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_category(&self) -> String {
        match self {
            Self::Number(v) => crate::scales::format_number(*v),
            Self::Category(s) => s.clone(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

/// `Record -> V` for one accessor role. Cloning shares the closure.
pub struct Accessor<R, V> {
    f: Rc<dyn Fn(&R) -> Result<V, AccessorError>>,
}

impl<R: 'static, V: 'static> Accessor<R, V> {
    pub fn new(f: impl Fn(&R) -> V + 'static) -> Self {
        Self {
            f: Rc::new(move |r: &R| Ok(f(r))),
        }
    }

    /// Accessor that may fail for some records. A failing record is skipped
    /// and reported as a warning.
    pub fn fallible(f: impl Fn(&R) -> Result<V, AccessorError> + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    pub fn get(&self, record: &R) -> Result<V, AccessorError> {
        (self.f)(record)
    }

    /// Reads a value and tags any failure with the accessor role and the
    /// record position.
    pub fn read(&self, role: &'static str, index: usize, record: &R) -> Result<V, ChartError> {
        self.get(record).map_err(|source| ChartError::Accessor {
            role,
            index,
            source,
        })
    }
}

impl<R, V> Clone for Accessor<R, V> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<R, V> fmt::Debug for Accessor<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Accessor(..)")
    }
}

/// How records are identified for reconciliation.
pub enum KeyFn<R> {
    /// Positional identity. Reordering the data reuses elements by slot.
    Index,
    /// Identity from a record field.
    Field(Accessor<R, String>),
}

impl<R: 'static> KeyFn<R> {
    pub fn field(f: impl Fn(&R) -> String + 'static) -> Self {
        Self::Field(Accessor::new(f))
    }

    pub fn key_of(&self, index: usize, record: &R) -> Result<Key, ChartError> {
        match self {
            Self::Index => Ok(Key::Index(index)),
            Self::Field(accessor) => accessor.read("key", index, record).map(Key::Field),
        }
    }
}

impl<R> Default for KeyFn<R> {
    fn default() -> Self {
        Self::Index
    }
}

impl<R> Clone for KeyFn<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Index => Self::Index,
            Self::Field(a) => Self::Field(a.clone()),
        }
    }
}

impl<R> fmt::Debug for KeyFn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("KeyFn::Index"),
            Self::Field(_) => f.write_str("KeyFn::Field(..)"),
        }
    }
}

/// Children of a hierarchical record.
pub type ChildrenFn<R> = Rc<dyn Fn(&R) -> Vec<R>>;

/// Every function-valued chart option.
pub struct Accessors<R> {
    pub x: Option<Accessor<R, Value>>,
    pub y: Option<Accessor<R, f64>>,
    pub value: Option<Accessor<R, f64>>,
    pub key: KeyFn<R>,
    pub color: Option<Accessor<R, Color>>,
    pub tooltip: Option<Accessor<R, String>>,
    pub label: Option<Accessor<R, String>>,
    pub series: Option<Accessor<R, String>>,
    pub children: Option<ChildrenFn<R>>,
}

impl<R> Default for Accessors<R> {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            value: None,
            key: KeyFn::Index,
            color: None,
            tooltip: None,
            label: None,
            series: None,
            children: None,
        }
    }
}

impl<R> Clone for Accessors<R> {
    fn clone(&self) -> Self {
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
            value: self.value.clone(),
            key: self.key.clone(),
            color: self.color.clone(),
            tooltip: self.tooltip.clone(),
            label: self.label.clone(),
            series: self.series.clone(),
            children: self.children.clone(),
        }
    }
}

impl<R: 'static> Accessors<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x<V: Into<Value> + 'static>(mut self, f: impl Fn(&R) -> V + 'static) -> Self {
        self.x = Some(Accessor::new(move |r| f(r).into()));
        self
    }

    pub fn y(mut self, f: impl Fn(&R) -> f64 + 'static) -> Self {
        self.y = Some(Accessor::new(f));
        self
    }

    pub fn value(mut self, f: impl Fn(&R) -> f64 + 'static) -> Self {
        self.value = Some(Accessor::new(f));
        self
    }

    pub fn try_value(mut self, f: impl Fn(&R) -> Result<f64, AccessorError> + 'static) -> Self {
        self.value = Some(Accessor::fallible(f));
        self
    }

    pub fn key(mut self, f: impl Fn(&R) -> String + 'static) -> Self {
        self.key = KeyFn::field(f);
        self
    }

    pub fn color(mut self, f: impl Fn(&R) -> Color + 'static) -> Self {
        self.color = Some(Accessor::new(f));
        self
    }

    pub fn tooltip(mut self, f: impl Fn(&R) -> String + 'static) -> Self {
        self.tooltip = Some(Accessor::new(f));
        self
    }

    pub fn try_tooltip(
        mut self,
        f: impl Fn(&R) -> Result<String, AccessorError> + 'static,
    ) -> Self {
        self.tooltip = Some(Accessor::fallible(f));
        self
    }

    pub fn label(mut self, f: impl Fn(&R) -> String + 'static) -> Self {
        self.label = Some(Accessor::new(f));
        self
    }

    pub fn series(mut self, f: impl Fn(&R) -> String + 'static) -> Self {
        self.series = Some(Accessor::new(f));
        self
    }

    pub fn children(mut self, f: impl Fn(&R) -> Vec<R> + 'static) -> Self {
        self.children = Some(Rc::new(f));
        self
    }
}

/// Fetches a required accessor or reports which one is missing.
pub fn require<'a, T>(accessor: &'a Option<T>, role: &str, chart: &str) -> Result<&'a T, ChartError> {
    accessor
        .as_ref()
        .ok_or_else(|| ChartError::configuration(format!("{chart} chart requires a `{role}` accessor")))
}
