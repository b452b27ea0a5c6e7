//! Objects and attribute values.

use indexmap::IndexMap;
use indexmap::IndexSet;
use ordered_float::OrderedFloat;

use crate::name::{ClassName, ObjectName};

/// A single scalar an attribute's `Set` variant can hold: either a number
/// (wrapped so it is `Eq`/`Hash`, e.g. `cylinders`) or an enumerated token
/// (e.g. a transmission type name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AttrScalar {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl From<f64> for AttrScalar {
    fn from(v: f64) -> Self {
        AttrScalar::Number(OrderedFloat(v))
    }
}

impl From<&str> for AttrScalar {
    fn from(v: &str) -> Self {
        AttrScalar::Text(v.to_string())
    }
}

impl From<String> for AttrScalar {
    fn from(v: String) -> Self {
        AttrScalar::Text(v)
    }
}

/// The value bound to an attribute on an object or carried as a class-level
/// constraint in a rule. A plain scalar narrows on exact match; an interval
/// narrows to a numeric range; a set enumerates the acceptable discrete
/// values (what `enlarge_set` grows).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Scalar(AttrScalar),
    Interval(OrderedFloat<f64>, OrderedFloat<f64>),
    Set(IndexSet<AttrScalar>),
}

impl AttrValue {
    /// True if `value` satisfies this constraint: equal for `Scalar`, within
    /// bounds (inclusive) for `Interval`, and membership for `Set`.
    pub fn accepts(&self, value: &AttrScalar) -> bool {
        match self {
            AttrValue::Scalar(s) => s == value,
            AttrValue::Interval(lo, hi) => match value {
                AttrScalar::Number(n) => *n >= *lo && *n <= *hi,
                AttrScalar::Text(_) => false,
            },
            AttrValue::Set(set) => set.contains(value),
        }
    }
}

/// A named, classified object inside a [`crate::model::Model`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Object {
    pub name: ObjectName,
    pub class_name: ClassName,
    pub attributes: IndexMap<String, AttrValue>,
}

impl Object {
    pub fn new(name: impl Into<ObjectName>, class_name: impl Into<ClassName>) -> Self {
        Object {
            name: name.into(),
            class_name: class_name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(attr.into(), value);
        self
    }
}
