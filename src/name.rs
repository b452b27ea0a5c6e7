//! Opaque string identifiers for classes and objects.
//!
//! Unlike the engine's interned, integer-backed symbol ids, class and object
//! names here are just strings the caller chose. They're wrapped in cheap-to-
//! clone newtypes (`Arc<str>` inside) so a `ClassName` can be copied into
//! dozens of index entries without re-allocating the text each time.

use std::fmt;
use std::sync::Arc;

/// The name of a class in a [`crate::classification::ClassificationTree`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClassName(Arc<str>);

impl ClassName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        ClassName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(s: &str) -> Self {
        ClassName::new(s)
    }
}

impl From<String> for ClassName {
    fn from(s: String) -> Self {
        ClassName::new(s)
    }
}

/// The name of an object in a [`crate::model::Model`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ObjectName(Arc<str>);

impl ObjectName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        ObjectName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectName {
    fn from(s: &str) -> Self {
        ObjectName::new(s)
    }
}

impl From<String> for ObjectName {
    fn from(s: String) -> Self {
        ObjectName::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_displays_as_plain_string() {
        let c = ClassName::from("X5");
        assert_eq!(c.to_string(), "X5");
        assert_eq!(c.as_str(), "X5");
    }

    #[test]
    fn class_names_with_equal_text_are_equal_and_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = ClassName::from("Engine");
        let b = ClassName::from("Engine".to_string());
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut names = vec![ClassName::from("X7"), ClassName::from("Series3"), ClassName::from("X5")];
        names.sort();
        assert_eq!(
            names,
            vec![ClassName::from("Series3"), ClassName::from("X5"), ClassName::from("X7")]
        );
    }
}
