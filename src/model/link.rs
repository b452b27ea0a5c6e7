//! Links between objects or classes, and their kind.

use crate::name::ObjectName;

/// The kind of relationship a [`Link`] asserts.
///
/// `Regular` links are plain observed facts between two concrete objects.
/// `Must`/`MustNot` are class-level rules the learner maintains (every
/// instance of the source class must/must not link to an instance of the
/// target class). `MustBeA` ties an object to its class and is kept as a
/// link so classification is rewritten the same way any other link is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Regular,
    Must,
    MustNot,
    MustBeA,
}

/// A directed edge from `source` to `target`. For `Regular`/`MustBeA` links
/// `source`/`target` name concrete objects; for `Must`/`MustNot` rules they
/// name classes (enforced by the caller, not the type system, matching the
/// way the model's own link fields are reused across both levels).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub source: ObjectName,
    pub target: ObjectName,
    pub kind: LinkKind,
}

impl Link {
    pub fn new(source: impl Into<ObjectName>, target: impl Into<ObjectName>, kind: LinkKind) -> Self {
        Link {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn regular(source: impl Into<ObjectName>, target: impl Into<ObjectName>) -> Self {
        Link::new(source, target, LinkKind::Regular)
    }

    pub fn must(source: impl Into<ObjectName>, target: impl Into<ObjectName>) -> Self {
        Link::new(source, target, LinkKind::Must)
    }

    pub fn must_not(source: impl Into<ObjectName>, target: impl Into<ObjectName>) -> Self {
        Link::new(source, target, LinkKind::MustNot)
    }

    pub fn must_be_a(source: impl Into<ObjectName>, target: impl Into<ObjectName>) -> Self {
        Link::new(source, target, LinkKind::MustBeA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_the_right_kind() {
        assert_eq!(Link::regular("a", "b").kind, LinkKind::Regular);
        assert_eq!(Link::must("a", "b").kind, LinkKind::Must);
        assert_eq!(Link::must_not("a", "b").kind, LinkKind::MustNot);
        assert_eq!(Link::must_be_a("a", "b").kind, LinkKind::MustBeA);
    }

    #[test]
    fn links_with_same_fields_are_equal() {
        assert_eq!(Link::must("X5", "XDrive"), Link::must("X5", "XDrive"));
        assert_ne!(Link::must("X5", "XDrive"), Link::must_not("X5", "XDrive"));
    }
}
