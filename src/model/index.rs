//! Secondary indices over a [`super::Model`]'s links.
//!
//! The upstream knowledge graph keeps a `DashMap`-backed predicate index for
//! concurrent lookup; the learner's `Model` is single-threaded (spec's
//! concurrency model is cooperative, not shared-memory), so the same idea —
//! don't linear-scan every link on every query — is expressed with plain
//! insertion-ordered maps instead.

use indexmap::{IndexMap, IndexSet};

use crate::model::link::{Link, LinkKind};
use crate::name::ObjectName;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ModelIndex {
    by_source: IndexMap<ObjectName, Vec<Link>>,
    by_target: IndexMap<ObjectName, Vec<Link>>,
    pairs: IndexSet<(ObjectName, ObjectName, LinkKind)>,
}

impl ModelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: &Link) {
        self.by_source.entry(link.source.clone()).or_default().push(link.clone());
        self.by_target.entry(link.target.clone()).or_default().push(link.clone());
        self.pairs.insert((link.source.clone(), link.target.clone(), link.kind));
    }

    pub fn remove(&mut self, link: &Link) {
        if let Some(v) = self.by_source.get_mut(&link.source) {
            v.retain(|l| l != link);
        }
        if let Some(v) = self.by_target.get_mut(&link.target) {
            v.retain(|l| l != link);
        }
        self.pairs.shift_remove(&(link.source.clone(), link.target.clone(), link.kind));
    }

    pub fn contains(&self, link: &Link) -> bool {
        self.pairs.contains(&(link.source.clone(), link.target.clone(), link.kind))
    }

    pub fn from_source(&self, name: &ObjectName) -> &[Link] {
        self.by_source.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn to_target(&self, name: &ObjectName) -> &[Link] {
        self.by_target.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_contains() {
        let mut idx = ModelIndex::new();
        let link = Link::must("X5", "XDrive");
        idx.insert(&link);
        assert!(idx.contains(&link));
        assert_eq!(idx.from_source(&"X5".into()).len(), 1);
        assert_eq!(idx.to_target(&"XDrive".into()).len(), 1);
    }

    #[test]
    fn remove_clears_all_three_structures() {
        let mut idx = ModelIndex::new();
        let link = Link::must("X5", "XDrive");
        idx.insert(&link);
        idx.remove(&link);
        assert!(!idx.contains(&link));
        assert!(idx.from_source(&"X5".into()).is_empty());
        assert!(idx.to_target(&"XDrive".into()).is_empty());
    }

    #[test]
    fn distinct_kinds_between_same_pair_are_distinct_entries() {
        let mut idx = ModelIndex::new();
        idx.insert(&Link::must("X5", "XDrive"));
        idx.insert(&Link::must_not("X5", "XDrive"));
        assert_eq!(idx.from_source(&"X5".into()).len(), 2);
    }
}
