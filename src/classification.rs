//! The classification hierarchy: a rooted forest of class names.
//!
//! Mirrors the shape of the upstream predicate hierarchy (parent/child maps
//! built once, queried by BFS-style ancestor walks), but over class names
//! instead of predicates, and with insertion-ordered maps throughout so
//! ancestor walks are reproducible across runs — idempotence of the
//! heuristic pipeline depends on that.

use indexmap::{IndexMap, IndexSet};

use crate::error::ClassificationError;
use crate::name::ClassName;

/// A rooted forest over class names: every class has at most one parent,
/// and no class may be reachable from itself by following parent edges
/// (invariant I1). A class with no parent is a root (invariant I2: roots
/// form the top of their own tree, there is no single universal root).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ClassificationTree {
    parents: IndexMap<ClassName, ClassName>,
    children: IndexMap<ClassName, IndexSet<ClassName>>,
    registered: IndexSet<ClassName>,
}

impl ClassificationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class` in the tree, optionally under `parent`.
    ///
    /// `parent` need not already be registered; if it isn't, it is
    /// registered as a root first. Returns [`ClassificationError::Cycle`] if
    /// `parent` is `class` itself or a descendant of `class`.
    pub fn add(
        &mut self,
        class: ClassName,
        parent: Option<ClassName>,
    ) -> Result<(), ClassificationError> {
        if class.as_str().is_empty() {
            return Err(ClassificationError::EmptyName);
        }
        if self.registered.contains(&class) {
            return Err(ClassificationError::DuplicateClass(class.to_string()));
        }

        if let Some(parent) = &parent {
            if parent == &class || self.is_subclass(parent, &class) {
                return Err(ClassificationError::Cycle {
                    child: class.to_string(),
                    parent: parent.to_string(),
                });
            }
            if !self.registered.contains(parent) {
                self.registered.insert(parent.clone());
                self.children.entry(parent.clone()).or_default();
            }
        }

        self.registered.insert(class.clone());
        self.children.entry(class.clone()).or_default();
        if let Some(parent) = parent {
            self.parents.insert(class.clone(), parent.clone());
            self.children.entry(parent).or_default().insert(class);
        }
        Ok(())
    }

    pub fn is_registered(&self, class: &ClassName) -> bool {
        self.registered.contains(class)
    }

    pub fn parent(&self, class: &ClassName) -> Option<&ClassName> {
        self.parents.get(class)
    }

    pub fn children(&self, class: &ClassName) -> impl Iterator<Item = &ClassName> {
        self.children.get(class).into_iter().flatten()
    }

    /// All registered classes with no parent.
    pub fn roots(&self) -> impl Iterator<Item = &ClassName> {
        self.registered.iter().filter(|c| !self.parents.contains_key(*c))
    }

    /// The chain from `class` up to its root, inclusive, nearest first.
    pub fn ancestors(&self, class: &ClassName) -> Vec<ClassName> {
        let mut chain = Vec::new();
        let mut current = class.clone();
        chain.push(current.clone());
        while let Some(parent) = self.parents.get(&current) {
            chain.push(parent.clone());
            current = parent.clone();
        }
        chain
    }

    /// True if `class` is `ancestor` itself or a descendant of it.
    pub fn is_subclass(&self, class: &ClassName, ancestor: &ClassName) -> bool {
        self.ancestors(class).iter().any(|c| c == ancestor)
    }

    /// Symmetric subclass-or-superclass check: true if either class is an
    /// ancestor of the other.
    pub fn are_related(&self, a: &ClassName, b: &ClassName) -> bool {
        self.is_subclass(a, b) || self.is_subclass(b, a)
    }

    /// The nearest class that is an ancestor of both `a` and `b` (or of
    /// either, if one is already an ancestor of the other). `None` if the
    /// two classes belong to disjoint trees.
    pub fn common_ancestor(&self, a: &ClassName, b: &ClassName) -> Option<ClassName> {
        if !self.registered.contains(a) || !self.registered.contains(b) {
            return None;
        }
        let chain_a = self.ancestors(a);
        let chain_b: IndexSet<ClassName> = self.ancestors(b).into_iter().collect();
        chain_a.into_iter().find(|c| chain_b.contains(c))
    }

    /// The common ancestor of an entire slice of classes, folding
    /// [`Self::common_ancestor`] pairwise left to right.
    pub fn common_ancestor_of(&self, classes: &[ClassName]) -> Option<ClassName> {
        let mut iter = classes.iter();
        let first = iter.next()?.clone();
        iter.try_fold(first, |acc, next| self.common_ancestor(&acc, next))
    }

    /// Registers a new class representing the union of `members`, inserting
    /// it as a child of their nearest common ancestor and re-parenting each
    /// member onto it.
    ///
    /// If `union_name` is already registered this is idempotent and simply
    /// returns it. If the members share no common ancestor, `union_name` is
    /// registered as a fresh root and members are still re-parented to it.
    pub fn add_union(
        &mut self,
        members: &[ClassName],
        union_name: ClassName,
    ) -> Result<ClassName, ClassificationError> {
        if self.registered.contains(&union_name) {
            return Ok(union_name);
        }

        let parent = self.common_ancestor_of(members);
        self.add(union_name.clone(), parent)?;
        for member in members {
            if self.registered.contains(member) {
                self.reparent(member, union_name.clone());
            }
        }
        Ok(union_name)
    }

    /// Rewrites `class`'s parent edge in place, without re-validating for
    /// cycles — used internally by [`Self::add_union`] once the new parent
    /// has already been proven to sit above the old one.
    fn reparent(&mut self, class: &ClassName, new_parent: ClassName) {
        if let Some(old_parent) = self.parents.get(class) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.shift_remove(class);
            }
        }
        self.children.entry(new_parent.clone()).or_default().insert(class.clone());
        self.parents.insert(class.clone(), new_parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmw_tree() -> ClassificationTree {
        let mut t = ClassificationTree::new();
        t.add("Vehicle".into(), None).unwrap();
        t.add("BMW".into(), Some("Vehicle".into())).unwrap();
        t.add("Series3".into(), Some("BMW".into())).unwrap();
        t.add("Series5".into(), Some("BMW".into())).unwrap();
        t.add("X5".into(), Some("BMW".into())).unwrap();
        t.add("X7".into(), Some("BMW".into())).unwrap();
        t.add("Component".into(), None).unwrap();
        t.add("Engine".into(), Some("Component".into())).unwrap();
        t.add("PetrolEngine".into(), Some("Engine".into())).unwrap();
        t.add("DieselEngine".into(), Some("Engine".into())).unwrap();
        t
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut t = bmw_tree();
        let err = t.add("BMW".into(), Some("Vehicle".into())).unwrap_err();
        assert!(matches!(err, ClassificationError::DuplicateClass(_)));
    }

    #[test]
    fn self_parent_cycle_is_rejected() {
        let mut t = bmw_tree();
        let err = t.add("Loop".into(), Some("Loop".into())).unwrap_err();
        assert!(matches!(err, ClassificationError::Cycle { .. }));
    }

    #[test]
    fn is_subclass_walks_the_chain() {
        let t = bmw_tree();
        assert!(t.is_subclass(&"Series3".into(), &"BMW".into()));
        assert!(t.is_subclass(&"Series3".into(), &"Vehicle".into()));
        assert!(t.is_subclass(&"Series3".into(), &"Series3".into()));
        assert!(!t.is_subclass(&"BMW".into(), &"Series3".into()));
        assert!(!t.is_subclass(&"Series3".into(), &"Engine".into()));
    }

    #[test]
    fn are_related_is_symmetric() {
        let t = bmw_tree();
        assert!(t.are_related(&"Series3".into(), &"BMW".into()));
        assert!(t.are_related(&"BMW".into(), &"Series3".into()));
        assert!(!t.are_related(&"Series3".into(), &"Series5".into()));
    }

    #[test]
    fn common_ancestor_of_siblings_is_their_parent() {
        let t = bmw_tree();
        assert_eq!(
            t.common_ancestor(&"Series3".into(), &"Series5".into()),
            Some("BMW".into())
        );
        assert_eq!(
            t.common_ancestor(&"PetrolEngine".into(), &"DieselEngine".into()),
            Some("Engine".into())
        );
    }

    #[test]
    fn common_ancestor_across_disjoint_trees_is_none() {
        let t = bmw_tree();
        assert_eq!(t.common_ancestor(&"Series3".into(), &"Engine".into()), None);
    }

    #[test]
    fn add_union_inserts_under_common_ancestor_and_reparents_members() {
        let mut t = bmw_tree();
        let union = t
            .add_union(&["PetrolEngine".into(), "DieselEngine".into()], "CombustionEngine".into())
            .unwrap();
        assert_eq!(union, "CombustionEngine".into());
        assert_eq!(t.parent(&"CombustionEngine".into()), Some(&"Engine".into()));
        assert_eq!(t.parent(&"PetrolEngine".into()), Some(&"CombustionEngine".into()));
        assert_eq!(t.parent(&"DieselEngine".into()), Some(&"CombustionEngine".into()));
        assert!(t.is_subclass(&"PetrolEngine".into(), &"CombustionEngine".into()));
        assert!(t.is_subclass(&"PetrolEngine".into(), &"Engine".into()));
    }

    #[test]
    fn add_union_is_idempotent_on_repeat_name() {
        let mut t = bmw_tree();
        t.add_union(&["PetrolEngine".into(), "DieselEngine".into()], "CombustionEngine".into())
            .unwrap();
        let before = t.parent(&"CombustionEngine".into()).cloned();
        let union = t
            .add_union(&["PetrolEngine".into(), "DieselEngine".into()], "CombustionEngine".into())
            .unwrap();
        assert_eq!(union, "CombustionEngine".into());
        assert_eq!(t.parent(&"CombustionEngine".into()).cloned(), before);
    }

    #[test]
    fn add_union_with_no_common_ancestor_becomes_a_root() {
        let mut t = bmw_tree();
        let union = t
            .add_union(&["Series3".into(), "Engine".into()], "Anything".into())
            .unwrap();
        assert_eq!(t.parent(&union), None);
        assert_eq!(t.parent(&"Series3".into()), Some(&union));
        assert_eq!(t.parent(&"Engine".into()), Some(&union));
    }
}
