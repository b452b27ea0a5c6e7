//! The working model: a small typed graph of objects and links the learner
//! mutates one example at a time.

pub mod index;
pub mod link;
pub mod object;

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::classification::ClassificationTree;
use crate::error::ModelError;
use crate::name::{ClassName, ObjectName};

pub use index::ModelIndex;
pub use link::{Link, LinkKind};
pub use object::{AttrScalar, AttrValue, Object};

/// A graph of classified objects and the links between them.
///
/// Invariants (M1-M4): object names are unique (M1); every link's source and
/// target name an object present in the model (M2); an object has at most
/// one `MustBeA` link, which must agree with its `class_name` field (M3);
/// `Must`/`MustNot` rule links name classes, not necessarily objects present
/// in this particular model (M4, rules outlive the example that produced
/// them).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Model {
    objects: IndexMap<ObjectName, Object>,
    links: Vec<Link>,
    #[serde(skip)]
    index: ModelIndex,
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        if self.objects != other.objects {
            return false;
        }
        let a: HashSet<&Link> = self.links.iter().collect();
        let b: HashSet<&Link> = other.links.iter().collect();
        a == b
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: Object) -> Result<(), ModelError> {
        if object.name.as_str().is_empty() {
            return Err(ModelError::EmptyObjectName);
        }
        if self.objects.contains_key(&object.name) {
            return Err(ModelError::DuplicateObject(object.name.to_string()));
        }
        self.objects.insert(object.name.clone(), object);
        Ok(())
    }

    /// Adds or replaces an object, rather than erroring on a duplicate name.
    /// Used by heuristics that rewrite an object's class in place.
    pub fn upsert_object(&mut self, object: Object) {
        self.objects.insert(object.name.clone(), object);
    }

    pub fn remove_object(&mut self, name: &ObjectName) -> Option<Object> {
        let removed = self.objects.shift_remove(name);
        if removed.is_some() {
            let stale: Vec<Link> = self
                .links
                .iter()
                .filter(|l| &l.source == name || &l.target == name)
                .cloned()
                .collect();
            for link in stale {
                self.remove_link(&link);
            }
        }
        removed
    }

    pub fn object(&self, name: &ObjectName) -> Option<&Object> {
        self.objects.get(name)
    }

    pub fn object_mut(&mut self, name: &ObjectName) -> Option<&mut Object> {
        self.objects.get_mut(name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// Adds `link`, validating that both endpoints are present for
    /// `Regular` links and that the source is present for `MustBeA` links.
    /// A `MustBeA` link's target names a class, not an object (M3), so it is
    /// never endpoint-checked against `self.objects`. `Must`/`MustNot` rule
    /// links may name classes with no corresponding object in this model
    /// (M4) and are not endpoint-checked at all.
    pub fn add_link(&mut self, link: Link) -> Result<(), ModelError> {
        if link.kind == LinkKind::Regular && !self.objects.contains_key(&link.target) {
            return Err(ModelError::DanglingLink(link.target.to_string()));
        }
        if matches!(link.kind, LinkKind::Regular | LinkKind::MustBeA) && !self.objects.contains_key(&link.source) {
            return Err(ModelError::DanglingLink(link.source.to_string()));
        }
        if self.index.contains(&link) {
            return Ok(());
        }
        self.index.insert(&link);
        self.links.push(link);
        Ok(())
    }

    pub fn remove_link(&mut self, link: &Link) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l != link);
        if self.links.len() != before {
            self.index.remove(link);
            true
        } else {
            false
        }
    }

    pub fn has_link(&self, link: &Link) -> bool {
        self.index.contains(link)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn links_with_kind(&self, kind: LinkKind) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.kind == kind)
    }

    pub fn links_from(&self, name: &ObjectName) -> &[Link] {
        self.index.from_source(name)
    }

    pub fn links_to(&self, name: &ObjectName) -> &[Link] {
        self.index.to_target(name)
    }

    /// Rewrites an object's class, keeping its `MustBeA` link (if any) in
    /// sync with the new class name.
    pub fn update_object_class(&mut self, name: &ObjectName, new_class: ClassName) {
        if let Some(obj) = self.objects.get_mut(name) {
            obj.class_name = new_class.clone();
        } else {
            return;
        }
        let new_target = ObjectName::new(new_class.as_str());
        for link in &mut self.links {
            if &link.source == name && link.kind == LinkKind::MustBeA {
                link.target = new_target.clone();
            }
        }
        self.index = ModelIndex::new();
        for link in &self.links {
            self.index.insert(link);
        }
    }

    /// Deep-copy: shares no mutable state with `self`. `Model`'s fields are
    /// all owned/cloned data already (no `Rc`/interior mutability), so this
    /// is a thin, intention-revealing wrapper over `Clone`.
    pub fn copy(&self) -> Model {
        self.clone()
    }

    /// Equality up to ordering of objects and links (spec M-level `equals`).
    /// `Model`'s `PartialEq` already normalizes object ordering (an
    /// `IndexMap` compares by key/value, not position) and link ordering
    /// (compared as sets), so this simply forwards to it.
    pub fn equals(&self, other: &Model) -> bool {
        self == other
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// True if a `kind` rule holds between `src_class` and `tgt_class`,
    /// either as a direct class-to-class link, or because some
    /// instance-level link of that kind connects an object of `src_class`
    /// to an object of `tgt_class`.
    pub fn has_generic_class_link(&self, src_class: &ClassName, tgt_class: &ClassName, kind: LinkKind) -> bool {
        let src_name = ObjectName::new(src_class.as_str());
        let tgt_name = ObjectName::new(tgt_class.as_str());
        if self.has_link(&Link::new(src_name, tgt_name, kind)) {
            return true;
        }
        self.links_with_kind(kind).any(|l| {
            let source_matches = self.object(&l.source).map(|o| &o.class_name == src_class).unwrap_or(false);
            let target_matches = self.object(&l.target).map(|o| &o.class_name == tgt_class).unwrap_or(false);
            source_matches && target_matches
        })
    }

    pub fn get_attribute_value(&self, object: &ObjectName, attr: &str) -> Option<&AttrValue> {
        self.objects.get(object).and_then(|o| o.attributes.get(attr))
    }

    pub fn set_attribute(&mut self, object: &ObjectName, attr: impl Into<String>, value: AttrValue) {
        if let Some(obj) = self.objects.get_mut(object) {
            obj.attributes.insert(attr.into(), value);
        }
    }

    /// A conjunction of `IsA`/`HasPart`/`Must`/`MustNot`/`Attribute`-shaped
    /// predicates describing this model, objects and rules each in a stable
    /// sorted order so the same model always serializes identically.
    pub fn to_formula(&self) -> String {
        let mut clauses = Vec::new();

        let mut object_names: Vec<&ObjectName> = self.objects.keys().collect();
        object_names.sort();
        for name in object_names {
            let obj = &self.objects[name];
            clauses.push(format!("IsA({}, {})", name, obj.class_name));
            let mut attrs: Vec<(&String, &AttrValue)> = obj.attributes.iter().collect();
            attrs.sort_by(|a, b| a.0.cmp(b.0));
            for (attr, value) in attrs {
                clauses.push(format!("Attribute({}, {}, {})", name, attr, describe_attr_value(value)));
            }
        }

        let mut links: Vec<&Link> = self.links.iter().collect();
        links.sort_by(|a, b| {
            (a.source.as_str(), a.target.as_str(), kind_rank(a.kind))
                .cmp(&(b.source.as_str(), b.target.as_str(), kind_rank(b.kind)))
        });
        for link in links {
            match link.kind {
                LinkKind::Regular => clauses.push(format!("HasPart({}, {})", link.source, link.target)),
                LinkKind::Must => clauses.push(format!("MustHavePart({}, {})", link.source, link.target)),
                LinkKind::MustNot => clauses.push(format!("MustNotHavePart({}, {})", link.source, link.target)),
                LinkKind::MustBeA => {} // already covered by the IsA clause above
            }
        }

        clauses.join(" ∧ ")
    }

    /// Per-class rule text for every class that carries at least one
    /// `Must`/`MustNot` rule, generalized over whatever classes the supplied
    /// tree actually contains rather than a fixed domain word list.
    pub fn extract_model_rules(&self, tree: &ClassificationTree) -> IndexMap<ClassName, String> {
        let mut by_class: IndexMap<ClassName, Vec<String>> = IndexMap::new();

        let mut rule_links: Vec<&Link> = self
            .links
            .iter()
            .filter(|l| matches!(l.kind, LinkKind::Must | LinkKind::MustNot))
            .collect();
        rule_links.sort_by(|a, b| {
            (a.source.as_str(), a.target.as_str()).cmp(&(b.source.as_str(), b.target.as_str()))
        });

        for link in rule_links {
            let class = ClassName::new(link.source.as_str());
            if !tree.is_registered(&class) {
                continue;
            }
            let verb = match link.kind {
                LinkKind::Must => "must have",
                LinkKind::MustNot => "must not have",
                _ => unreachable!(),
            };
            by_class
                .entry(class)
                .or_default()
                .push(format!("{} {}", verb, link.target));
        }

        by_class
            .into_iter()
            .map(|(class, rules)| (class.clone(), format!("{}: {}", class, rules.join("; "))))
            .collect()
    }

    /// A coarse node/edge projection for display: every object's category is
    /// the nearest registered root class above it in `tree`, instead of a
    /// hardcoded domain word list.
    pub fn to_semantic_network(&self, tree: &ClassificationTree) -> SemanticNetwork {
        let mut nodes = Vec::new();
        let mut names: Vec<&ObjectName> = self.objects.keys().collect();
        names.sort();
        for name in names {
            let obj = &self.objects[name];
            let category = tree
                .ancestors(&obj.class_name)
                .last()
                .cloned()
                .unwrap_or_else(|| obj.class_name.clone());
            nodes.push(SemanticNode {
                name: name.clone(),
                class_name: obj.class_name.clone(),
                category,
            });
        }

        let mut edges: Vec<SemanticEdge> = self
            .links
            .iter()
            .filter(|l| l.kind == LinkKind::Regular)
            .map(|l| SemanticEdge {
                source: l.source.clone(),
                target: l.target.clone(),
            })
            .collect();
        edges.sort_by(|a, b| (a.source.as_str(), a.target.as_str()).cmp(&(b.source.as_str(), b.target.as_str())));

        SemanticNetwork { nodes, edges }
    }
}

fn kind_rank(kind: LinkKind) -> u8 {
    match kind {
        LinkKind::Regular => 0,
        LinkKind::Must => 1,
        LinkKind::MustNot => 2,
        LinkKind::MustBeA => 3,
    }
}

fn describe_attr_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Scalar(s) => format!("{s:?}"),
        AttrValue::Interval(lo, hi) => format!("[{lo}, {hi}]"),
        AttrValue::Set(set) => {
            let mut items: Vec<String> = set.iter().map(|v| format!("{v:?}")).collect();
            items.sort();
            format!("{{{}}}", items.join(", "))
        }
    }
}

/// A coarse node/edge view of a [`Model`] for display purposes only.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SemanticNetwork {
    pub nodes: Vec<SemanticNode>,
    pub edges: Vec<SemanticEdge>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SemanticNode {
    pub name: ObjectName,
    pub class_name: ClassName,
    pub category: ClassName,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SemanticEdge {
    pub source: ObjectName,
    pub target: ObjectName,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ClassificationTree {
        let mut t = ClassificationTree::new();
        t.add("Vehicle".into(), None).unwrap();
        t.add("BMW".into(), Some("Vehicle".into())).unwrap();
        t.add("X5".into(), Some("BMW".into())).unwrap();
        t.add("Component".into(), None).unwrap();
        t.add("Engine".into(), Some("Component".into())).unwrap();
        t.add("XDrive".into(), Some("Component".into())).unwrap();
        t
    }

    #[test]
    fn add_link_rejects_dangling_endpoints() {
        let mut m = Model::new();
        m.add_object(Object::new("x5_1", "X5")).unwrap();
        let err = m.add_link(Link::regular("x5_1", "missing")).unwrap_err();
        assert!(matches!(err, ModelError::DanglingLink(_)));
    }

    #[test]
    fn must_links_do_not_require_an_instantiated_object() {
        let mut m = Model::new();
        m.add_link(Link::must("X5", "XDrive")).unwrap();
        assert!(m.has_link(&Link::must("X5", "XDrive")));
    }

    #[test]
    fn duplicate_link_add_is_a_no_op() {
        let mut m = Model::new();
        m.add_link(Link::must("X5", "XDrive")).unwrap();
        m.add_link(Link::must("X5", "XDrive")).unwrap();
        assert_eq!(m.links().count(), 1);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut a = Model::new();
        a.add_link(Link::must("X5", "XDrive")).unwrap();
        a.add_link(Link::must("X5", "AutomaticTransmission")).unwrap();

        let mut b = Model::new();
        b.add_link(Link::must("X5", "AutomaticTransmission")).unwrap();
        b.add_link(Link::must("X5", "XDrive")).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn update_object_class_rewrites_must_be_a_link() {
        let mut m = Model::new();
        m.add_object(Object::new("car1", "X5")).unwrap();
        m.add_link(Link::must_be_a("car1", "X5")).unwrap();
        m.update_object_class(&"car1".into(), "BMW".into());
        assert_eq!(m.object(&"car1".into()).unwrap().class_name, ClassName::from("BMW"));
        let link = m.links_from(&"car1".into())[0].clone();
        assert_eq!(link.target, ObjectName::from("BMW"));
    }

    #[test]
    fn to_formula_is_deterministic_regardless_of_insertion_order() {
        let mut a = Model::new();
        a.add_object(Object::new("x5_1", "X5")).unwrap();
        a.add_object(Object::new("engine1", "Engine")).unwrap();
        a.add_link(Link::regular("x5_1", "engine1")).unwrap();

        let mut b = Model::new();
        b.add_object(Object::new("engine1", "Engine")).unwrap();
        b.add_object(Object::new("x5_1", "X5")).unwrap();
        b.add_link(Link::regular("x5_1", "engine1")).unwrap();

        assert_eq!(a.to_formula(), b.to_formula());
    }

    #[test]
    fn extract_model_rules_only_covers_registered_classes() {
        let t = tree();
        let mut m = Model::new();
        m.add_link(Link::must("X5", "XDrive")).unwrap();
        m.add_link(Link::must_not("X5", "ManualTransmission")).unwrap();
        let rules = m.extract_model_rules(&t);
        let text = rules.get(&ClassName::from("X5")).unwrap();
        assert!(text.contains("must have XDrive"));
        assert!(text.contains("must not have ManualTransmission"));
    }

    #[test]
    fn copy_is_independent_of_the_original() {
        let mut m = Model::new();
        m.add_object(Object::new("x5_1", "X5")).unwrap();
        let mut copy = m.copy();
        copy.add_object(Object::new("x5_2", "X5")).unwrap();
        assert_eq!(m.objects().count(), 1);
        assert_eq!(copy.objects().count(), 2);
    }

    #[test]
    fn has_generic_class_link_matches_instance_level_links() {
        let mut m = Model::new();
        m.add_object(Object::new("x5_1", "X5")).unwrap();
        m.add_object(Object::new("eng1", "Engine")).unwrap();
        m.add_link(Link::must("x5_1", "eng1")).unwrap();
        assert!(m.has_generic_class_link(&ClassName::from("X5"), &ClassName::from("Engine"), LinkKind::Must));
        assert!(!m.has_generic_class_link(&ClassName::from("X5"), &ClassName::from("XDrive"), LinkKind::Must));
    }

    #[test]
    fn has_generic_class_link_matches_direct_class_rule() {
        let mut m = Model::new();
        m.add_link(Link::must("X5", "Engine")).unwrap();
        assert!(m.has_generic_class_link(&ClassName::from("X5"), &ClassName::from("Engine"), LinkKind::Must));
    }

    #[test]
    fn semantic_network_categorizes_by_tree_root() {
        let t = tree();
        let mut m = Model::new();
        m.add_object(Object::new("x5_1", "X5")).unwrap();
        m.add_object(Object::new("engine1", "Engine")).unwrap();
        m.add_link(Link::regular("x5_1", "engine1")).unwrap();
        let net = m.to_semantic_network(&t);
        let x5_node = net.nodes.iter().find(|n| n.name == ObjectName::from("x5_1")).unwrap();
        assert_eq!(x5_node.category, ClassName::from("Vehicle"));
        let engine_node = net.nodes.iter().find(|n| n.name == ObjectName::from("engine1")).unwrap();
        assert_eq!(engine_node.category, ClassName::from("Component"));
    }
}
