//! The nine heuristics of the learner's pipeline (spec §4.4.2), each a pure
//! function from `(working model, positive, near_miss)` to a mutation of
//! the working model plus tags appended to the update's tag log. `backup_rule`
//! is the odd one out — it needs the learner's history, not just the
//! working model, so it lives in [`super::backup_rule`] and is invoked by
//! [`super::Learner::update`] directly rather than through the pipeline
//! table.

use indexmap::{IndexMap, IndexSet};

use super::conflict::would_conflict;
use super::UpdateContext;
use crate::model::{AttrScalar, AttrValue, Link, LinkKind, Model};
use crate::name::{ClassName, ObjectName};

pub type Tag = String;

/// If the working model is empty, copies every object and link of
/// `positive` into it. Objects first, then links (including the `MustBeA`
/// link for each object, synthesized if `positive` didn't carry it
/// explicitly) — scenario 1 depends on this grouping, not an interleaved
/// object/link/object/link order.
pub fn seed(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    if !model.is_empty() {
        return;
    }

    for obj in ctx.positive.objects() {
        if model.object(&obj.name).is_none() {
            model.add_object(obj.clone()).expect("name checked absent above");
            tags.push("add_object".to_string());
        }
    }

    for link in ctx.positive.links() {
        if link.kind == LinkKind::MustBeA {
            continue;
        }
        if !model.has_link(link) {
            model.add_link(link.clone()).expect("endpoints were just seeded from positive");
            tags.push("add_link".to_string());
        }
    }

    for obj in ctx.positive.objects() {
        let must_be_a = Link::must_be_a(obj.name.clone(), ObjectName::new(obj.class_name.as_str()));
        if !model.has_link(&must_be_a) {
            model.add_link(must_be_a).expect("source object was just seeded");
            tags.push("add_link".to_string());
        }
    }
}

/// Removes any `MustNot(A, B)` rule the positive example now contradicts
/// (an object of class A-or-subclass linked to an object of class
/// B-or-subclass), generalizing the obligation to `Must(A, parent(B))` when
/// `B` has a parent.
pub fn check_consistency(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let conflicting: Vec<Link> = model
        .links_with_kind(LinkKind::MustNot)
        .filter(|rule| {
            let a = ClassName::new(rule.source.as_str());
            let b = ClassName::new(rule.target.as_str());
            ctx.positive.links().any(|pl| {
                let source = ctx.positive.object(&pl.source);
                let target = ctx.positive.object(&pl.target);
                match (source, target) {
                    (Some(s), Some(t)) => ctx.tree.is_subclass(&s.class_name, &a) && ctx.tree.is_subclass(&t.class_name, &b),
                    _ => false,
                }
            })
        })
        .cloned()
        .collect();

    for rule in conflicting {
        if !model.remove_link(&rule) {
            continue;
        }
        tags.push("resolve_conflict".to_string());

        let source = ClassName::new(rule.source.as_str());
        let target = ClassName::new(rule.target.as_str());
        if let Some(parent) = ctx.tree.parent(&target).cloned() {
            let generalized = Link::must(source.as_str(), parent.as_str());
            if !model.has_link(&generalized) {
                model.add_link(generalized).expect("Must rule links are never dangling-checked");
                tags.push("generalize_conflict".to_string());
            }
        }
    }
}

/// Climbs the classification tree in two ways: (1) when an object shares a
/// name across `positive` and `near_miss` but disagrees on class, its class
/// in the working model is replaced by their common ancestor; (2) for every
/// positive link, generic `Must` obligations are introduced one and two
/// levels up the target's ancestry. Both parts are comparative — they exist
/// to generalize away from the discriminating feature a near-miss reveals —
/// so the whole heuristic is skipped when there's no near-miss to compare
/// against; scenario 1 (pure seeding) depends on this: seeding alone must
/// not introduce generic `Must` obligations nobody has contrasted yet.
pub fn climb_tree(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let Some(near_miss) = ctx.near_miss else { return };

    for positive_obj in ctx.positive.objects() {
        let Some(near_miss_obj) = near_miss.object(&positive_obj.name) else {
            continue;
        };
        if positive_obj.class_name == near_miss_obj.class_name {
            continue;
        }
        let Some(ancestor) = ctx.tree.common_ancestor(&positive_obj.class_name, &near_miss_obj.class_name) else {
            continue;
        };
        if model.object(&positive_obj.name).is_some() {
            model.update_object_class(&positive_obj.name, ancestor);
            tags.push("climb_tree".to_string());
        }
    }

    for link in ctx.positive.links() {
        if link.kind == LinkKind::MustBeA {
            continue;
        }
        let Some(source_obj) = ctx.positive.object(&link.source) else { continue };
        let Some(target_obj) = ctx.positive.object(&link.target) else { continue };

        let Some(target_parent) = ctx.tree.parent(&target_obj.class_name).cloned() else {
            continue;
        };

        if !would_conflict(model, ctx.tree, &source_obj.class_name, &target_parent, LinkKind::Must) {
            let rule = Link::must(source_obj.class_name.as_str(), target_parent.as_str());
            if !model.has_link(&rule) {
                model.add_link(rule).expect("Must rule links are never dangling-checked");
                tags.push("climb_tree".to_string());
            }
        }

        let source_parent = ctx.tree.parent(&source_obj.class_name).cloned();
        let target_grandparent = ctx.tree.parent(&target_parent).cloned();
        if let (Some(source_parent), Some(target_grandparent)) = (source_parent, target_grandparent) {
            if !would_conflict(model, ctx.tree, &source_parent, &target_grandparent, LinkKind::Must) {
                let rule = Link::must(source_parent.as_str(), target_grandparent.as_str());
                if !model.has_link(&rule) {
                    model.add_link(rule).expect("Must rule links are never dangling-checked");
                    tags.push("climb_tree".to_string());
                }
            }
        }
    }
}

/// For every positive link whose (source class, target class) signature
/// doesn't appear anywhere in `near_miss`, records both a generic `Must`
/// rule between the classes and an instance-level `Must` between the named
/// objects. Skipped entirely when there's no near-miss to compare against.
pub fn require_link(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let Some(near_miss) = ctx.near_miss else { return };

    for link in ctx.positive.links() {
        if link.kind == LinkKind::MustBeA {
            continue;
        }
        let Some(source_obj) = ctx.positive.object(&link.source) else { continue };
        let Some(target_obj) = ctx.positive.object(&link.target) else { continue };

        let signature_in_near_miss = near_miss.links().any(|nl| {
            let source = near_miss.object(&nl.source);
            let target = near_miss.object(&nl.target);
            matches!(
                (source, target),
                (Some(s), Some(t)) if s.class_name == source_obj.class_name && t.class_name == target_obj.class_name
            )
        });
        if signature_in_near_miss {
            continue;
        }

        if !would_conflict(model, ctx.tree, &source_obj.class_name, &target_obj.class_name, LinkKind::Must) {
            let generic = Link::must(source_obj.class_name.as_str(), target_obj.class_name.as_str());
            if !model.has_link(&generic) {
                model.add_link(generic).expect("Must rule links are never dangling-checked");
                tags.push("require_link".to_string());
            }
        }

        let instance = Link::must(link.source.as_str(), link.target.as_str());
        if !model.has_link(&instance) {
            model.add_link(instance).expect("Must rule links are never dangling-checked");
            tags.push("require_link".to_string());
        }
    }
}

/// Widens attribute constraints observed across the working model and
/// `positive` into `Set`s once two or more distinct values show up for the
/// same class/attribute, and records `allowed_<parent>_types` on a source
/// class once two or more of its linked component classes turn out to share
/// a parent (equivalent components, e.g. two kinds of engine).
pub fn enlarge_set(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    enlarge_attribute_sets(model, ctx, tags);
    enlarge_allowed_component_types(model, ctx, tags);
}

fn collect_attr_values(acc: &mut IndexMap<ClassName, IndexMap<String, IndexSet<AttrScalar>>>, model: &Model) {
    for obj in model.objects() {
        if obj.attributes.is_empty() {
            continue;
        }
        let by_attr = acc.entry(obj.class_name.clone()).or_default();
        for (attr, value) in &obj.attributes {
            let set = by_attr.entry(attr.clone()).or_default();
            match value {
                AttrValue::Scalar(s) => {
                    set.insert(s.clone());
                }
                AttrValue::Set(existing) => {
                    for v in existing {
                        set.insert(v.clone());
                    }
                }
                AttrValue::Interval(_, _) => {
                    // Continuous numeric ranges stay intervals; `enlarge_set`
                    // normalizes onto `Set` only for enumerations (spec §9
                    // Open Questions).
                }
            }
        }
    }
}

fn enlarge_attribute_sets(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let mut observed: IndexMap<ClassName, IndexMap<String, IndexSet<AttrScalar>>> = IndexMap::new();
    collect_attr_values(&mut observed, model);
    collect_attr_values(&mut observed, ctx.positive);

    let classes: Vec<ClassName> = model.objects().map(|o| o.class_name.clone()).collect();
    for class in classes {
        let Some(by_attr) = observed.get(&class) else { continue };
        for (attr, values) in by_attr {
            if values.len() < 2 {
                continue;
            }
            let members: Vec<ObjectName> = model.objects().filter(|o| o.class_name == class).map(|o| o.name.clone()).collect();
            for name in members {
                let current = model.get_attribute_value(&name, attr).cloned();
                let next = match current {
                    Some(AttrValue::Set(existing)) => {
                        if values.iter().all(|v| existing.contains(v)) {
                            None
                        } else {
                            let mut merged = existing;
                            for v in values {
                                merged.insert(v.clone());
                            }
                            Some(AttrValue::Set(merged))
                        }
                    }
                    _ => Some(AttrValue::Set(values.clone())),
                };
                if let Some(next) = next {
                    model.set_attribute(&name, attr.clone(), next);
                    tags.push("enlarge_set".to_string());
                }
            }
        }
    }
}

fn collect_linked_targets(acc: &mut IndexMap<ClassName, IndexSet<ClassName>>, model: &Model) {
    for link in model.links_with_kind(LinkKind::Regular) {
        let (Some(source), Some(target)) = (model.object(&link.source), model.object(&link.target)) else {
            continue;
        };
        acc.entry(source.class_name.clone()).or_default().insert(target.class_name.clone());
    }
}

fn enlarge_allowed_component_types(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let mut targets_by_source: IndexMap<ClassName, IndexSet<ClassName>> = IndexMap::new();
    collect_linked_targets(&mut targets_by_source, model);
    collect_linked_targets(&mut targets_by_source, ctx.positive);

    for (source_class, targets) in &targets_by_source {
        let mut by_parent: IndexMap<ClassName, IndexSet<ClassName>> = IndexMap::new();
        for target in targets {
            if let Some(parent) = ctx.tree.parent(target) {
                by_parent.entry(parent.clone()).or_default().insert(target.clone());
            }
        }

        for (parent, subclasses) in by_parent {
            if subclasses.len() < 2 {
                continue;
            }
            let attr_name = format!("allowed_{}_types", parent.as_str().to_lowercase());
            let values: IndexSet<AttrScalar> = subclasses.iter().map(|c| AttrScalar::Text(c.to_string())).collect();

            let members: Vec<ObjectName> = model.objects().filter(|o| &o.class_name == source_class).map(|o| o.name.clone()).collect();
            for name in members {
                let current = model.get_attribute_value(&name, &attr_name).cloned();
                let next = match current {
                    Some(AttrValue::Set(existing)) => {
                        if values.iter().all(|v| existing.contains(v)) {
                            None
                        } else {
                            let mut merged = existing;
                            for v in &values {
                                merged.insert(v.clone());
                            }
                            Some(AttrValue::Set(merged))
                        }
                    }
                    _ => Some(AttrValue::Set(values.clone())),
                };
                if let Some(next) = next {
                    model.set_attribute(&name, attr_name.clone(), next);
                    tags.push("enlarge_set".to_string());
                }
            }
        }
    }
}

/// For every pair of distinct source classes that each carry `Must` rules,
/// propagates any target shared by both rule sets up to their common
/// ancestor, so a constraint both `Series3` and `X5` obey ends up attached
/// to `BMW` directly.
pub fn propagate_to_common_ancestor(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let mut targets_by_source: IndexMap<ClassName, IndexSet<ClassName>> = IndexMap::new();
    for rule in model.links_with_kind(LinkKind::Must) {
        let source = ClassName::new(rule.source.as_str());
        let target = ClassName::new(rule.target.as_str());
        targets_by_source.entry(source).or_default().insert(target);
    }

    let sources: Vec<ClassName> = targets_by_source.keys().cloned().collect();
    for i in 0..sources.len() {
        for j in (i + 1)..sources.len() {
            let a = &sources[i];
            let b = &sources[j];
            let Some(common) = ctx.tree.common_ancestor(a, b) else { continue };
            if common == *a || common == *b {
                // one is already an ancestor of the other; nothing to climb to
                continue;
            }

            let targets_a = &targets_by_source[a];
            let targets_b = &targets_by_source[b];
            let shared: Vec<ClassName> = targets_a.iter().filter(|t| targets_b.contains(*t)).cloned().collect();

            for target in shared {
                if would_conflict(model, ctx.tree, &common, &target, LinkKind::Must) {
                    continue;
                }
                let rule = Link::must(common.as_str(), target.as_str());
                if !model.has_link(&rule) {
                    model.add_link(rule).expect("Must rule links are never dangling-checked");
                    tags.push("propagate_to_common_ancestor".to_string());
                }
            }
        }
    }
}

/// Classes of `Regular`-link targets reachable from every object of
/// `anchor` class in `example`.
fn linked_component_classes(example: &Model, anchor: &ClassName) -> IndexSet<ClassName> {
    let mut classes = IndexSet::new();
    for obj in example.objects().filter(|o| &o.class_name == anchor) {
        for link in example.links_from(&obj.name) {
            if link.kind != LinkKind::Regular {
                continue;
            }
            if let Some(target) = example.object(&link.target) {
                classes.insert(target.class_name.clone());
            }
        }
    }
    classes
}

/// Finds a pair `(positive_class, near_miss_class)` of distinct component
/// classes that share a parent — the "specific difference" the spec prefers
/// over a coarse, parent-level prohibition (e.g. forbidding the concrete
/// `ManualTransmission` near-miss used rather than `Transmission` broadly).
fn specific_difference(
    tree: &crate::classification::ClassificationTree,
    positive_components: &IndexSet<ClassName>,
    near_miss_components: &IndexSet<ClassName>,
) -> Option<(ClassName, ClassName)> {
    for positive_class in positive_components {
        let Some(parent) = tree.parent(positive_class) else { continue };
        for near_miss_class in near_miss_components {
            if positive_class == near_miss_class {
                continue;
            }
            if tree.parent(near_miss_class) == Some(parent) {
                return Some((positive_class.clone(), near_miss_class.clone()));
            }
        }
    }
    None
}

/// Identifies anchor classes (object classes present in both examples),
/// then forbids, per anchor, the component classes the near-miss reaches
/// that the positive example doesn't — preferring a same-parent specific
/// difference over the coarser "any unseen component class" prohibition,
/// and always running every candidate through [`would_conflict`] first.
pub fn forbid_link(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let Some(near_miss) = ctx.near_miss else { return };

    let positive_classes: IndexSet<ClassName> = ctx.positive.objects().map(|o| o.class_name.clone()).collect();
    let near_miss_classes: IndexSet<ClassName> = near_miss.objects().map(|o| o.class_name.clone()).collect();
    let anchors: Vec<ClassName> = positive_classes.into_iter().filter(|c| near_miss_classes.contains(c)).collect();

    for anchor in &anchors {
        let positive_components = linked_component_classes(ctx.positive, anchor);
        let near_miss_components = linked_component_classes(near_miss, anchor);

        if let Some((_, near_miss_specific)) = specific_difference(ctx.tree, &positive_components, &near_miss_components) {
            try_forbid(model, ctx, anchor, &near_miss_specific, tags);
            continue;
        }

        let candidates: Vec<ClassName> = near_miss_components.into_iter().filter(|c| !positive_components.contains(c)).collect();
        for candidate in candidates {
            try_forbid(model, ctx, anchor, &candidate, tags);
        }
    }
}

fn try_forbid(model: &mut Model, ctx: &UpdateContext, anchor: &ClassName, candidate: &ClassName, tags: &mut Vec<Tag>) {
    if would_conflict(model, ctx.tree, anchor, candidate, LinkKind::MustNot) {
        return;
    }
    let rule = Link::must_not(anchor.as_str(), candidate.as_str());
    if !model.has_link(&rule) {
        model.add_link(rule).expect("MustNot rule links are never dangling-checked");
        tags.push("forbid_link".to_string());
    }
}

/// Removes every `Regular` link the working model carries that `positive`
/// doesn't, unless a generic `Must` rule still justifies keeping it
/// (the target's class is, or is a subclass of, the rule's target).
pub fn drop_link(model: &mut Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) {
    let regular_links: Vec<Link> = model.links_with_kind(LinkKind::Regular).cloned().collect();

    for link in regular_links {
        let present_in_positive = ctx
            .positive
            .links_with_kind(LinkKind::Regular)
            .any(|pl| pl.source == link.source && pl.target == link.target);
        if present_in_positive {
            continue;
        }

        let justified = match (model.object(&link.source), model.object(&link.target)) {
            (Some(source_obj), Some(target_obj)) => model.links_with_kind(LinkKind::Must).any(|rule| {
                let rule_source = ClassName::new(rule.source.as_str());
                let rule_target = ClassName::new(rule.target.as_str());
                rule_source == source_obj.class_name
                    && (rule_target == target_obj.class_name || ctx.tree.is_subclass(&target_obj.class_name, &rule_target))
            }),
            _ => false,
        };

        if !justified {
            model.remove_link(&link);
            tags.push("drop_link".to_string());
        }
    }
}
