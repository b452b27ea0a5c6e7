//! Centralized conflict detection (spec §4.4.3, design note "Conflict
//! detection centralization"): one pure function every heuristic calls
//! before introducing a class-level rule, instead of re-implementing the
//! check at each call site the way the original per-heuristic code did.

use crate::classification::ClassificationTree;
use crate::model::{LinkKind, Model};
use crate::name::ClassName;

/// True if asserting `(source, target, kind)` as a class-level rule in
/// `model` would be inconsistent per spec §4.4.3:
///
/// - the opposite-polarity rule already holds (directly or via an
///   instance-level link of that polarity);
/// - `kind` is `MustNot` and `model` retains an instance-level link between
///   an object of `source` class (or subclass) and an object of `target`
///   class (or subclass) — contradicting evidence;
/// - `kind` is `MustNot` and a retained `Must` rule spans the same pair
///   through a subclass relation on either end.
pub fn would_conflict(
    model: &Model,
    tree: &ClassificationTree,
    source: &ClassName,
    target: &ClassName,
    kind: LinkKind,
) -> bool {
    let opposite = match kind {
        LinkKind::Must => LinkKind::MustNot,
        LinkKind::MustNot => LinkKind::Must,
        LinkKind::Regular | LinkKind::MustBeA => return false,
    };

    if model.has_generic_class_link(source, target, opposite) {
        return true;
    }

    if kind == LinkKind::MustNot {
        if retained_instance_link_contradicts(model, tree, source, target) {
            return true;
        }
        if must_rule_through_subclass(model, tree, source, target) {
            return true;
        }
    }

    false
}

/// A `Regular` link between a `source`-class (or subclass) object and a
/// `target`-class (or subclass) object is retained evidence a `MustNot`
/// between those classes would contradict.
fn retained_instance_link_contradicts(
    model: &Model,
    tree: &ClassificationTree,
    source: &ClassName,
    target: &ClassName,
) -> bool {
    model.links_with_kind(LinkKind::Regular).any(|link| {
        let (Some(src_obj), Some(tgt_obj)) = (model.object(&link.source), model.object(&link.target)) else {
            return false;
        };
        tree.is_subclass(&src_obj.class_name, source) && tree.is_subclass(&tgt_obj.class_name, target)
    })
}

/// A retained `Must(A, B)` rule conflicts with a prospective `MustNot(source,
/// target)` only when the `Must` obligation cannot be satisfied without the
/// very link the `MustNot` would forbid: `source` is `A` (or a subclass of
/// it) and `target` is `B` or a superclass of it. A `Must` to a parent class
/// does not conflict with a `MustNot` naming one sibling subclass of that
/// parent — the obligation is still satisfiable through another sibling
/// (spec §8 scenario 3). Mirrors the original's `_is_rule_consistent`, which
/// only rejects an exact same-target `Must` rule, not subclass widening on
/// the target side.
fn must_rule_through_subclass(model: &Model, tree: &ClassificationTree, source: &ClassName, target: &ClassName) -> bool {
    model.links_with_kind(LinkKind::Must).any(|rule| {
        let a = ClassName::new(rule.source.as_str());
        let b = ClassName::new(rule.target.as_str());
        tree.is_subclass(source, &a) && tree.is_subclass(&b, target)
    })
}
