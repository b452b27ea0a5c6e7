//! The `FormulaAdapter`: converts between the fixed predicate vocabulary
//! (`IsA`/`HasPart`/`MustHavePart`/`MustNotHavePart`/`Attribute`, spec §6)
//! and a [`Model`].
//!
//! Thin by design (spec §2: C5 is ~10% of core). The textual surface syntax
//! that turns prose into these predicates is the excluded external parser
//! (spec §1); this module only owns the two pure conversions between the
//! predicate vocabulary and the model graph, grounded on the same
//! interlingua shape as the teacher's `grammar::AbsTree` (one shared
//! representation, convertible in both directions, kept independent of any
//! concrete surface syntax).

use std::collections::HashSet;

use crate::error::AdapterError;
use crate::model::{AttrValue, Link, LinkKind, Model, Object};
use crate::name::{ClassName, ObjectName};

/// One clause of the fixed predicate vocabulary the core accepts.
///
/// `source`/`target` are typed as [`ObjectName`] even for the generic
/// (class-level) form of `MustHavePart`/`MustNotHavePart`, matching
/// [`Link`]'s own convention of reusing one name type for both instance and
/// class endpoints (enforced by the caller, not the type system — see
/// `model::link`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum Predicate {
    IsA { object: ObjectName, class: ClassName },
    HasPart { source: ObjectName, target: ObjectName },
    MustHavePart { source: ObjectName, target: ObjectName },
    MustNotHavePart { source: ObjectName, target: ObjectName },
    Attribute { object: ObjectName, attribute: String, value: AttrValue },
}

/// Builds a [`Model`] from a predicate set (spec §6 `formula_to_model`).
///
/// `IsA` predicates are applied first (they declare which names are
/// objects, and of what class) regardless of their position in `predicates`,
/// so that a `HasPart`/`Attribute` clause listed before its object's `IsA`
/// clause still resolves correctly — the predicate set is a conjunction,
/// not an ordered program.
pub fn formula_to_model(predicates: &[Predicate]) -> Result<Model, AdapterError> {
    let mut model = Model::new();
    let mut known_objects: HashSet<ObjectName> = HashSet::new();

    for predicate in predicates {
        if let Predicate::IsA { object, class } = predicate {
            known_objects.insert(object.clone());
            if model.object(object).is_none() {
                model.add_object(Object::new(object.clone(), class.clone()))?;
            }
            let must_be_a = Link::must_be_a(object.clone(), ObjectName::new(class.as_str()));
            model.add_link(must_be_a)?;
        }
    }

    for predicate in predicates {
        match predicate {
            Predicate::IsA { .. } => {}
            Predicate::HasPart { source, target } => {
                insert_link(&mut model, Link::regular(source.clone(), target.clone()))?;
            }
            Predicate::MustHavePart { source, target } => {
                insert_link(&mut model, Link::must(source.clone(), target.clone()))?;
            }
            Predicate::MustNotHavePart { source, target } => {
                insert_link(&mut model, Link::must_not(source.clone(), target.clone()))?;
            }
            Predicate::Attribute { object, attribute, value } => {
                if !known_objects.contains(object) {
                    return Err(AdapterError::UnknownPredicate(format!(
                        "Attribute references object `{object}` with no IsA predicate"
                    )));
                }
                model.set_attribute(object, attribute.clone(), value.clone());
            }
        }
    }

    Ok(model)
}

fn insert_link(model: &mut Model, link: Link) -> Result<(), AdapterError> {
    model.add_link(link)?;
    Ok(())
}

/// Projects a [`Model`] back onto the predicate vocabulary (the structured
/// half of spec §6's `model_to_formula`), in the same stable sorted order
/// [`Model::to_formula`] uses so the projection is deterministic regardless
/// of insertion order.
pub fn model_to_predicates(model: &Model) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    let mut objects: Vec<&Object> = model.objects().collect();
    objects.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
    for obj in &objects {
        predicates.push(Predicate::IsA {
            object: obj.name.clone(),
            class: obj.class_name.clone(),
        });
        let mut attrs: Vec<(&String, &AttrValue)> = obj.attributes.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        for (attr, value) in attrs {
            predicates.push(Predicate::Attribute {
                object: obj.name.clone(),
                attribute: attr.clone(),
                value: value.clone(),
            });
        }
    }

    let mut links: Vec<&Link> = model.links().filter(|l| l.kind != LinkKind::MustBeA).collect();
    links.sort_by(|a, b| {
        (a.source.as_str(), a.target.as_str(), kind_rank(a.kind)).cmp(&(b.source.as_str(), b.target.as_str(), kind_rank(b.kind)))
    });
    for link in links {
        predicates.push(match link.kind {
            LinkKind::Regular => Predicate::HasPart {
                source: link.source.clone(),
                target: link.target.clone(),
            },
            LinkKind::Must => Predicate::MustHavePart {
                source: link.source.clone(),
                target: link.target.clone(),
            },
            LinkKind::MustNot => Predicate::MustNotHavePart {
                source: link.source.clone(),
                target: link.target.clone(),
            },
            LinkKind::MustBeA => unreachable!("filtered above"),
        });
    }

    predicates
}

fn kind_rank(kind: LinkKind) -> u8 {
    match kind {
        LinkKind::Regular => 0,
        LinkKind::Must => 1,
        LinkKind::MustNot => 2,
        LinkKind::MustBeA => 3,
    }
}

/// Spec §6's `model_to_formula(model) → String`: delegates to
/// [`Model::to_formula`], which already owns the conjunction-of-clauses
/// rendering (spec §6 documents the interface at the `Model` boundary; the
/// adapter forwards rather than duplicating it).
pub fn model_to_formula(model: &Model) -> String {
    model.to_formula()
}
