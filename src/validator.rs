//! Validates an example model against the rules carried by a learned model.
//!
//! A pure function: given a learned [`Model`] (its `Must`/`MustNot` rule
//! links and any attribute constraints attached to its objects), and a
//! classification tree to resolve subclass relationships, decide whether
//! another model — an "example" — satisfies it. Never mutates either model.

use indexmap::IndexSet;

use crate::classification::ClassificationTree;
use crate::model::{LinkKind, Model};
use crate::name::{ClassName, ObjectName};

/// A single broken rule, kept concrete enough to explain to a caller what
/// went wrong without them having to re-walk the model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ViolationKind {
    /// An object of `source` class has no link to an instance of `target`
    /// class or a subclass of it, though the model requires one.
    MissingRequiredLink { source: ClassName, target: ClassName },
    /// An object of `source` class links to an instance of `target` class
    /// (or a subclass of it), though the model forbids that.
    ForbiddenLink { source: ClassName, target: ClassName },
    /// An object's attribute value falls outside the model's constraint for
    /// that attribute.
    AttributeOutOfRange { class: ClassName, attribute: String },
    /// An object carries an attribute the learned model constrains, but the
    /// example object doesn't set it at all.
    MissingAttribute { class: ClassName, attribute: String },
    /// An object shared by name with the learned model has a class that is
    /// neither the learned class nor a subclass of it.
    WrongClass { expected: ClassName, found: ClassName },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    pub object: ObjectName,
    pub kind: ViolationKind,
}

/// The outcome of validating an example: whether it's accepted, and if not,
/// every rule it broke (not just the first).
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks `example` against the rules carried by `learned`.
///
/// Step 1: collect `Must` rules grouped by source class. Step 2: for every
/// object in `example` whose class is that rule's class or a subclass of
/// it, require at least one outgoing link to an object whose class is the
/// rule's target class or a subclass of it. Step 3: collect `MustNot` rules
/// the same way and flag any such link that does exist. Step 4: for every
/// object in `learned` that carries attribute constraints, check the
/// corresponding object (matched by class) in `example` against them. Step
/// 5: return every violation found, not just the first (a caller deciding
/// "good" vs. "near miss" wants the whole list).
pub fn validate(learned: &Model, example: &Model, tree: &ClassificationTree) -> ValidationResult {
    let mut violations = Vec::new();

    check_object_classes(learned, example, tree, &mut violations);
    check_required_links(learned, example, tree, &mut violations);
    check_forbidden_links(learned, example, tree, &mut violations);
    check_attributes(learned, example, &mut violations);

    ValidationResult { violations }
}

/// Spec §4.3 step 1: for every example object that shares a name with an
/// object in the learned model, the example's class must equal the
/// learned class or be a subclass of it.
fn check_object_classes(learned: &Model, example: &Model, tree: &ClassificationTree, violations: &mut Vec<Violation>) {
    for example_obj in example.objects() {
        let Some(learned_obj) = learned.object(&example_obj.name) else {
            continue;
        };
        if learned_obj.class_name == example_obj.class_name {
            continue;
        }
        if !class_matches(tree, &example_obj.class_name, &learned_obj.class_name) {
            violations.push(Violation {
                object: example_obj.name.clone(),
                kind: ViolationKind::WrongClass {
                    expected: learned_obj.class_name.clone(),
                    found: example_obj.class_name.clone(),
                },
            });
        }
    }
}

fn class_matches(tree: &ClassificationTree, object_class: &ClassName, rule_class: &ClassName) -> bool {
    object_class == rule_class || tree.is_subclass(object_class, rule_class)
}

fn check_required_links(
    learned: &Model,
    example: &Model,
    tree: &ClassificationTree,
    violations: &mut Vec<Violation>,
) {
    for rule in learned.links_with_kind(LinkKind::Must) {
        // Instance-level rule (spec §4.3 step 2): both endpoints name
        // objects in the learned model, not classes, so satisfaction is an
        // exact source→target link in `example` rather than a class query.
        if learned.object(&rule.source).is_some() && learned.object(&rule.target).is_some() {
            let satisfied = example
                .links_from(&rule.source)
                .iter()
                .any(|l| l.target == rule.target);
            if !satisfied {
                violations.push(Violation {
                    object: rule.source.clone(),
                    kind: ViolationKind::MissingRequiredLink {
                        source: ClassName::new(rule.source.as_str()),
                        target: ClassName::new(rule.target.as_str()),
                    },
                });
            }
            continue;
        }

        let rule_source = ClassName::new(rule.source.as_str());
        let rule_target = ClassName::new(rule.target.as_str());

        for obj in example.objects() {
            if !class_matches(tree, &obj.class_name, &rule_source) {
                continue;
            }
            let satisfied = example.links_from(&obj.name).iter().any(|l| {
                example
                    .object(&l.target)
                    .map(|target_obj| class_matches(tree, &target_obj.class_name, &rule_target))
                    .unwrap_or(false)
            });
            if !satisfied {
                violations.push(Violation {
                    object: obj.name.clone(),
                    kind: ViolationKind::MissingRequiredLink {
                        source: rule_source.clone(),
                        target: rule_target.clone(),
                    },
                });
            }
        }
    }
}

fn check_forbidden_links(
    learned: &Model,
    example: &Model,
    tree: &ClassificationTree,
    violations: &mut Vec<Violation>,
) {
    for rule in learned.links_with_kind(LinkKind::MustNot) {
        let rule_source = ClassName::new(rule.source.as_str());
        let rule_target = ClassName::new(rule.target.as_str());

        for obj in example.objects() {
            if !class_matches(tree, &obj.class_name, &rule_source) {
                continue;
            }
            for link in example.links_from(&obj.name) {
                if let Some(target_obj) = example.object(&link.target) {
                    if class_matches(tree, &target_obj.class_name, &rule_target) {
                        violations.push(Violation {
                            object: obj.name.clone(),
                            kind: ViolationKind::ForbiddenLink {
                                source: rule_source.clone(),
                                target: rule_target.clone(),
                            },
                        });
                    }
                }
            }
        }
    }
}

fn check_attributes(learned: &Model, example: &Model, violations: &mut Vec<Violation>) {
    let mut checked_classes: IndexSet<ClassName> = IndexSet::new();

    for model_obj in learned.objects() {
        if model_obj.attributes.is_empty() || !checked_classes.insert(model_obj.class_name.clone()) {
            continue;
        }
        for example_obj in example.objects() {
            if example_obj.class_name != model_obj.class_name {
                continue;
            }
            for (attr, constraint) in &model_obj.attributes {
                let Some(value) = example_obj.attributes.get(attr) else {
                    violations.push(Violation {
                        object: example_obj.name.clone(),
                        kind: ViolationKind::MissingAttribute {
                            class: model_obj.class_name.clone(),
                            attribute: attr.clone(),
                        },
                    });
                    continue;
                };
                let scalar = match value {
                    crate::model::AttrValue::Scalar(s) => Some(s.clone()),
                    _ => None,
                };
                let Some(scalar) = scalar else { continue };
                if !constraint.accepts(&scalar) {
                    violations.push(Violation {
                        object: example_obj.name.clone(),
                        kind: ViolationKind::AttributeOutOfRange {
                            class: model_obj.class_name.clone(),
                            attribute: attr.clone(),
                        },
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttrValue, Link, Object};

    fn tree() -> ClassificationTree {
        let mut t = ClassificationTree::new();
        t.add("Vehicle".into(), None).unwrap();
        t.add("BMW".into(), Some("Vehicle".into())).unwrap();
        t.add("X5".into(), Some("BMW".into())).unwrap();
        t.add("Component".into(), None).unwrap();
        t.add("DriveSystem".into(), Some("Component".into())).unwrap();
        t.add("XDrive".into(), Some("DriveSystem".into())).unwrap();
        t.add("RWD".into(), Some("DriveSystem".into())).unwrap();
        t
    }

    #[test]
    fn missing_required_link_is_a_violation() {
        let t = tree();
        let mut learned = Model::new();
        learned.add_link(Link::must("X5", "XDrive")).unwrap();

        let mut example = Model::new();
        example.add_object(Object::new("car1", "X5")).unwrap();

        let result = validate(&learned, &example, &t);
        assert!(!result.is_valid());
        assert!(matches!(
            result.violations[0].kind,
            ViolationKind::MissingRequiredLink { .. }
        ));
    }

    #[test]
    fn required_link_satisfied_by_subclass_target() {
        let t = tree();
        let mut learned = Model::new();
        learned.add_link(Link::must("X5", "DriveSystem")).unwrap();

        let mut example = Model::new();
        example.add_object(Object::new("car1", "X5")).unwrap();
        example.add_object(Object::new("drive1", "XDrive")).unwrap();
        example.add_link(Link::regular("car1", "drive1")).unwrap();

        let result = validate(&learned, &example, &t);
        assert!(result.is_valid());
    }

    #[test]
    fn instance_level_required_link_checks_exact_source_and_target() {
        let t = tree();
        let mut learned = Model::new();
        learned.add_object(Object::new("car1", "X5")).unwrap();
        learned.add_object(Object::new("drive1", "XDrive")).unwrap();
        learned.add_link(Link::must("car1", "drive1")).unwrap();

        let mut missing = Model::new();
        missing.add_object(Object::new("car1", "X5")).unwrap();
        let result = validate(&learned, &missing, &t);
        assert!(!result.is_valid());
        assert!(matches!(
            result.violations[0].kind,
            ViolationKind::MissingRequiredLink { .. }
        ));

        let mut satisfied = Model::new();
        satisfied.add_object(Object::new("car1", "X5")).unwrap();
        satisfied.add_object(Object::new("drive1", "XDrive")).unwrap();
        satisfied.add_link(Link::regular("car1", "drive1")).unwrap();
        assert!(validate(&learned, &satisfied, &t).is_valid());
    }

    #[test]
    fn forbidden_link_present_is_a_violation() {
        let t = tree();
        let mut learned = Model::new();
        learned.add_link(Link::must_not("X5", "RWD")).unwrap();

        let mut example = Model::new();
        example.add_object(Object::new("car1", "X5")).unwrap();
        example.add_object(Object::new("drive1", "RWD")).unwrap();
        example.add_link(Link::regular("car1", "drive1")).unwrap();

        let result = validate(&learned, &example, &t);
        assert!(!result.is_valid());
        assert!(matches!(result.violations[0].kind, ViolationKind::ForbiddenLink { .. }));
    }

    #[test]
    fn wrong_class_on_shared_name_is_a_violation_unless_subclass() {
        let t = tree();
        let mut learned = Model::new();
        learned.add_object(Object::new("car1", "X5")).unwrap();

        let mut unrelated = Model::new();
        unrelated.add_object(Object::new("car1", "Component")).unwrap();
        let result = validate(&learned, &unrelated, &t);
        assert!(!result.is_valid());
        assert!(matches!(result.violations[0].kind, ViolationKind::WrongClass { .. }));

        let mut matching = Model::new();
        matching.add_object(Object::new("car1", "X5")).unwrap();
        assert!(validate(&learned, &matching, &t).is_valid());
    }

    #[test]
    fn missing_attribute_is_a_violation() {
        let t = tree();
        let mut learned = Model::new();
        learned
            .add_object(Object::new("engine_template", "Engine").with_attribute("cylinders", AttrValue::Scalar(4.0.into())))
            .unwrap();

        let mut example = Model::new();
        example.add_object(Object::new("engine1", "Engine")).unwrap();

        let result = validate(&learned, &example, &t);
        assert!(!result.is_valid());
        assert!(matches!(result.violations[0].kind, ViolationKind::MissingAttribute { .. }));
    }

    #[test]
    fn attribute_interval_violation_is_detected() {
        let t = tree();
        let mut learned = Model::new();
        learned
            .add_object(
                Object::new("engine_template", "Engine")
                    .with_attribute("cylinders", AttrValue::Interval(4.0.into(), 6.0.into())),
            )
            .unwrap();

        let mut example = Model::new();
        example
            .add_object(Object::new("engine1", "Engine").with_attribute("cylinders", AttrValue::Scalar(8.0.into())))
            .unwrap();

        let result = validate(&learned, &example, &t);
        assert!(!result.is_valid());
        assert!(matches!(
            result.violations[0].kind,
            ViolationKind::AttributeOutOfRange { .. }
        ));
    }
}
