//! # winston-core
//!
//! A Winston-style incremental concept learner: given a stream of
//! (positive, near-miss) relational examples, maintains one evolving
//! concept model — a typed graph of objects, class memberships, and
//! required/forbidden relationships — by running a fixed-priority pipeline
//! of heuristics over it after each example.
//!
//! ## Architecture
//!
//! - **Classification tree** ([`classification`]): a rooted forest of class
//!   names supporting ancestry queries and union-class introduction.
//! - **Model** ([`model`]): the typed graph of objects and links the
//!   learner mutates, with index-assisted query/mutation primitives.
//! - **Learner** ([`learner`]): the nine-heuristic pipeline that revises a
//!   model from a `(positive, near_miss)` pair, plus bounded history for
//!   roll-back.
//! - **Validator** ([`validator`]): decides whether a candidate model
//!   satisfies the constraints carried by a learned model.
//! - **Adapter** ([`adapter`]): converts between the fixed predicate
//!   vocabulary (`IsA`/`HasPart`/`MustHavePart`/`MustNotHavePart`/
//!   `Attribute`) and a [`model::Model`].
//!
//! ## Library usage
//!
//! ```
//! use std::sync::Arc;
//! use winston_core::classification::ClassificationTree;
//! use winston_core::learner::Learner;
//! use winston_core::model::{Link, Model, Object};
//!
//! let mut tree = ClassificationTree::new();
//! tree.add("Vehicle".into(), None).unwrap();
//! tree.add("BMW".into(), Some("Vehicle".into())).unwrap();
//! tree.add("Component".into(), None).unwrap();
//! tree.add("Engine".into(), Some("Component".into())).unwrap();
//!
//! let mut learner = Learner::new(Arc::new(tree));
//!
//! let mut positive = Model::new();
//! positive.add_object(Object::new("car1", "BMW")).unwrap();
//! positive.add_object(Object::new("engine1", "Engine")).unwrap();
//! positive.add_link(Link::regular("car1", "engine1")).unwrap();
//!
//! let model = learner.update(&Model::new(), &positive, None);
//! assert!(model.has_link(&Link::regular("car1", "engine1")));
//! ```

pub mod adapter;
pub mod classification;
pub mod error;
pub mod learner;
pub mod model;
pub mod name;
pub mod validator;
