//! The learner: revises a working [`Model`] from a `(positive, near_miss)`
//! pair by running a fixed-order pipeline of heuristics over it (spec
//! §4.4), then validates the result and rolls back to a retained snapshot
//! if the update produced a model that no longer fits the evidence.
//!
//! Mirrors the teacher's `Engine` facade shape: a small owned-config struct
//! plus a handle that wraps the subsystems it coordinates
//! ([`ClassificationTree`], the heuristic pipeline, and `history`), the
//! same division the engine draws between `EngineConfig` and `Engine`.

pub mod conflict;
pub mod heuristics;

use std::collections::VecDeque;
use std::sync::Arc;

use crate::classification::ClassificationTree;
use crate::model::Model;
use crate::validator;

pub use heuristics::Tag;

/// The read-only context every heuristic in the pipeline runs against: the
/// classification tree and the (positive, near_miss) pair for this update.
/// Heuristics never see `current`/`working` through this struct — that's
/// threaded explicitly as the `&mut Model` each pipeline function takes.
pub struct UpdateContext<'a> {
    pub(crate) tree: &'a ClassificationTree,
    pub(crate) positive: &'a Model,
    pub(crate) near_miss: Option<&'a Model>,
}

/// The only configurable knob the spec names: the bounded history ring's
/// capacity (§4.4, "typically 5").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnerConfig {
    pub history_capacity: usize,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        LearnerConfig { history_capacity: 5 }
    }
}

type HeuristicFn = fn(&mut Model, &UpdateContext, &mut Vec<Tag>);

/// The nine-heuristic pipeline in fixed priority order (spec §4.4.2),
/// encoded as data rather than a hard-coded call sequence (§9 design note
/// "Heuristic pipeline as data") so the state machine is literal: reordering
/// is an edit to this table, not a refactor of `update`. `backup_rule` is
/// deliberately absent — it needs `history`, not just the working model, so
/// [`Learner::update`] invokes it directly once the table has run.
const PIPELINE: &[(&str, HeuristicFn)] = &[
    ("seed", heuristics::seed),
    ("check_consistency", heuristics::check_consistency),
    ("climb_tree", heuristics::climb_tree),
    ("require_link", heuristics::require_link),
    ("enlarge_set", heuristics::enlarge_set),
    ("propagate_to_common_ancestor", heuristics::propagate_to_common_ancestor),
    ("forbid_link", heuristics::forbid_link),
    ("drop_link", heuristics::drop_link),
];

/// Applies the heuristic pipeline to revise a [`Model`] from a (positive,
/// near-miss) pair, keeping a bounded history of prior models for
/// `backup_rule` roll-back.
///
/// Owns its `history` and `applied_heuristics` exclusively (spec §5
/// ownership summary); the [`ClassificationTree`] is `Arc`-shared so several
/// `Learner`s backed by the same domain hierarchy can run independently, the
/// same sharing discipline the teacher uses for `KnowledgeGraph`/`ItemMemory`
/// handles inside `Engine`.
pub struct Learner {
    tree: Arc<ClassificationTree>,
    config: LearnerConfig,
    history: VecDeque<Model>,
    applied_heuristics: Vec<Tag>,
}

impl Learner {
    pub fn new(tree: Arc<ClassificationTree>) -> Self {
        Self::with_config(tree, LearnerConfig::default())
    }

    pub fn with_config(tree: Arc<ClassificationTree>, config: LearnerConfig) -> Self {
        Learner {
            tree,
            config,
            history: VecDeque::with_capacity(config.history_capacity),
            applied_heuristics: Vec::new(),
        }
    }

    pub fn tree(&self) -> &ClassificationTree {
        &self.tree
    }

    pub fn applied_heuristics(&self) -> &[Tag] {
        &self.applied_heuristics
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Revises `current` from `(positive, near_miss)` per spec §4.4.1.
    ///
    /// `current` is never mutated; the revised model is returned. An empty
    /// `positive`, or a `Some` `near_miss` that is itself empty, is a
    /// precondition violation: the model comes back unchanged, with no tags
    /// recorded and no history push (spec §4.4.5).
    pub fn update(&mut self, current: &Model, positive: &Model, near_miss: Option<&Model>) -> Model {
        self.applied_heuristics.clear();

        if positive.is_empty() || near_miss.is_some_and(Model::is_empty) {
            tracing::debug!("update: empty positive or near_miss, returning current unchanged");
            return current.copy();
        }

        if !current.is_empty() {
            if self.history.len() == self.config.history_capacity {
                self.history.pop_front();
            }
            self.history.push_back(current.copy());
        }

        let ctx = UpdateContext {
            tree: &self.tree,
            positive,
            near_miss,
        };

        let mut working = current.copy();
        let mut tags = Vec::new();
        for (name, heuristic) in PIPELINE {
            let before = tags.len();
            heuristic(&mut working, &ctx, &mut tags);
            if tags.len() > before {
                tracing::debug!(heuristic = name, fired = tags.len() - before, "heuristic mutated working model");
            }
        }

        let result = self.backup_rule(working, &ctx, &mut tags);
        self.applied_heuristics = tags;
        result
    }

    /// Spec §4.4.2 step 9: the working model must accept `positive` and (if
    /// present) reject `near_miss`. If it does neither, walk `history`
    /// newest-to-oldest for the most recent snapshot that satisfies both; if
    /// none does, keep the working model regardless (spec: "If none
    /// qualifies, keep the working model").
    fn backup_rule(&self, working: Model, ctx: &UpdateContext, tags: &mut Vec<Tag>) -> Model {
        if self.satisfies_pair(&working, ctx) {
            return working;
        }

        for snapshot in self.history.iter().rev() {
            if self.satisfies_pair(snapshot, ctx) {
                tracing::warn!("backup_rule: rolling back to a retained snapshot");
                tags.push("backup_rule".to_string());
                return snapshot.copy();
            }
        }

        working
    }

    fn satisfies_pair(&self, model: &Model, ctx: &UpdateContext) -> bool {
        if !validator::validate(model, ctx.positive, &self.tree).is_valid() {
            return false;
        }
        match ctx.near_miss {
            Some(near_miss) => !validator::validate(model, near_miss, &self.tree).is_valid(),
            None => true,
        }
    }
}
