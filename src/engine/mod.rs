// src/engine/mod.rs

//! Migration orchestration.
//!
//! [`Migrator`] owns the root directory and the group list snapshotted at
//! [`Migrator::configure`], and applies groups one after another, and the
//! steps of each group one after another. Nothing runs concurrently: a step
//! always observes the effects of every step before it.
//!
//! Per group the sequence is: discover steps, resolve all of them, and only
//! if every one resolved, apply them in order. [`GroupPlan`] is the result
//! of the first two phases and is also what `--dry-run` prints.

use std::sync::Arc;

use crate::discovery::StepDescriptor;
use crate::errors::MigrunError;
use crate::exec::Migration;
use crate::loader::ResolvedStep;
use crate::types::StepFailurePolicy;

pub mod migrator;

pub use migrator::Migrator;

/// Canonical group name type (the group's directory name).
pub type GroupName = String;

/// Options controlling a [`Migrator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MigratorOptions {
    pub on_step_failure: StepFailurePolicy,
}

/// Discovered and resolved steps of one group, not yet applied.
#[derive(Debug, Clone)]
pub struct GroupPlan {
    pub group: GroupName,
    pub steps: Vec<ResolvedStep>,
}

impl GroupPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when every step resolved; an empty group is runnable.
    pub fn is_runnable(&self) -> bool {
        self.steps.iter().all(|s| s.resolution.is_ready())
    }

    /// Steps that failed to resolve, with their diagnostics.
    pub fn invalid(&self) -> impl Iterator<Item = (&StepDescriptor, &MigrunError)> {
        self.steps
            .iter()
            .filter_map(|s| s.resolution.error().map(|e| (&s.descriptor, e)))
    }

    /// All steps paired with their units, or `None` if any step is invalid.
    pub fn ready_steps(&self) -> Option<Vec<(&StepDescriptor, &Arc<dyn Migration>)>> {
        self.steps
            .iter()
            .map(|s| s.resolution.migration().map(|m| (&s.descriptor, m)))
            .collect()
    }
}
