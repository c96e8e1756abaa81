// src/loader/mod.rs

//! Turning discovered step files into executable [`Migration`]s.
//!
//! A [`StepLoader`] is the strategy for going from a path to a unit:
//! - [`manifest::ManifestLoader`] reads a TOML manifest from disk (default).
//! - [`registry::MigrationRegistry`] looks the file name up in a compiled-in
//!   table.
//!
//! [`resolve`] and [`resolve_all`] never fail: a malformed step becomes
//! [`Resolution::Invalid`] and its diagnostic is logged, so a whole group's
//! problems surface in a single pass.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::error;

use crate::discovery::StepDescriptor;
use crate::errors::{MigrunError, Result};
use crate::exec::Migration;

pub mod manifest;
pub mod registry;

pub use manifest::ManifestLoader;
pub use registry::MigrationRegistry;

/// Strategy for loading a step file.
///
/// Implementations report failures as [`MigrunError::StepLoad`] (the unit
/// could not be read or parsed) or [`MigrunError::StepContract`] (it loaded
/// but has no `forward` entry point).
pub trait StepLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Migration>>;
}

/// Outcome of resolving one step.
#[derive(Clone)]
pub enum Resolution {
    Ready(Arc<dyn Migration>),
    Invalid(Arc<MigrunError>),
}

impl Resolution {
    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }

    pub fn migration(&self) -> Option<&Arc<dyn Migration>> {
        match self {
            Resolution::Ready(m) => Some(m),
            Resolution::Invalid(_) => None,
        }
    }

    pub fn error(&self) -> Option<&MigrunError> {
        match self {
            Resolution::Ready(_) => None,
            Resolution::Invalid(e) => Some(e),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Ready(m) => f.debug_tuple("Ready").field(&m.name()).finish(),
            Resolution::Invalid(e) => f.debug_tuple("Invalid").field(e).finish(),
        }
    }
}

/// A step descriptor paired with its resolution.
#[derive(Debug, Clone)]
pub struct ResolvedStep {
    pub descriptor: StepDescriptor,
    pub resolution: Resolution,
}

/// Resolve a single step file, logging any failure.
pub fn resolve(loader: &dyn StepLoader, path: &Path) -> Resolution {
    match loader.load(path) {
        Ok(migration) => Resolution::Ready(migration),
        Err(err) => {
            report(path, &err);
            Resolution::Invalid(Arc::new(err))
        }
    }
}

/// Resolve every step, in order, without stopping at the first failure.
pub fn resolve_all(loader: &dyn StepLoader, steps: Vec<StepDescriptor>) -> Vec<ResolvedStep> {
    steps
        .into_iter()
        .map(|descriptor| {
            let resolution = resolve(loader, &descriptor.path);
            ResolvedStep {
                descriptor,
                resolution,
            }
        })
        .collect()
}

fn report(path: &Path, err: &MigrunError) {
    if err.is_step_validation() {
        error!(path = %path.display(), "{err}");
    } else {
        error!(path = %path.display(), error = %err, "unexpected error while loading migration file");
    }
}
