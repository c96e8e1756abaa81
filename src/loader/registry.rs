// src/loader/registry.rs

//! Compiled-in migrations keyed by step file name.
//!
//! Discovery still walks the filesystem to decide which steps exist and in
//! which order; the file at `<group>/<ordinal>_<slug>.toml` only has to
//! exist; its contents are ignored. The registry supplies the code.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{MigrunError, Result};
use crate::exec::Migration;

use super::StepLoader;

#[derive(Default, Clone)]
pub struct MigrationRegistry {
    /// Keyed by `(group, file_name)`; group `None` matches any group.
    entries: HashMap<(Option<String>, String), Arc<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration for `file_name` within `group`.
    pub fn register(
        &mut self,
        group: impl Into<String>,
        file_name: impl Into<String>,
        migration: impl Migration + 'static,
    ) -> &mut Self {
        self.entries
            .insert((Some(group.into()), file_name.into()), Arc::new(migration));
        self
    }

    /// Register a migration for `file_name` in whichever group contains it.
    pub fn register_any_group(
        &mut self,
        file_name: impl Into<String>,
        migration: impl Migration + 'static,
    ) -> &mut Self {
        self.entries
            .insert((None, file_name.into()), Arc::new(migration));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, group: Option<&str>, file_name: &str) -> Option<Arc<dyn Migration>> {
        let exact = group.and_then(|g| {
            self.entries
                .get(&(Some(g.to_string()), file_name.to_string()))
        });
        exact
            .or_else(|| self.entries.get(&(None, file_name.to_string())))
            .cloned()
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("MigrationRegistry")
            .field("entries", &keys)
            .finish()
    }
}

impl StepLoader for MigrationRegistry {
    fn load(&self, path: &Path) -> Result<Arc<dyn Migration>> {
        let load_error = |reason: &str| MigrunError::StepLoad {
            path: PathBuf::from(path),
            reason: reason.to_string(),
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| load_error("step path has no file name"))?;
        let group = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str());

        self.lookup(group, file_name)
            .ok_or_else(|| load_error("no migration registered for this step file"))
    }
}
