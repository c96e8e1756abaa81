// src/loader/manifest.rs

//! TOML step manifests.
//!
//! ```toml
//! name = "Add users table"
//!
//! [forward]
//! cmd = "psql -f add_users.sql"
//! cwd = "sql"                      # relative to the group directory
//! env = { PGDATABASE = "app" }
//! ```
//!
//! Only `[forward].cmd` is required. A manifest without a `forward` key is a
//! contract failure rather than a load failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::{MigrunError, Result};
use crate::exec::{CommandMigration, Migration};
use crate::fs::FileSystem;

use super::StepLoader;

/// Top-level manifest document as read from a step file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    /// Optional display name for logs.
    #[serde(default)]
    pub name: Option<String>,

    /// The `[forward]` table. `None` means the contract is not met.
    #[serde(default)]
    pub forward: Option<ForwardSection>,
}

/// `[forward]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardSection {
    /// Shell command to run.
    pub cmd: String,

    /// Working directory; relative paths are taken from the manifest's
    /// directory. Defaults to the migrator's own working directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variables for the command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Parse manifest text into a [`CommandMigration`].
pub fn parse_manifest(path: &Path, contents: &str) -> Result<CommandMigration> {
    let raw: RawManifest = toml::from_str(contents).map_err(|e| MigrunError::StepLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Some(forward) = raw.forward else {
        return Err(MigrunError::StepContract {
            path: path.to_path_buf(),
            message: "forward entry point not found".to_string(),
        });
    };

    let cwd = forward.cwd.map(|cwd| match path.parent() {
        Some(dir) if cwd.is_relative() => dir.join(cwd),
        _ => cwd,
    });

    Ok(CommandMigration {
        name: raw.name,
        cmd: forward.cmd,
        cwd,
        env: forward.env,
    })
}

/// Loads step files as TOML manifests through a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    fs: Arc<dyn FileSystem>,
}

impl ManifestLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl StepLoader for ManifestLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Migration>> {
        let contents = self
            .fs
            .read_to_string(path)
            .map_err(|e| MigrunError::StepLoad {
                path: path.to_path_buf(),
                reason: format!("{e:#}"),
            })?;

        let migration = parse_manifest(path, &contents)?;
        Ok(Arc::new(migration))
    }
}
