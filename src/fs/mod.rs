// src/fs/mod.rs

//! Filesystem access used by discovery and the manifest loader.
//!
//! Everything that scans or reads the migrations tree goes through the
//! [`FileSystem`] trait so tests can swap in [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn is_dir(&self, path: &Path) -> bool;

    /// Return a list of entries in a directory, in host enumeration order.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry of dir {:?}", path))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}
