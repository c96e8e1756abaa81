// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // child names, in insertion order
}

/// In-memory filesystem.
///
/// Directory listings come back in insertion order, which makes tie-breaking
/// between steps with equal ordinals deterministic in tests.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    read_dir_calls: Arc<AtomicUsize>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            read_dir_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_into_parent(&mut files, &path);
    }

    /// Create an (empty) directory and any missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Remove a file entry and unlink it from its parent listing.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.lock().unwrap();
        files.remove(path);
        let parent = parent_or_dot(path);
        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            files.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            children.retain(|c| c != name);
        }
    }

    /// How many times `read_dir` has been called on this filesystem.
    pub fn read_dir_calls(&self) -> usize {
        self.read_dir_calls.load(Ordering::SeqCst)
    }

    fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let parent = parent_or_dot(path);
        if parent == path {
            return;
        }
        Self::ensure_dir_entry(files, parent);
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        Self::link_into_parent(files, path);
    }
}

fn parent_or_dot(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_calls.fetch_add(1, Ordering::SeqCst);
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
