use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A migrations root in a temporary directory.
///
/// ```text
/// <tmp>/<group>/<ordinal>_<slug>.toml
/// ```
pub struct MigrationTree {
    dir: TempDir,
}

impl MigrationTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("creating temp dir for migration tree"),
        }
    }

    /// A tree pre-populated with a copy of `fixture` (a directory of groups).
    pub fn from_fixture(fixture: impl AsRef<Path>) -> Self {
        let tree = Self::new();
        copy_dir(fixture.as_ref(), tree.root()).expect("copying fixture tree");
        tree
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create (if needed) and return a group directory.
    pub fn group(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::create_dir_all(&path).expect("creating group dir");
        path
    }

    /// Write a step file with arbitrary contents.
    pub fn step(&self, group: &str, file_name: &str, contents: &str) -> PathBuf {
        let path = self.group(group).join(file_name);
        fs::write(&path, contents).expect("writing step file");
        path
    }

    /// Write a manifest whose `forward` runs `cmd` from the tree root.
    pub fn command_step(&self, group: &str, file_name: &str, cmd: &str) -> PathBuf {
        let contents = format!("[forward]\ncmd = '''{cmd}'''\ncwd = \"..\"\n");
        self.step(group, file_name, &contents)
    }

    /// Copy a single file into a group (e.g. a faulty fixture step).
    pub fn inject(&self, group: &str, source: impl AsRef<Path>) -> PathBuf {
        let source = source.as_ref();
        let file_name = source.file_name().expect("fixture file has a name");
        let dest = self.group(group).join(file_name);
        fs::copy(source, &dest).expect("copying fixture step");
        dest
    }

    pub fn remove(&self, group: &str, file_name: &str) {
        fs::remove_file(self.root().join(group).join(file_name)).expect("removing step file");
    }
}

impl Default for MigrationTree {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
