// src/discovery/mod.rs

//! Discovery of migration groups and their step files.
//!
//! Layout on disk:
//!
//! ```text
//! <root>/
//!   actors/
//!     0001_add_users.toml
//!     0002_add_roles.toml
//!   events/
//!     0001_add_events.toml
//! ```
//!
//! Each immediate subdirectory of the root is a *group*. Inside a group, every
//! regular file whose name matches [`STEP_FILE_PATTERN`] is a *step*. Nothing
//! here mutates the filesystem.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Extension of step files understood by the manifest loader.
pub const STEP_FILE_EXTENSION: &str = "toml";

/// `<digits>_<slug>.<STEP_FILE_EXTENSION>`; capture group 1 is the ordinal.
pub static STEP_FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^([0-9]+)_\S+\.{}$", regex::escape(STEP_FILE_EXTENSION));
    Regex::new(&pattern).expect("step file pattern is a valid regex")
});

/// A step file found inside a group directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// Leading digits of the file name, kept as a string.
    pub ordinal: String,
    pub file_name: String,
    /// Full path (group directory joined with `file_name`).
    pub path: PathBuf,
}

impl StepDescriptor {
    /// Build a descriptor from a file path, or `None` if the file name does
    /// not follow the step naming convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let ordinal = parse_ordinal(file_name)?;
        Some(Self {
            ordinal: ordinal.to_string(),
            file_name: file_name.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Extract the ordinal prefix of a step file name.
pub fn parse_ordinal(file_name: &str) -> Option<&str> {
    STEP_FILE_PATTERN
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// List the groups under `root`: its immediate subdirectories, in the order
/// the host enumerates them.
pub fn list_groups(fs: &dyn FileSystem, root: &Path) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    for entry in fs.read_dir(root)? {
        if !fs.is_dir(&entry) {
            continue;
        }
        match entry.file_name().and_then(|n| n.to_str()) {
            Some(name) => groups.push(name.to_string()),
            None => warn!(
                path = %entry.display(),
                "skipping group directory whose name is not valid UTF-8"
            ),
        }
    }
    debug!(root = %root.display(), ?groups, "discovered migration groups");
    Ok(groups)
}

/// List the steps of one group, ordered by ordinal.
///
/// Subdirectories and files not matching [`STEP_FILE_PATTERN`] are skipped.
/// A missing or unreadable group directory is an error.
pub fn list_steps(fs: &dyn FileSystem, group_dir: &Path) -> Result<Vec<StepDescriptor>> {
    let mut steps: Vec<StepDescriptor> = fs
        .read_dir(group_dir)?
        .into_iter()
        .filter(|entry| !fs.is_dir(entry))
        .filter_map(|entry| StepDescriptor::from_path(&entry))
        .collect();

    sort_steps(&mut steps);

    debug!(
        group_dir = %group_dir.display(),
        steps = steps.len(),
        "discovered migration steps"
    );
    Ok(steps)
}

/// Order steps by comparing ordinals as strings.
///
/// This is lexicographic, not numeric: `"10"` sorts before `"9"`. Zero-pad
/// ordinals to a fixed width to get numeric order. The sort is stable, so
/// steps sharing an ordinal keep their listing order.
pub fn sort_steps(steps: &mut [StepDescriptor]) {
    steps.sort_by(|a, b| a.ordinal.cmp(&b.ordinal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn names(steps: &[StepDescriptor]) -> Vec<&str> {
        steps.iter().map(|s| s.file_name.as_str()).collect()
    }

    #[test]
    fn parse_ordinal_follows_naming_grammar() {
        assert_eq!(parse_ordinal("0001_add_users.toml"), Some("0001"));
        assert_eq!(parse_ordinal("12_x.toml"), Some("12"));
        assert_eq!(parse_ordinal("0001_add users.toml"), None);
        assert_eq!(parse_ordinal("0001_.toml"), None);
        assert_eq!(parse_ordinal("add_users.toml"), None);
        assert_eq!(parse_ordinal("0001_add_users.js"), None);
        assert_eq!(parse_ordinal("0001-add_users.toml"), None);
        assert_eq!(parse_ordinal("0001_add_users.toml.bak"), None);
    }

    #[test]
    fn pattern_uses_step_file_extension() {
        let name = format!("0001_add_users.{STEP_FILE_EXTENSION}");
        assert!(STEP_FILE_PATTERN.is_match(&name));
        assert!(!STEP_FILE_PATTERN.is_match("0001_add_users.xtoml"));
        assert!(!STEP_FILE_PATTERN.is_match("0001_add_usersatoml"));
    }

    #[test]
    fn groups_are_directories_in_listing_order() {
        let fs = MockFileSystem::new();
        fs.add_file("root/events/0001_a.toml", "");
        fs.add_file("root/README.md", "");
        fs.add_dir("root/actors");

        let groups = list_groups(&fs, Path::new("root")).unwrap();
        assert_eq!(groups, vec!["events".to_string(), "actors".to_string()]);
    }

    #[test]
    fn steps_skip_non_matching_files_and_subdirectories() {
        let fs = MockFileSystem::new();
        fs.add_file("g/0002_b.toml", "");
        fs.add_file("g/notes.txt", "");
        fs.add_file("g/0003_c.js", "");
        fs.add_dir("g/0004_dir.toml");
        fs.add_file("g/0001_a.toml", "");

        let steps = list_steps(&fs, Path::new("g")).unwrap();
        assert_eq!(names(&steps), vec!["0001_a.toml", "0002_b.toml"]);
        assert_eq!(steps[0].ordinal, "0001");
        assert_eq!(steps[0].path, PathBuf::from("g/0001_a.toml"));
    }

    #[test]
    fn ordinals_compare_as_strings() {
        let fs = MockFileSystem::new();
        fs.add_file("g/9_nine.toml", "");
        fs.add_file("g/10_ten.toml", "");

        let steps = list_steps(&fs, Path::new("g")).unwrap();
        assert_eq!(names(&steps), vec!["10_ten.toml", "9_nine.toml"]);
    }

    #[test]
    fn equal_ordinals_keep_listing_order() {
        let fs = MockFileSystem::new();
        fs.add_file("g/0002_zeta.toml", "");
        fs.add_file("g/0001_b.toml", "");
        fs.add_file("g/0001_a.toml", "");

        let steps = list_steps(&fs, Path::new("g")).unwrap();
        assert_eq!(
            names(&steps),
            vec!["0001_b.toml", "0001_a.toml", "0002_zeta.toml"]
        );
    }

    #[test]
    fn missing_group_directory_is_an_error() {
        let fs = MockFileSystem::new();
        assert!(list_steps(&fs, Path::new("nope")).is_err());
    }
}
