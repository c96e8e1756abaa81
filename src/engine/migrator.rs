// src/engine/migrator.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::discovery::{list_groups, list_steps};
use crate::errors::{MigrunError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::loader::{resolve_all, ManifestLoader, StepLoader};
use crate::types::StepFailurePolicy;

use super::{GroupName, GroupPlan, MigratorOptions};

/// State captured by [`Migrator::configure`].
#[derive(Debug, Clone)]
struct Configured {
    root: PathBuf,
    groups: Vec<GroupName>,
}

/// Discovers migration groups under a root directory and applies them.
///
/// There is no ledger of applied steps: every run applies every step again.
pub struct Migrator<L: StepLoader = ManifestLoader> {
    fs: Arc<dyn FileSystem>,
    loader: L,
    options: MigratorOptions,
    state: Option<Configured>,
}

impl<L: StepLoader> fmt::Debug for Migrator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Migrator<ManifestLoader> {
    /// Migrator reading TOML manifests from the real filesystem.
    pub fn on_disk() -> Self {
        Self::with_manifests(Arc::new(RealFileSystem))
    }

    /// Migrator reading TOML manifests through `fs`.
    pub fn with_manifests(fs: Arc<dyn FileSystem>) -> Self {
        let loader = ManifestLoader::new(Arc::clone(&fs));
        Self::new(fs, loader)
    }
}

impl<L: StepLoader> Migrator<L> {
    pub fn new(fs: Arc<dyn FileSystem>, loader: L) -> Self {
        Self {
            fs,
            loader,
            options: MigratorOptions::default(),
            state: None,
        }
    }

    pub fn with_options(mut self, options: MigratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> MigratorOptions {
        self.options
    }

    /// Set the root directory and snapshot its groups.
    ///
    /// A root with no subdirectories is fine. A root that cannot be listed is
    /// an error, and leaves any previous configuration in place.
    pub fn configure(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(MigrunError::InvalidArgument(
                "root directory must not be empty".to_string(),
            ));
        }

        let groups = list_groups(self.fs.as_ref(), root)?;
        info!(root = %root.display(), groups = groups.len(), "migrator configured");

        self.state = Some(Configured {
            root: root.to_path_buf(),
            groups,
        });
        Ok(())
    }

    /// Forget the root directory and the group list. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.state.take().is_some() {
            debug!("migrator configuration cleared");
        }
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    pub fn root(&self) -> Option<&Path> {
        self.state.as_ref().map(|s| s.root.as_path())
    }

    /// Groups found at configure time, in listing order.
    pub fn groups(&self) -> &[GroupName] {
        self.state
            .as_ref()
            .map(|s| s.groups.as_slice())
            .unwrap_or_default()
    }

    /// Discover and resolve the steps of `group` without applying anything.
    pub fn plan_group(&self, group: &str) -> Result<GroupPlan> {
        ensure_group_name(group)?;
        let state = self.state()?;
        self.plan_in(&state.root, group)
    }

    /// Apply every group in listing order.
    ///
    /// A group with an invalid step contributes 0 and the run moves on. A
    /// failing step aborts the whole run under [`StepFailurePolicy::Abort`].
    pub async fn run_all(&self) -> Result<usize> {
        let state = self.state()?;
        let mut applied = 0;

        for group in &state.groups {
            applied += self.apply_group(&state.root, group).await?;
        }

        info!(applied, groups = state.groups.len(), "all migrations processed");
        Ok(applied)
    }

    /// Apply one group and return how many steps were applied.
    ///
    /// The group's steps are rescanned on every call. If any step fails to
    /// resolve, nothing is applied and 0 is returned.
    pub async fn run_group(&self, group: &str) -> Result<usize> {
        ensure_group_name(group)?;
        let state = self.state()?;
        self.apply_group(&state.root, group).await
    }

    fn state(&self) -> Result<&Configured> {
        self.state.as_ref().ok_or(MigrunError::NotConfigured)
    }

    fn plan_in(&self, root: &Path, group: &str) -> Result<GroupPlan> {
        let steps = list_steps(self.fs.as_ref(), &root.join(group))?;
        Ok(GroupPlan {
            group: group.to_string(),
            steps: resolve_all(&self.loader, steps),
        })
    }

    async fn apply_group(&self, root: &Path, group: &str) -> Result<usize> {
        let plan = self.plan_in(root, group)?;

        let Some(ready) = plan.ready_steps() else {
            error!(
                group,
                invalid = plan.invalid().count(),
                "one or more migration files are incompatible; skipping group"
            );
            return Ok(0);
        };

        info!(group, steps = ready.len(), "running migrations for group");

        let mut applied = 0;
        for (step, migration) in ready {
            let name = migration.name().unwrap_or(&step.file_name);
            info!(group, ordinal = %step.ordinal, "applying {name}");

            if let Err(source) = migration.forward().await {
                let err = MigrunError::StepExecution {
                    group: group.to_string(),
                    step: step.file_name.clone(),
                    source,
                };
                match self.options.on_step_failure {
                    StepFailurePolicy::Abort => return Err(err),
                    StepFailurePolicy::Continue => {
                        error!(group, error = %err, "migration step failed");
                        warn!(
                            group,
                            applied,
                            skipped = plan.len() - applied - 1,
                            "skipping remaining steps of group"
                        );
                        return Ok(applied);
                    }
                }
            }
            applied += 1;
        }

        Ok(applied)
    }
}

fn ensure_group_name(group: &str) -> Result<()> {
    if group.is_empty() {
        return Err(MigrunError::InvalidArgument(
            "group name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn manifest(cmd: &str) -> String {
        format!("[forward]\ncmd = \"{cmd}\"\n")
    }

    #[test]
    fn configure_rejects_empty_root() {
        let mut migrator = Migrator::with_manifests(Arc::new(MockFileSystem::new()));
        let err = migrator.configure("").unwrap_err();
        assert!(matches!(err, MigrunError::InvalidArgument(_)));
        assert!(!migrator.is_configured());
    }

    #[test]
    fn configure_snapshots_groups_and_destroy_clears() {
        let fs = MockFileSystem::new();
        fs.add_file("root/actors/0001_a.toml", manifest("true"));
        fs.add_dir("root/events");
        let mut migrator = Migrator::with_manifests(Arc::new(fs.clone()));

        migrator.configure("root").unwrap();
        assert_eq!(migrator.root(), Some(Path::new("root")));
        assert_eq!(migrator.groups(), ["actors", "events"]);

        // Groups added later are not seen until the next configure.
        fs.add_dir("root/venues");
        assert_eq!(migrator.groups().len(), 2);

        migrator.destroy();
        migrator.destroy();
        assert!(!migrator.is_configured());
        assert!(migrator.groups().is_empty());
        assert_eq!(migrator.root(), None);
    }

    #[test]
    fn configure_on_missing_root_keeps_previous_state() {
        let fs = MockFileSystem::new();
        fs.add_dir("root/actors");
        let mut migrator = Migrator::with_manifests(Arc::new(fs));

        migrator.configure("root").unwrap();
        assert!(migrator.configure("missing").is_err());
        assert_eq!(migrator.root(), Some(Path::new("root")));
    }

    #[test]
    fn plan_group_reports_each_invalid_step() {
        let fs = MockFileSystem::new();
        fs.add_file("root/actors/0001_a.toml", manifest("true"));
        fs.add_file("root/actors/0002_b.toml", "[forward");
        fs.add_file("root/actors/0003_c.toml", "name = \"c\"\n");
        let mut migrator = Migrator::with_manifests(Arc::new(fs));
        migrator.configure("root").unwrap();

        let plan = migrator.plan_group("actors").unwrap();
        assert_eq!(plan.len(), 3);
        assert!(!plan.is_runnable());
        assert!(plan.ready_steps().is_none());

        let invalid: Vec<_> = plan.invalid().map(|(d, _)| d.file_name.as_str()).collect();
        assert_eq!(invalid, vec!["0002_b.toml", "0003_c.toml"]);
    }

    #[test]
    fn plan_group_validates_arguments() {
        let migrator = Migrator::with_manifests(Arc::new(MockFileSystem::new()));
        assert!(matches!(
            migrator.plan_group(""),
            Err(MigrunError::InvalidArgument(_))
        ));
        assert!(matches!(
            migrator.plan_group("actors"),
            Err(MigrunError::NotConfigured)
        ));
    }
}
