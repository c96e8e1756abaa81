// src/exec/command.rs

//! Shell-command migration step.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use super::{Migration, MigrationFuture};

/// Runs `cmd` through the platform shell when the step is applied.
///
/// Output is not passed through: stdout lines are logged at `info`, stderr
/// lines at `debug`. A non-zero exit status fails the step.
#[derive(Debug, Clone)]
pub struct CommandMigration {
    pub name: Option<String>,
    pub cmd: String,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl CommandMigration {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            name: None,
            cmd: cmd.into(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.cmd.clone())
    }

    async fn run(&self) -> Result<()> {
        let label = self.label();
        info!(step = %label, cmd = %self.cmd, "starting migration command");

        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process for command `{}`", self.cmd))?;

        let stdout_task = child.stdout.take().map(|stdout| {
            let label = label.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(step = %label, "stdout: {}", line);
                }
            })
        });

        let stderr_task = child.stderr.take().map(|stderr| {
            let label = label.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(step = %label, "stderr: {}", line);
                }
            })
        });

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for process of command `{}`", self.cmd))?;

        // Drain the output readers so every line is logged before we return.
        for handle in [stdout_task, stderr_task].into_iter().flatten() {
            let _ = handle.await;
        }

        let code = status.code().unwrap_or(-1);
        info!(
            step = %label,
            exit_code = code,
            success = status.success(),
            "migration command exited"
        );

        if !status.success() {
            bail!("command `{}` exited with status {}", self.cmd, code);
        }
        Ok(())
    }
}

impl Migration for CommandMigration {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn forward(&self) -> MigrationFuture<'_> {
        Box::pin(self.run())
    }
}
