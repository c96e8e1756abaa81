// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::StepFailurePolicy;

/// Command-line arguments for `migrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrun",
    version,
    about = "Apply forward-only migration steps, group by group, in order.",
    long_about = None
)]
pub struct CliArgs {
    /// Root directory containing one subdirectory per migration group.
    #[arg(short, long, value_name = "PATH", default_value = "./tasks")]
    pub dir: PathBuf,

    /// Only run this group instead of every group under `--dir`.
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// What to do when a step fails while running: `abort` or `continue`.
    #[arg(long, value_name = "POLICY", default_value = "abort")]
    pub on_step_failure: StepFailurePolicy,

    /// Discover and validate every step, print the plan, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MIGRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tasks_directory() {
        let args = CliArgs::try_parse_from(["migrun"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("./tasks"));
        assert_eq!(args.on_step_failure, StepFailurePolicy::Abort);
        assert!(args.group.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "migrun",
            "-d",
            "db/migrations",
            "--group",
            "actors",
            "--on-step-failure",
            "continue",
            "--dry-run",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.dir, PathBuf::from("db/migrations"));
        assert_eq!(args.group.as_deref(), Some("actors"));
        assert_eq!(args.on_step_failure, StepFailurePolicy::Continue);
        assert!(args.dry_run);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(CliArgs::try_parse_from(["migrun", "--on-step-failure", "retry"]).is_err());
    }
}
