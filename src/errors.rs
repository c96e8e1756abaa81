// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrunError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Migrator is not configured; call configure() with a root directory first")]
    NotConfigured,

    #[error("Failed to load migration file {path:?}: {reason}")]
    StepLoad { path: PathBuf, reason: String },

    #[error("Failed to prepare migration file {path:?}: {message}")]
    StepContract { path: PathBuf, message: String },

    #[error("Migration step '{step}' in group '{group}' failed: {source:#}")]
    StepExecution {
        group: String,
        step: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MigrunError {
    /// True for the two failure modes the loader reports per step file.
    pub fn is_step_validation(&self) -> bool {
        matches!(
            self,
            MigrunError::StepLoad { .. } | MigrunError::StepContract { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MigrunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_contract_errors_mention_path() {
        let load = MigrunError::StepLoad {
            path: PathBuf::from("tasks/actors/0005_add_prizes.toml"),
            reason: "expected `=`".to_string(),
        };
        let contract = MigrunError::StepContract {
            path: PathBuf::from("tasks/actors/0006_add_tickets.toml"),
            message: "forward entry point not found".to_string(),
        };

        assert!(load.to_string().contains("0005_add_prizes.toml"));
        assert!(contract.to_string().contains("0006_add_tickets.toml"));
        assert!(contract.to_string().contains("forward entry point not found"));
        assert!(load.is_step_validation());
        assert!(contract.is_step_validation());
        assert!(!MigrunError::NotConfigured.is_step_validation());
    }

    #[test]
    fn execution_error_keeps_source_chain() {
        let err = MigrunError::StepExecution {
            group: "events".to_string(),
            step: "0001_add_events.toml".to_string(),
            source: anyhow::anyhow!("exit status 3"),
        };
        let msg = err.to_string();
        assert!(msg.contains("events"));
        assert!(msg.contains("exit status 3"));
    }
}
