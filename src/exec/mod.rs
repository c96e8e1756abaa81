// src/exec/mod.rs

//! Executable migration units.
//!
//! A [`Migration`] is what a step file resolves to: something with a
//! `forward` operation that the migrator awaits to completion before moving
//! on to the next step.
//!
//! - [`command`] holds [`CommandMigration`], the unit produced by the TOML
//!   manifest loader, which runs a shell command via `tokio::process`.
//! - [`FnMigration`] wraps an async closure; used by the compiled-in
//!   registry loader and by tests.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub mod command;

pub use command::CommandMigration;

/// Boxed future returned by [`Migration::forward`].
pub type MigrationFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// A single forward-only migration step.
pub trait Migration: Send + Sync {
    /// Human-readable name, used only for logging.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Apply the step. May be synchronous in practice; it is always awaited.
    fn forward(&self) -> MigrationFuture<'_>;
}

/// [`Migration`] backed by a closure returning a future.
pub struct FnMigration<F> {
    name: Option<String>,
    f: F,
}

impl<F, Fut> FnMigration<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { name: None, f }
    }

    pub fn named(name: impl Into<String>, f: F) -> Self {
        Self {
            name: Some(name.into()),
            f,
        }
    }
}

impl<F> fmt::Debug for FnMigration<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMigration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> Migration for FnMigration<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn forward(&self) -> MigrationFuture<'_> {
        Box::pin((self.f)())
    }
}
