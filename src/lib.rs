// src/lib.rs

pub mod cli;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod loader;
pub mod logging;
pub mod types;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::engine::{GroupPlan, Migrator, MigratorOptions};
use crate::loader::{Resolution, StepLoader};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - migrator construction from CLI options
/// - configure (group discovery under `--dir`)
/// - dry-run planning, a single `--group`, or every group
pub async fn run(args: CliArgs) -> Result<()> {
    let options = MigratorOptions {
        on_step_failure: args.on_step_failure,
    };
    let mut migrator = Migrator::on_disk().with_options(options);

    migrator
        .configure(&args.dir)
        .with_context(|| format!("configuring migrations directory {:?}", args.dir))?;

    if args.dry_run {
        return print_dry_run(&migrator, args.group.as_deref());
    }

    let applied = match args.group.as_deref() {
        Some(group) => migrator.run_group(group).await?,
        None => migrator.run_all().await?,
    };
    info!(applied, "migration run complete");

    migrator.destroy();
    Ok(())
}

/// Print discovered groups and steps with their validation status.
///
/// Fails if any listed group would be skipped as incompatible.
fn print_dry_run<L: StepLoader>(migrator: &Migrator<L>, only: Option<&str>) -> Result<()> {
    let groups: Vec<&str> = match only {
        Some(group) => vec![group],
        None => migrator.groups().iter().map(String::as_str).collect(),
    };

    println!("migrun dry-run");
    if let Some(root) = migrator.root() {
        println!("  root = {}", root.display());
    }
    println!("  on_step_failure = {}", migrator.options().on_step_failure);
    println!();

    let mut blocked = 0;
    for group in &groups {
        let plan = migrator.plan_group(group)?;
        print_plan(&plan);
        if !plan.is_runnable() {
            blocked += 1;
        }
    }

    debug!("dry-run complete (no execution)");

    if blocked > 0 {
        bail!("{blocked} group(s) contain incompatible migration files");
    }
    Ok(())
}

fn print_plan(plan: &GroupPlan) {
    let status = if plan.is_runnable() { "ok" } else { "BLOCKED" };
    println!("group {} ({} steps, {status}):", plan.group, plan.len());

    for step in &plan.steps {
        let descriptor = &step.descriptor;
        match &step.resolution {
            Resolution::Ready(m) => match m.name() {
                Some(name) => println!("  - {}: {} ({name})", descriptor.ordinal, descriptor.file_name),
                None => println!("  - {}: {}", descriptor.ordinal, descriptor.file_name),
            },
            Resolution::Invalid(err) => {
                println!("  ! {}: {}", descriptor.ordinal, descriptor.file_name);
                println!("      {err}");
            }
        }
    }
}
