// tests/command_steps.rs
#![cfg(unix)]

use migrun_test_utils::logs::LogCapture;
use migrun_test_utils::tree::MigrationTree;
use migrun_test_utils::{init_tracing, with_timeout, TestResult};

use std::fs;

use tracing::Level;

use migrun::engine::Migrator;
use migrun::errors::MigrunError;

fn run_log(tree: &MigrationTree) -> Vec<String> {
    fs::read_to_string(tree.root().join("run.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn each_step_sees_the_previous_steps_effects() -> TestResult {
    with_timeout(async {
        init_tracing();
        let tree = MigrationTree::new();
        tree.command_step("actors", "0001_create.toml", "echo created > state.txt && echo 0001 >> run.log");
        tree.command_step("actors", "0002_extend.toml", "test -f state.txt && echo 0002 >> run.log");
        tree.command_step("actors", "0003_check.toml", "grep -q created state.txt && echo 0003 >> run.log");

        let mut migrator = Migrator::on_disk();
        migrator.configure(tree.root())?;

        assert_eq!(migrator.run_all().await?, 3);
        assert_eq!(run_log(&tree), vec!["0001", "0002", "0003"]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn failing_command_aborts_remaining_work() -> TestResult {
    with_timeout(async {
        init_tracing();
        let tree = MigrationTree::new();
        tree.command_step("actors", "0001_ok.toml", "echo 0001 >> run.log");
        tree.command_step("actors", "0002_fail.toml", "echo boom >&2; exit 7");
        tree.command_step("actors", "0003_never.toml", "echo 0003 >> run.log");

        let mut migrator = Migrator::on_disk();
        migrator.configure(tree.root())?;

        match migrator.run_group("actors").await {
            Err(MigrunError::StepExecution { step, source, .. }) => {
                assert_eq!(step, "0002_fail.toml");
                assert!(source.to_string().contains("status 7"));
            }
            other => panic!("expected StepExecution, got {other:?}"),
        }
        assert_eq!(run_log(&tree), vec!["0001"]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn manifest_env_reaches_the_command() -> TestResult {
    with_timeout(async {
        init_tracing();
        let tree = MigrationTree::new();
        tree.step(
            "events",
            "0001_env.toml",
            "name = \"env\"\n[forward]\ncmd = 'echo \"$TABLE\" >> run.log'\ncwd = \"..\"\nenv = { TABLE = \"events\" }\n",
        );

        let mut migrator = Migrator::on_disk();
        migrator.configure(tree.root())?;

        assert_eq!(migrator.run_group("events").await?, 1);
        assert_eq!(run_log(&tree), vec!["events"]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn stderr_is_logged_below_info() -> TestResult {
    let tree = MigrationTree::new();
    // The command text itself is logged, so build the output lines at runtime.
    tree.command_step(
        "events",
        "0001_chatty.toml",
        "printf 'out-%s\\n' line; printf 'err-%s\\n' line >&2",
    );

    let mut migrator = Migrator::on_disk();
    migrator.configure(tree.root())?;

    let (info_logs, guard) = LogCapture::install(Level::INFO);
    with_timeout(migrator.run_group("events")).await?;
    drop(guard);

    assert_eq!(info_logs.lines_with("out-line").len(), 1);
    assert!(info_logs.lines_with("err-line").is_empty(), "{}", info_logs.contents());

    let (debug_logs, _guard) = LogCapture::install(Level::DEBUG);
    with_timeout(migrator.run_group("events")).await?;

    let stderr_lines = debug_logs.lines_with("err-line");
    assert_eq!(stderr_lines.len(), 1);
    assert!(stderr_lines[0].contains("DEBUG"), "got: {}", stderr_lines[0]);
    Ok(())
}
