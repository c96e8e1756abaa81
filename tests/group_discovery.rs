// tests/group_discovery.rs
#![cfg(target_os = "linux")]

use migrun_test_utils::logs::LogCapture;
use migrun_test_utils::TestResult;

use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;

use tracing::Level;

use migrun::discovery::list_groups;
use migrun::fs::RealFileSystem;

#[test]
fn non_utf8_group_directory_is_skipped_with_a_warning() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join(OsStr::from_bytes(b"bad\xff")))?;
    fs::create_dir(dir.path().join("ok"))?;

    let (logs, _guard) = LogCapture::install(Level::WARN);
    let groups = list_groups(&RealFileSystem, dir.path())?;

    assert_eq!(groups, vec!["ok".to_string()]);
    let warnings = logs.lines_with("not valid UTF-8");
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert!(warnings[0].contains("WARN"));
    assert!(warnings[0].contains("bad"));
    Ok(())
}
