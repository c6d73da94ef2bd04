//! `ipm backup` artifacts

use crate::common::{has_program, TestWorkspace};
use crate::ipm;
use anyhow::Result;
use std::process::Command;

#[test]
fn test_backup_archives_java_sources() -> Result<()> {
    if !has_program("tar") {
        eprintln!("skipping: tar not available");
        return Ok(());
    }

    let ws = TestWorkspace::new()?;
    ws.write("Main.java", "class Main {}")?;
    ws.write("src/util/Helper.java", "class Helper {}")?;
    ws.write("notes.txt", "not archived")?;

    let result = ipm!(ws.path(), "backup").assert_success()?;
    assert!(result.contains_stdout("Backed up to"));

    let artifacts = ws.artifacts("backup-");
    assert_eq!(artifacts.len(), 1);

    let listing = Command::new("tar").arg("-tf").arg(&artifacts[0]).output()?;
    let listing = String::from_utf8_lossy(&listing.stdout);
    assert!(listing.contains("Main.java"));
    assert!(listing.contains("src/util/Helper.java"));
    assert!(!listing.contains("notes.txt"));
    Ok(())
}

#[test]
fn test_backup_reports_tar_failure() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write("Main.java", "class Main {}")?;
    ws.write(
        ".ipmanten.toml",
        "[archive]\ntar_program = \"ipm-test-no-such-tar\"\n",
    )?;

    let result = ipm!(ws.path(), "backup").assert_failure()?;
    assert!(result.contains_stderr("ipm-test-no-such-tar"));
    assert!(ws.artifacts("backup-").is_empty());
    Ok(())
}
