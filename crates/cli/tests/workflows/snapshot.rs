//! `ipm snapshot` artifacts

use crate::common::TestWorkspace;
use crate::ipm;
use anyhow::Result;
use std::fs;

const DIAGNOSTICS: &str = r#"[
  ["file:///ws/Main.java", [
    {"range": {"start": {"line": 3, "character": 8}, "end": {"line": 3, "character": 14}},
     "message": "cannot find symbol", "severity": "Error", "source": "Java", "code": "16777218"}
  ]],
  ["file:///ws/Clean.java", []]
]"#;

#[test]
fn test_snapshot_writes_filtered_json() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let input = ws.write("diagnostics.json", DIAGNOSTICS)?;

    let result = ipm!(ws.path(), "snapshot", &input.to_string_lossy(), "--workspace", &ws.arg())
        .assert_success()?;
    assert!(result.contains_stdout("1 problem(s) in 1 file(s)"));

    let artifacts = ws.artifacts("diagnostics-");
    assert_eq!(artifacts.len(), 1);
    assert!(artifacts[0].extension().is_some_and(|ext| ext == "json"));

    let written = fs::read_to_string(&artifacts[0])?;
    assert!(written.starts_with(r#"[["file:///ws/Main.java",[{"range":"#));
    assert!(written.contains(r#""severity":"Error""#));
    assert!(!written.contains("Clean.java"));
    Ok(())
}

#[test]
fn test_repeated_snapshots_never_overwrite() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let input = ws.write("diagnostics.json", DIAGNOSTICS)?;
    let input = input.to_string_lossy().to_string();

    for _ in 0..3 {
        ipm!(ws.path(), "snapshot", &input).assert_success()?;
    }

    assert_eq!(ws.artifacts("diagnostics-").len(), 3);
    Ok(())
}

#[test]
fn test_malformed_input_fails_without_writing() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write("diagnostics.json", "{\"not\": \"a snapshot\"}")?;

    let result = ipm!(ws.path(), "snapshot", "diagnostics.json").assert_failure()?;
    assert!(result.contains_stderr("Invalid diagnostics"));
    assert!(ws.artifacts("diagnostics-").is_empty());
    Ok(())
}

#[test]
fn test_remote_workspace_is_skipped() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write("diagnostics.json", DIAGNOSTICS)?;

    ipm!(
        ws.path(),
        "snapshot",
        "diagnostics.json",
        "--workspace",
        "vscode-remote://ssh-remote+lab/home/student"
    )
    .assert_failure()?;

    assert!(ws.artifacts("diagnostics-").is_empty());
    Ok(())
}
