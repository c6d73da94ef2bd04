//! `ipm scores` rendering

use crate::common::TestWorkspace;
use crate::ipm;
use anyhow::Result;
use std::fs;

const SHEET: &str = "name,score,grade,score2,grade2\nAlice,90,G,80,S\n";

#[test]
fn test_renders_page_to_stdout() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write("scores.csv", SHEET)?;

    let result = ipm!(ws.path(), "scores", "scores.csv", "--icon", "G=g.png", "--icon", "S=s.png")
        .assert_success()?;

    assert!(result.contains_stdout("<!DOCTYPE html>"));
    assert!(result.contains_stdout(
        "<tr><th>name</th><th>score</th><th>grade</th><th>score2</th><th>grade2</th></tr>"
    ));
    assert!(result.contains_stdout(
        "<tr><td>Alice</td><td>90</td><td><img src=\"g.png\"></td><td>80</td><td><img src=\"s.png\"></td></tr>"
    ));
    Ok(())
}

#[test]
fn test_icons_from_config_and_output_file() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write("scores.csv", SHEET)?;
    ws.write(
        ".ipmanten.toml",
        "[scores.icons]\nG = \"medals/gold.png\"\n",
    )?;

    ipm!(ws.path(), "scores", "scores.csv", "-o", "scores.html", "--title", "Week 3")
        .assert_success()?;

    let page = fs::read_to_string(ws.path().join("scores.html"))?;
    assert!(page.contains("<title>Week 3</title>"));
    assert!(page.contains("<img src=\"medals/gold.png\">"));
    // S is not configured
    assert!(page.contains("<img src=\"\">"));
    Ok(())
}

#[test]
fn test_bad_icon_argument_fails() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write("scores.csv", SHEET)?;

    let result = ipm!(ws.path(), "scores", "scores.csv", "--icon", "gold.png").assert_failure()?;
    assert!(result.contains_stderr("CODE=LOCATION"));
    Ok(())
}

#[test]
fn test_missing_sheet_fails() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let result = ipm!(ws.path(), "scores", "missing.csv").assert_failure()?;
    assert!(result.contains_stderr("missing.csv"));
    Ok(())
}
