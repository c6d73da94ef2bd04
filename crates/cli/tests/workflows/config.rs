//! `ipm config` subcommands and config loading

use crate::common::TestWorkspace;
use crate::ipm;
use anyhow::Result;

#[test]
fn test_example_is_valid_toml_with_all_sections() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let result = ipm!(ws.path(), "config", "example").assert_success()?;

    for section in ["[workspace]", "[archive]", "[diagnostics]"] {
        assert!(result.contains_stdout(section), "missing {}", section);
    }

    // The example must load as a config file
    ws.write("example.toml", &result.stdout)?;
    ipm!(ws.path(), "--config", "example.toml", "config", "list").assert_success()?;
    Ok(())
}

#[test]
fn test_list_shows_workspace_overrides() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write(".ipmanten.toml", "[archive]\ncooldown_ms = 2500\n")?;

    let result = ipm!(ws.path(), "config", "list").assert_success()?;
    assert!(result.contains_stdout("2500"));
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> Result<()> {
    let ws = TestWorkspace::new()?;
    ws.write(".ipmanten.toml", "[diagnostics]\ncooldown_ms = 5\n")?;

    let result = ipm!(ws.path(), "config", "list").assert_failure()?;
    assert!(result.contains_stderr("diagnostics.cooldown_ms"));
    Ok(())
}

// XDG_CONFIG_HOME only steers the config dir on Linux
#[cfg(target_os = "linux")]
#[test]
fn test_path_create_writes_defaults() -> Result<()> {
    let ws = TestWorkspace::new()?;

    let result = ipm!(ws.path(), "config", "path", "--create").assert_success()?;
    let path = std::path::PathBuf::from(result.stdout.trim());

    assert!(path.starts_with(ws.path().join(".xdg")));
    assert!(path.exists());
    Ok(())
}
