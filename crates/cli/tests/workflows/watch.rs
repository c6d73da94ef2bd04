//! `ipm watch` lifecycle

use crate::common::TestWorkspace;
use crate::ipm;
use anyhow::Result;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::Child;
use std::time::{Duration, Instant};

/// Poll until `done` holds or `limit` passes
fn wait_for(limit: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    done()
}

fn interrupt(child: &Child) -> Result<()> {
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT)?;
    Ok(())
}

#[test]
fn test_ctrl_c_stops_watch_with_open_diagnostics_pipe() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let mut child = ipm!(ws.path(), "watch", "--diagnostics-stdin", "--workspace", &ws.arg())
        .spawn()?;

    let mut stdout = BufReader::new(child.stdout.take().expect("stdout is piped"));
    let mut banner = String::new();
    stdout.read_line(&mut banner)?;
    assert!(banner.contains("Watching"), "unexpected banner: {}", banner);

    // Keep the writer open for the whole session
    let mut stdin = child.stdin.take().expect("stdin is piped");
    writeln!(
        stdin,
        r#"{{"uri":"file:///ws/Main.java","diagnostics":[{{"range":{{"start":{{"line":1,"character":0}},"end":{{"line":1,"character":4}}}},"message":"';' expected","severity":"Error"}}]}}"#
    )?;
    stdin.flush()?;

    assert!(
        wait_for(Duration::from_secs(10), || !ws.artifacts("diagnostics-").is_empty()),
        "diagnostics snapshot was not written"
    );
    assert!(ws.path().join("_ipmanten/watch.lock").exists());

    // Let the Ctrl-C handler settle before interrupting
    std::thread::sleep(Duration::from_millis(500));
    interrupt(&child)?;

    let mut status = None;
    let exited = wait_for(Duration::from_secs(15), || {
        if status.is_none() {
            status = child.try_wait().ok().flatten();
        }
        status.is_some()
    });
    if !exited {
        let _ = child.kill();
        let _ = child.wait();
        anyhow::bail!("ipm watch did not exit after SIGINT");
    }
    drop(stdin);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest)?;
    assert!(rest.contains("Stopped"), "no graceful shutdown: {}", rest);
    assert!(status.is_some_and(|s| s.success()));
    assert!(!ws.path().join("_ipmanten/watch.lock").exists());
    Ok(())
}

#[test]
fn test_second_watch_on_same_workspace_is_refused() -> Result<()> {
    let ws = TestWorkspace::new()?;
    let mut first = ipm!(ws.path(), "watch", "--workspace", &ws.arg()).spawn()?;

    let mut stdout = BufReader::new(first.stdout.take().expect("stdout is piped"));
    let mut banner = String::new();
    stdout.read_line(&mut banner)?;

    let second = ipm!(ws.path(), "watch", "--workspace", &ws.arg()).execute();

    interrupt(&first)?;
    let _ = first.wait();

    let second = second?;
    assert!(!second.success());
    assert!(second.contains_stderr("already running"));
    Ok(())
}
