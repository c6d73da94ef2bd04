//! Terminal filter: echo program output, explain known exceptions
//!
//! `java Main 2>&1 | ipm hints`

use crate::util;
use anyhow::{Context, Result};
use assist::{Hint, HintTable, Notifier};
use owo_colors::OwoColorize;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints hint messages below the annotated line
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        println!("{} {}", "hint:".yellow().bold(), message.yellow());
    }
}

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let folders = util::workspace_folders(&[])?;
    let config = util::load_config(config_path, &folders)?;
    let table = util::hint_table(&config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        annotate(&table, &line, &TerminalNotifier);
    }

    Ok(())
}

fn annotate(table: &HintTable, line: &str, notifier: &dyn Notifier) {
    println!("{}", line);
    for hint in table.match_line(line) {
        println!("{}", underline(line, &hint).red());
        hint.activate(notifier);
    }
}

/// `^^^` under the matched span, aligned by character
fn underline(line: &str, hint: &Hint<'_>) -> String {
    let indent = line[..hint.offset]
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect::<String>();
    let width = line[hint.offset..hint.offset + hint.length].chars().count();
    format!("{}{}", indent, "^".repeat(width))
}
