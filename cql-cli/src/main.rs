//! The CQL interactive prompt.
//!
//! Reads commands up to a `;` terminator, runs them through the
//! session, and prints one-line diagnostics for failed statements.
//! On end-of-input the session writes every dirty table back to its
//! CSV file.
//!
//! ```text
//! RUST_LOG=debug cql --data-dir ./tables
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cql::engine::Session;
use tracing_subscriber::EnvFilter;

/// An in-memory relational query engine for a SQL-like language.
#[derive(Parser, Debug)]
#[command(name = "cql", version, about)]
struct Args {
    /// Directory holding the `<table>.csv` files.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Execute a script file instead of entering the prompt.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(data_dir = %args.data_dir.display(), "session starting");
    let mut session = Session::new(&args.data_dir);
    let stdout = std::io::stdout();

    if let Some(script) = &args.script {
        let text = std::fs::read_to_string(script)
            .with_context(|| format!("cannot read script {}", script.display()))?;
        let mut out = stdout.lock();
        session.execute_source(&text, &mut out)?;
        session.dump();
        return Ok(());
    }

    repl(&mut session)?;
    session.dump();
    Ok(())
}

fn repl(session: &mut Session) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let stdout = std::io::stdout();

    let mut command = String::new();
    loop {
        {
            let mut out = stdout.lock();
            let prompt = if command.is_empty() { "cql > " } else { "... > " };
            write!(out, "{}", prompt)?;
            out.flush()?;
        }

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                println!("Bye.");
                return Ok(());
            }
        };
        command.push_str(&line);
        command.push('\n');

        // keep accumulating until the line ends the statement
        if !line.trim_end().ends_with(';') {
            continue;
        }

        let mut out = stdout.lock();
        if let Err(error) = session.execute_source(&command, &mut out) {
            writeln!(out, "{}", error)?;
        }
        command.clear();
    }
}
