//! Line-oriented interactive shell.
//!
//! Each line is split with shell quoting rules and parsed as one command.
//! Bad lines print an error and the shell keeps going.

use crate::render::{render_stats, TerminalRenderer};
use crate::{print_session, to_core_command, ItemCommand};
use clap::{Parser, Subcommand};
use shoplist_core::{FilterMode, KeyValueStore, ListSession, SortMode};
use std::io::{self, BufRead, Write};

const PROMPT: &str = "shoplist> ";

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Item(ItemCommand),
    /// Show only all|pending|done items.
    Filter { mode: FilterMode },
    /// Show items whose name contains TEXT; no text clears the search.
    Search { text: Vec<String> },
    /// Order by created|name|status.
    Sort { mode: SortMode },
    /// Redraw the list.
    List,
    /// Show pending/done/total counts.
    Stats,
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

/// Runs the shell on `input`, redrawing the list after every command.
pub fn run<S: KeyValueStore>(session: &mut ListSession<S>, input: impl BufRead) -> io::Result<()> {
    session.subscribe(TerminalRenderer);
    let mut out = io::stdout();
    print_session(&mut out, session)?;
    run_lines(session, input, &mut out)
}

fn run_lines<S: KeyValueStore>(
    session: &mut ListSession<S>,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        if !handle_line(session, &line, out)? {
            return Ok(());
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)
}

/// Returns `false` once the user asked to quit.
fn handle_line<S: KeyValueStore>(
    session: &mut ListSession<S>,
    line: &str,
    out: &mut impl Write,
) -> io::Result<bool> {
    let Some(tokens) = shlex::split(line) else {
        writeln!(out, "error: unbalanced quotes")?;
        return Ok(true);
    };
    if tokens.is_empty() {
        return Ok(true);
    }

    let parsed = match ShellLine::try_parse_from(tokens) {
        Ok(parsed) => parsed,
        Err(err) => {
            write!(out, "{}", err.render())?;
            return Ok(true);
        }
    };

    match parsed.command {
        ShellCommand::Item(command) => {
            let command = to_core_command(command, session);
            session.dispatch(command);
        }
        ShellCommand::Filter { mode } => {
            session.set_filter(mode);
        }
        ShellCommand::Search { text } => {
            session.set_search(text.join(" "));
        }
        ShellCommand::Sort { mode } => {
            session.set_sort(mode);
        }
        ShellCommand::List => print_session(out, session)?,
        ShellCommand::Stats => {
            render_stats(out, session.pending_count(), session.total_count())?
        }
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}
