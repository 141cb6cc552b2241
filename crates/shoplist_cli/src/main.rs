//! Command-line front end for the shopping list.
//!
//! # Responsibility
//! - Translate arguments (or shell lines) into core session commands.
//! - Render the resulting projection as plain text.

mod render;
mod shell;

use clap::{Args, Parser, Subcommand};
use render::{render_list, render_stats, TerminalRenderer};
use shoplist_core::{
    init_logging, AppConfig, Command, EditRequest, FilterMode, Item, ItemId, KeyValueStore,
    ListSession, MalformedDataPolicy, SortMode,
};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "shoplist", version, about = "Keep a shopping list in a local SQLite file")]
struct Cli {
    /// SQLite file holding the list (overrides SHOPLIST_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides SHOPLIST_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files (overrides SHOPLIST_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// What to do with unreadable stored data: reset|backup|fail.
    #[arg(long, global = true)]
    on_corrupt: Option<MalformedDataPolicy>,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    #[command(flatten)]
    Item(ItemCommand),
    /// Show the list.
    List(ViewArgs),
    /// Show pending/done/total counts.
    Stats,
    /// Read commands line by line from stdin.
    Shell,
}

/// Commands that mutate the list; shared with the interactive shell.
#[derive(Debug, Subcommand)]
pub(crate) enum ItemCommand {
    /// Add an item; quantity defaults to 1.
    Add {
        name: String,
        /// Any number, including negatives; pass `--` before `-Infinity`.
        #[arg(allow_negative_numbers = true)]
        qty: Option<String>,
    },
    /// Mark an item done, or pending again.
    Toggle { id: String },
    /// Delete an item.
    Remove { id: String },
    /// Rename an item and replace its quantity.
    Edit {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        qty: Option<String>,
    },
    /// Delete every done item.
    ClearDone,
}

#[derive(Debug, Args)]
struct ViewArgs {
    #[arg(long, default_value = "all")]
    filter: FilterMode,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "created")]
    sort: SortMode,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("shoplist: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = build_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let mut session = ListSession::open_sqlite(&config)?;

    match cli.command {
        Some(CliCommand::Item(command)) => {
            session.subscribe(TerminalRenderer);
            let command = to_core_command(command, &session);
            session.dispatch(command);
        }
        Some(CliCommand::List(args)) => {
            session.set_filter(args.filter);
            session.set_search(args.search);
            session.set_sort(args.sort);
            print_session(&mut io::stdout().lock(), &session)?;
        }
        None => print_session(&mut io::stdout().lock(), &session)?,
        Some(CliCommand::Stats) => render_stats(
            &mut io::stdout().lock(),
            session.pending_count(),
            session.total_count(),
        )?,
        Some(CliCommand::Shell) => shell::run(&mut session, io::stdin().lock())?,
    }
    Ok(())
}

/// Layers CLI flags over environment-derived configuration.
fn build_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(policy) = cli.on_corrupt {
        config.malformed_policy = policy;
    }
    Ok(config)
}

pub(crate) fn print_session<S: KeyValueStore>(
    out: &mut impl Write,
    session: &ListSession<S>,
) -> io::Result<()> {
    render_list(
        out,
        session.current_view(),
        session.controls(),
        session.pending_count(),
        session.total_count(),
    )
}

pub(crate) fn to_core_command<S: KeyValueStore>(
    command: ItemCommand,
    session: &ListSession<S>,
) -> Command {
    let resolve = |token: &str| {
        resolve_id(session.current_view(), session.store().items(), token)
    };
    match command {
        ItemCommand::Add { name, qty } => Command::Add {
            name,
            quantity: qty,
        },
        ItemCommand::Toggle { id } => Command::Toggle(resolve(&id)),
        ItemCommand::Remove { id } => Command::Remove(resolve(&id)),
        ItemCommand::Edit { id, name, qty } => {
            Command::Edit(EditRequest::new(resolve(&id), name, qty))
        }
        ItemCommand::ClearDone => Command::ClearDone,
    }
}

/// Maps a user token to an item id.
///
/// Accepts, in order: a 1-based row number of `view`, an exact id, or a
/// prefix matching exactly one id. Anything else passes through unchanged,
/// which the store treats as an unknown id.
fn resolve_id(view: &[Item], items: &[Item], token: &str) -> ItemId {
    let token = token.trim().trim_start_matches('#');

    if let Ok(row) = token.parse::<usize>() {
        if let Some(item) = row.checked_sub(1).and_then(|index| view.get(index)) {
            return item.id.clone();
        }
    }

    if let Some(item) = items.iter().find(|item| item.id.as_str() == token) {
        return item.id.clone();
    }

    let mut matches = items
        .iter()
        .filter(|item| !token.is_empty() && item.id.as_str().starts_with(token));
    match (matches.next(), matches.next()) {
        (Some(item), None) => item.id.clone(),
        _ => ItemId::from(token),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_id, Cli, CliCommand, ItemCommand};
    use clap::Parser;
    use shoplist_core::{FilterMode, Item, ItemId, MalformedDataPolicy, SortMode};

    fn items() -> Vec<Item> {
        vec![
            Item::with_id(ItemId::from("aaa111"), "Milk", 1.0, 1),
            Item::with_id(ItemId::from("aab222"), "Bread", 1.0, 2),
            Item::with_id(ItemId::from("ccc333"), "Eggs", 1.0, 3),
        ]
    }

    #[test]
    fn row_numbers_index_the_visible_view() {
        let all = items();
        let view = vec![all[2].clone(), all[0].clone()];
        assert_eq!(resolve_id(&view, &all, "1"), ItemId::from("ccc333"));
        assert_eq!(resolve_id(&view, &all, "2"), ItemId::from("aaa111"));
    }

    #[test]
    fn exact_and_unique_prefix_ids_resolve() {
        let all = items();
        assert_eq!(resolve_id(&all, &all, "aab222"), ItemId::from("aab222"));
        assert_eq!(resolve_id(&all, &all, "#ccc"), ItemId::from("ccc333"));
    }

    #[test]
    fn ambiguous_or_unknown_tokens_pass_through() {
        let all = items();
        assert_eq!(resolve_id(&all, &all, "aa"), ItemId::from("aa"));
        assert_eq!(resolve_id(&all, &all, "9"), ItemId::from("9"));
        assert_eq!(resolve_id(&all, &all, "zzz"), ItemId::from("zzz"));
    }

    #[test]
    fn cli_parses_global_flags_and_item_commands() {
        let cli = Cli::try_parse_from([
            "shoplist",
            "add",
            "Oat milk",
            "2",
            "--db",
            "/tmp/list.db",
            "--on-corrupt",
            "backup",
        ])
        .unwrap();

        assert_eq!(cli.on_corrupt, Some(MalformedDataPolicy::Backup));
        match cli.command {
            Some(CliCommand::Item(ItemCommand::Add { name, qty })) => {
                assert_eq!(name, "Oat milk");
                assert_eq!(qty.as_deref(), Some("2"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_quantities_parse_as_values() {
        let add = Cli::try_parse_from(["shoplist", "add", "Milk", "-1"]).unwrap();
        match add.command {
            Some(CliCommand::Item(ItemCommand::Add { qty, .. })) => {
                assert_eq!(qty.as_deref(), Some("-1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let edit = Cli::try_parse_from(["shoplist", "edit", "1", "Bread", "-0.5"]).unwrap();
        match edit.command {
            Some(CliCommand::Item(ItemCommand::Edit { qty, .. })) => {
                assert_eq!(qty.as_deref(), Some("-0.5"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let infinite =
            Cli::try_parse_from(["shoplist", "add", "Milk", "--", "-Infinity"]).unwrap();
        match infinite.command {
            Some(CliCommand::Item(ItemCommand::Add { qty, .. })) => {
                assert_eq!(qty.as_deref(), Some("-Infinity"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_flags_parse_into_modes() {
        let cli = Cli::try_parse_from(["shoplist", "list", "--filter", "pending", "--sort", "name"])
            .unwrap();
        match cli.command {
            Some(CliCommand::List(args)) => {
                assert_eq!(args.filter, FilterMode::Pending);
                assert_eq!(args.sort, SortMode::Name);
                assert!(args.search.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_sort_mode_is_rejected() {
        assert!(Cli::try_parse_from(["shoplist", "list", "--sort", "newest"]).is_err());
    }
}
