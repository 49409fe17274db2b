//! evernote-cli - create, read, update and search Evernote notes from the terminal
//!
//! This is the command-line interface for evernote-core. It handles argument
//! parsing, configuration, authorization prompts and output formatting.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;
mod ui;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{
    add, attach, auth, download, get, init, misc, notebooks, search, tags, update,
};
use crate::errors::exit_code_for;
use crate::ui::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli).await {
        let ui_ctx = ctx.ui_context();
        let error_msg = chain_message(&e);
        let (message, hint) = split_hint(&error_msg);
        let hint = hint.or_else(|| contextual_hint(message));

        print_error(&ui_ctx, message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

/// Logs go to stderr. `RUST_LOG` wins; otherwise `-v` raises this crate and
/// the core library to info, `-vv` to debug.
fn init_logging(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => EnvFilter::new(value),
        _ => {
            let level = match verbose {
                0 => "warn",
                1 => "info",
                _ => "debug",
            };
            EnvFilter::new(format!(
                "warn,evernote_core={level},evernote_cli={level}"
            ))
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Join an error and its causes with ": ", skipping causes the message
/// already spells out.
fn chain_message(err: &anyhow::Error) -> String {
    let mut message = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}

/// Split a trailing "Hint: ..." line off an error message.
fn split_hint(error: &str) -> (&str, Option<String>) {
    for marker in ["\nHint:", "\nhint:"] {
        if let Some(idx) = error.find(marker) {
            let hint = error[idx + marker.len()..].trim().to_string();
            return (&error[..idx], Some(hint));
        }
    }
    (error, None)
}

/// Hints for common failures that carry none of their own.
fn contextual_hint(error: &str) -> Option<String> {
    let lower = error.to_lowercase();

    if lower.contains("auth_expired") || lower.contains("invalid_auth") {
        return Some("Run `evernote-cli auth` to authorize again.".to_string());
    }
    if lower.contains("note.guid") && lower.contains("not found") {
        return Some("Run `evernote-cli search <query>` to find note GUIDs.".to_string());
    }
    if lower.contains("resource.guid") && lower.contains("not found") {
        return Some(
            "Run `evernote-cli get <note-guid>` to list attachment GUIDs.".to_string(),
        );
    }
    if lower.contains("timed out") && lower.contains("redirect") {
        return Some(
            "Run the command again and approve access in the browser window.".to_string(),
        );
    }
    if lower.contains("could not listen on") {
        return Some(
            "Another program is using the callback port. Stop it and retry.".to_string(),
        );
    }
    if lower.contains("enml_validation") {
        return Some("Check that --html is well-formed XHTML allowed in notes.".to_string());
    }

    None
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args).await,
        Some(Commands::Auth(args)) => auth::handle_auth(ctx, args).await,
        Some(Commands::Add(args)) => add::handle_add(ctx, args).await,
        Some(Commands::Get(args)) => get::handle_get(ctx, args).await,
        Some(Commands::Update(args)) => update::handle_update(ctx, args).await,
        Some(Commands::Attach(args)) => attach::handle_attach(ctx, args).await,
        Some(Commands::Download(args)) => download::handle_download(ctx, args).await,
        Some(Commands::Notebooks) => notebooks::handle_notebooks(ctx).await,
        Some(Commands::Tags) => tags::handle_tags(ctx).await,
        Some(Commands::Search(args)) => search::handle_search(ctx, args).await,
        Some(Commands::Version) => misc::handle_version(),
        Some(Commands::Completions { shell }) => misc::handle_completions(*shell),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
