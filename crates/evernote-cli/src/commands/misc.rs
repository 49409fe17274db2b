use clap::CommandFactory;
use clap_complete::generate;

use evernote_core::VERSION;

use crate::cli::Cli;

pub fn version_line() -> String {
    format!("evernote-cli version {}", VERSION)
}

pub fn handle_version() -> anyhow::Result<()> {
    println!("{}", version_line());
    Ok(())
}

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "evernote-cli", &mut std::io::stdout());
    Ok(())
}
