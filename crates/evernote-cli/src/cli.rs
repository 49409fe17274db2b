use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use clap_complete::Shell;

use evernote_core::VERSION;

use crate::constants::DEFAULT_SEARCH_LIMIT;

/// evernote-cli - Create, read and search Evernote notes from the terminal
#[derive(Parser)]
#[command(name = "evernote-cli")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,
}

/// Arguments for `init` and `auth`
#[derive(Args)]
pub struct AuthArgs {
    /// Use the Evernote sandbox service
    #[arg(long)]
    pub sandbox: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
#[command(group(ArgGroup::new("content").required(true).args(["body", "html"])))]
pub struct AddArgs {
    /// Note title
    #[arg(short, long)]
    pub title: String,

    /// Plain text body (escaped)
    #[arg(short, long)]
    pub body: Option<String>,

    /// ENML/XHTML body (used as-is)
    #[arg(long)]
    pub html: Option<String>,

    /// Notebook GUID (defaults to the account's default notebook)
    #[arg(short, long, value_name = "GUID")]
    pub notebook: Option<String>,

    /// Comma-separated tag names
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// File to attach (repeatable)
    #[arg(short, long, value_name = "FILE")]
    pub attach: Vec<PathBuf>,
}

/// Arguments for the `get` command
#[derive(Args)]
pub struct GetArgs {
    /// Note GUID
    #[arg(value_name = "GUID")]
    pub guid: String,
}

/// Arguments for the `update` command
#[derive(Args)]
#[command(group(ArgGroup::new("content").multiple(false).args(["body", "html", "append"])))]
pub struct UpdateArgs {
    /// Note GUID
    #[arg(value_name = "GUID")]
    pub guid: String,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Replace the body with plain text
    #[arg(short, long)]
    pub body: Option<String>,

    /// Replace the body with ENML/XHTML
    #[arg(long)]
    pub html: Option<String>,

    /// Append plain text to the existing body
    #[arg(long)]
    pub append: Option<String>,

    /// Replace tags (comma-separated names)
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

/// Arguments for the `attach` command
#[derive(Args)]
pub struct AttachArgs {
    /// Note GUID
    #[arg(value_name = "GUID")]
    pub guid: String,

    /// Files to attach
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the `download` command
#[derive(Args)]
pub struct DownloadArgs {
    /// Resource GUID
    #[arg(value_name = "RESOURCE_GUID")]
    pub guid: String,

    /// Output path (defaults to the attachment's file name)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `search` command
#[derive(Args)]
pub struct SearchArgs {
    /// Evernote search grammar, e.g. `tag:work intitle:plan`
    #[arg(value_name = "QUERY", required = true)]
    pub query: Vec<String>,

    /// Index of the first result
    #[arg(long, default_value_t = 0)]
    pub offset: i32,

    /// Maximum number of results
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: i32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store consumer credentials and authorize this machine
    Init(AuthArgs),

    /// Re-run the browser authorization and store a fresh token
    Auth(AuthArgs),

    /// Create a note
    Add(AddArgs),

    /// Show a note
    Get(GetArgs),

    /// Change a note's title, body or tags
    Update(UpdateArgs),

    /// Attach files to an existing note
    Attach(AttachArgs),

    /// Download an attachment
    Download(DownloadArgs),

    /// List notebooks
    Notebooks,

    /// List tags
    Tags,

    /// Search notes
    Search(SearchArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
