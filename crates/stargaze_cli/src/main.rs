//! Stargaze CLI - export the stargazers of a GitHub repository.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::fetch::OutputFormat;

#[derive(Parser)]
#[command(name = "stargaze")]
#[command(version)]
#[command(about = "Export the stargazers of a GitHub repository")]
#[command(
    long_about = "Stargaze pages through every stargazer of a GitHub repository, optionally \
keeps only recent ones, looks up each user's public profile (email, company, location, \
website, LinkedIn, Twitter, bio) and writes the result as CSV or XLSX."
)]
#[command(after_long_help = r#"EXAMPLES
    Export all stargazers of a repository:
        $ stargaze fetch https://github.com/rust-lang/rust

    Only users who starred in the last 24 hours, also as a spreadsheet:
        $ stargaze fetch https://github.com/tokio-rs/tokio --last-24h --xlsx

    Print the result as a table:
        $ stargaze fetch github.com/serde-rs/serde --format table

    Generate shell completions:
        $ stargaze completions bash > ~/.local/share/bash-completion/completions/stargaze

CONFIGURATION
    Stargaze reads configuration from:
      1. ~/.config/stargaze/config.toml (or $XDG_CONFIG_HOME/stargaze/config.toml)
      2. ./stargaze.toml
      3. Environment variables (STARGAZE_* prefix, e.g., STARGAZE_FETCH__BATCH_SIZE)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    STARGAZE_GITHUB_TOKEN     GitHub personal access token
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, enrich and export the stargazers of a repository
    Fetch(FetchArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options for the fetch command.
#[derive(Debug, Clone, clap::Args)]
struct FetchArgs {
    /// Repository URL (anything containing github.com/<owner>/<repo>)
    repo_url: String,

    /// GitHub token (default from config or STARGAZE_GITHUB_TOKEN)
    #[arg(short, long)]
    token: Option<String>,

    /// Fail instead of running unauthenticated when no token is set
    #[arg(long)]
    require_token: bool,

    /// Only include users who starred within the last 24 hours
    #[arg(long, conflicts_with = "since_hours")]
    last_24h: bool,

    /// Only include users who starred within the last N hours
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    since_hours: Option<u32>,

    /// Directory to write the export files to (default from config or ".")
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write an XLSX workbook
    #[arg(long)]
    xlsx: bool,

    /// Quote CSV cells that contain commas, quotes or newlines
    #[arg(long)]
    quote_csv: bool,

    /// What to print once the files are written
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Profiles to look up concurrently per batch (default from config or 50)
    #[arg(short, long, value_parser = commands::fetch::parse_batch_size)]
    batch_size: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Structured logging only when not attached to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("stargaze=info,stargaze_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch(args) => {
            let config = config::Config::load();
            commands::fetch::handle_fetch(args, &config).await
        }
        Commands::Completions { shell } => commands::meta::handle_completions(shell),
        Commands::Man { output } => commands::meta::handle_man(output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if Term::stderr().is_term() {
                eprintln!("{}", console::style(e).red());
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
