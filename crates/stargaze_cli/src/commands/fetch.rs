use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use console::Term;
use stargaze::pipeline::{self, ExportOptions, PipelineOutput, PipelineRequest, TimeWindow};
use stargaze::{CsvMode, EnrichedStargazer, GitHubClient};

use crate::FetchArgs;
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Longest bio shown in table output.
const MAX_BIO_WIDTH: usize = 60;

/// What to print after the export files are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Only report where the files went (default)
    #[default]
    Summary,
    /// Display stargazers as a formatted table
    Table,
    /// Display stargazers as JSON
    Json,
}

pub(crate) async fn handle_fetch(
    args: FetchArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GitHubClient::new(config.client_config(args.token.as_deref()))
        .map_err(|e| e.user_message())?;

    let request = PipelineRequest::new(args.repo_url.as_str())
        .with_window(window_from_flags(args.last_24h, args.since_hours))
        .with_require_credential(args.require_token || config.github.require_token);
    let options = config.enrich_options(args.batch_size);

    if !client.has_credential() {
        tracing::warn!("No GitHub token configured; unauthenticated requests are heavily rate limited");
    }

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let result = pipeline::run(&client, &request, &options, Some(&callback)).await;
    reporter.finish();

    let output = result.map_err(|e| e.user_message())?;

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.export.output_dir.clone());
    let export = ExportOptions {
        csv_mode: if args.quote_csv || config.export.quote_csv {
            CsvMode::Quoted
        } else {
            CsvMode::Plain
        },
        xlsx: args.xlsx || config.export.xlsx,
    };
    let written = output.write_to(&output_dir, export).map_err(|e| e.user_message())?;

    report(&output, &written, args.format)?;

    Ok(())
}

/// Parse `--batch-size`: a positive integer that fits in `usize`.
pub(crate) fn parse_batch_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid batch size {value:?}: {e}")),
    }
}

fn window_from_flags(last_24h: bool, since_hours: Option<u32>) -> Option<TimeWindow> {
    if last_24h {
        Some(TimeWindow::last_24_hours())
    } else {
        since_hours.map(TimeWindow::hours)
    }
}

fn empty_notice(window: Option<TimeWindow>) -> String {
    match window {
        Some(w) => format!("No stargazers found in the last {} hours", w.as_hours()),
        None => "No stargazers found".to_string(),
    }
}

fn report(
    output: &PipelineOutput,
    written: &[PathBuf],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();

    if output.stargazers.is_empty() {
        if is_tty {
            println!("{}", empty_notice(output.window));
        } else {
            tracing::info!(repo = %output.repo_path, "{}", empty_notice(output.window));
        }
    }

    match format {
        OutputFormat::Summary => {
            if is_tty {
                for path in written {
                    println!(
                        "Exported {} stargazers of {} to {}",
                        output.stargazers.len(),
                        output.repo_path,
                        path.display()
                    );
                }
            }
        }
        OutputFormat::Table => {
            if !output.stargazers.is_empty() {
                println!("{}", render_table(&output.stargazers));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output.stargazers)?);
        }
    }

    Ok(())
}

/// One stargazer for table display.
#[derive(Debug, Clone, tabled::Tabled)]
struct StargazerRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Website")]
    website: String,
    #[tabled(rename = "LinkedIn")]
    linkedin: String,
    #[tabled(rename = "Twitter")]
    twitter: String,
    #[tabled(rename = "Bio")]
    bio: String,
}

impl From<&EnrichedStargazer> for StargazerRow {
    fn from(s: &EnrichedStargazer) -> Self {
        Self {
            username: s.username.clone(),
            email: s.email.clone(),
            company: s.company.clone(),
            location: s.location.clone(),
            website: s.website.clone(),
            linkedin: s.linkedin.clone(),
            twitter: s.twitter.clone(),
            bio: truncate(&s.bio.replace(['\r', '\n'], " "), MAX_BIO_WIDTH),
        }
    }
}

fn render_table(stargazers: &[EnrichedStargazer]) -> String {
    let rows: Vec<StargazerRow> = stargazers.iter().map(StargazerRow::from).collect();
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
