//! The end-to-end stargazer pipeline.
//!
//! Paginate → (optional) time window filter → enrich → tabulate. The stages
//! run strictly in sequence; the first error ends the run and nothing is
//! exported.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::enrich::{EnrichOptions, EnrichedStargazer, enrich_stargazers};
use crate::error::{Result, StargazeError};
use crate::export::{CsvMode, ExportTable};
use crate::filter::{cutoff_for_window, filter_since};
use crate::github::GitHubClient;
use crate::progress::{ProgressCallback, StargazeProgress, emit};
use crate::repo_path::extract_repo_path;

/// A trailing time window, in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    hours: u32,
}

impl TimeWindow {
    /// Window of `hours` hours (at least one).
    pub fn hours(hours: u32) -> Self {
        Self {
            hours: hours.max(1),
        }
    }

    pub fn last_24_hours() -> Self {
        Self::hours(24)
    }

    pub fn as_hours(&self) -> u32 {
        self.hours
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(i64::from(self.hours))
    }
}

/// Export file name for a run: `stargazers.csv`, `stargazers_last_24h.csv`, ...
pub fn export_filename(window: Option<TimeWindow>, extension: &str) -> String {
    match window {
        Some(w) => format!("stargazers_last_{}h.{extension}", w.as_hours()),
        None => format!("stargazers.{extension}"),
    }
}

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    /// Anything containing `github.com/<owner>/<repo>`.
    pub repo_url: String,
    /// Keep only stargazers inside this trailing window.
    pub window: Option<TimeWindow>,
    /// Reject the run up front if the client has no token.
    pub require_credential: bool,
}

impl PipelineRequest {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            window: None,
            require_credential: false,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: Option<TimeWindow>) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_require_credential(mut self, require: bool) -> Self {
        self.require_credential = require;
        self
    }
}

/// Options for writing artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub csv_mode: CsvMode,
    /// Also write an XLSX workbook.
    pub xlsx: bool,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The `owner/repo` that was fetched.
    pub repo_path: String,
    /// The window that was applied, if any.
    pub window: Option<TimeWindow>,
    /// Enriched stargazers, in API order.
    pub stargazers: Vec<EnrichedStargazer>,
    /// The same records projected for export.
    pub table: ExportTable,
}

impl PipelineOutput {
    pub fn csv_filename(&self) -> String {
        export_filename(self.window, "csv")
    }

    pub fn xlsx_filename(&self) -> String {
        export_filename(self.window, "xlsx")
    }

    /// Write the CSV (and optionally XLSX) artifacts into `dir`.
    ///
    /// Returns the paths written, CSV first.
    pub fn write_to(&self, dir: &Path, options: ExportOptions) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let csv_path = dir.join(self.csv_filename());
        self.table.write_csv(&csv_path, options.csv_mode)?;
        written.push(csv_path);

        if options.xlsx {
            let xlsx_path = dir.join(self.xlsx_filename());
            self.table.write_xlsx(&xlsx_path)?;
            written.push(xlsx_path);
        }

        for path in &written {
            tracing::info!(path = %path.display(), rows = self.table.len(), "Exported stargazers");
        }

        Ok(written)
    }
}

/// Validate the request without touching the network.
///
/// Returns the `owner/repo` path on success.
pub fn validate(client: &GitHubClient, request: &PipelineRequest) -> Result<String> {
    let repo_path = extract_repo_path(&request.repo_url).ok_or_else(|| {
        StargazeError::invalid_input(format!(
            "not a GitHub repository URL: {:?} (expected https://github.com/<owner>/<repo>)",
            request.repo_url
        ))
    })?;

    if request.require_credential && !client.has_credential() {
        return Err(StargazeError::invalid_input("a GitHub token is required"));
    }

    Ok(repo_path)
}

/// Run the full pipeline, using the current time for the window cutoff.
pub async fn run(
    client: &GitHubClient,
    request: &PipelineRequest,
    options: &EnrichOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<PipelineOutput> {
    run_at(client, request, options, Utc::now(), on_progress).await
}

/// Run the full pipeline with an explicit "now" for the window cutoff.
pub async fn run_at(
    client: &GitHubClient,
    request: &PipelineRequest,
    options: &EnrichOptions,
    now: DateTime<Utc>,
    on_progress: Option<&ProgressCallback>,
) -> Result<PipelineOutput> {
    let repo_path = validate(client, request)?;

    let mut stargazers = client.fetch_all_stargazers(&repo_path, on_progress).await?;

    if let Some(window) = request.window {
        let total = stargazers.len();
        let cutoff = cutoff_for_window(now, window.duration());
        stargazers = filter_since(stargazers, cutoff);
        tracing::info!(kept = stargazers.len(), total, cutoff = %cutoff, "Applied time window");
        emit(
            on_progress,
            StargazeProgress::Filtered {
                kept: stargazers.len(),
                total,
                cutoff,
            },
        );
    }

    let enriched = enrich_stargazers(client, &stargazers, options, on_progress).await?;
    let table = ExportTable::from_stargazers(&enriched);

    Ok(PipelineOutput {
        repo_path,
        window: request.window,
        stargazers: enriched,
        table,
    })
}
