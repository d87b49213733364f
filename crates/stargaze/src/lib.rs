//! Stargaze - fetch, enrich and export the stargazers of a GitHub repository.
//!
//! The pipeline pages through `GET /repos/{owner}/{repo}/stargazers`,
//! optionally keeps only recent stars, resolves each user's public profile in
//! throttled concurrent batches, and projects the result into a fixed
//! nine-column table that can be written as CSV or XLSX.
//!
//! # Example
//!
//! ```ignore
//! use stargaze::github::{ClientConfig, GitHubClient};
//! use stargaze::pipeline::{self, ExportOptions, PipelineRequest, TimeWindow};
//! use stargaze::EnrichOptions;
//!
//! let client = GitHubClient::new(ClientConfig::with_credential(&token))?;
//! let request = PipelineRequest::new("https://github.com/rust-lang/rust")
//!     .with_window(Some(TimeWindow::last_24_hours()));
//!
//! let output = pipeline::run(&client, &request, &EnrichOptions::default(), None).await?;
//! output.write_to(".".as_ref(), ExportOptions::default())?;
//! ```

pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod github;
pub mod http;
pub mod pipeline;
pub mod progress;
pub mod rate_limit;
pub mod repo_path;
pub mod retry;

pub use enrich::{EnrichOptions, EnrichedStargazer, NOT_AVAILABLE, enrich_stargazers};
pub use error::{Result, StargazeError};
pub use export::{CsvMode, ExportTable, HEADERS, to_csv};
pub use filter::{cutoff_for_window, filter_since};
pub use github::{ClientConfig, Credential, GitHubClient, RawStargazer, UserProfile};
pub use pipeline::{ExportOptions, PipelineOutput, PipelineRequest, TimeWindow};
pub use progress::{ProgressCallback, StargazeProgress, emit};
pub use rate_limit::ApiRateLimiter;
pub use repo_path::extract_repo_path;
pub use retry::RetryPolicy;
