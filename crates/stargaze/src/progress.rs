//! Progress reporting types for the stargazer pipeline.
//!
//! The library never renders anything itself; it emits [`StargazeProgress`]
//! events through an optional callback and lets the front end decide how to
//! show them.

use chrono::{DateTime, Utc};

/// Progress events emitted while fetching and enriching stargazers.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum StargazeProgress {
    /// Starting to page through a repository's stargazers.
    FetchingStargazers {
        /// The `owner/repo` path being fetched.
        repo: String,
    },

    /// Fetched one page of stargazers.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Number of stargazers on this page.
        count: usize,
        /// Running total of stargazers fetched so far.
        total_so_far: usize,
    },

    /// Finished paging.
    FetchComplete {
        /// Total number of stargazers fetched.
        total: usize,
    },

    /// Time window filter applied.
    Filtered {
        /// Stargazers starred at or after the cutoff.
        kept: usize,
        /// Stargazers before filtering.
        total: usize,
        /// The cutoff that was applied.
        cutoff: DateTime<Utc>,
    },

    /// Starting profile enrichment.
    EnrichingStargazers {
        /// Number of stargazers to enrich.
        total: usize,
        /// Members per batch.
        batch_size: usize,
        /// Number of batches.
        batches: usize,
    },

    /// One batch of profiles resolved.
    BatchEnriched {
        /// Batch number (1-indexed).
        batch: usize,
        /// Number of batches.
        batches: usize,
        /// Stargazers enriched so far.
        enriched_so_far: usize,
        /// Stargazers to enrich in total.
        total: usize,
    },

    /// Enrichment finished for every stargazer.
    EnrichComplete {
        /// Number of enriched stargazers.
        total: usize,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(StargazeProgress) + Send + Sync>;

/// Helper to emit progress events.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: StargazeProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
