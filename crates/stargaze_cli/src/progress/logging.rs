use stargaze::StargazeProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: StargazeProgress) {
        match event {
            StargazeProgress::FetchingStargazers { repo } => {
                tracing::info!(repo = %repo, "Fetching stargazers");
            }

            StargazeProgress::FetchedPage {
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(page, count, total_so_far, "Fetched page");
            }

            StargazeProgress::FetchComplete { total } => {
                tracing::info!(total, "Fetch complete");
            }

            StargazeProgress::Filtered {
                kept,
                total,
                cutoff,
            } => {
                tracing::info!(kept, total, cutoff = %cutoff, "Filtered by time window");
            }

            StargazeProgress::EnrichingStargazers {
                total,
                batch_size,
                batches,
            } => {
                tracing::info!(total, batch_size, batches, "Enriching stargazers");
            }

            StargazeProgress::BatchEnriched {
                batch,
                batches,
                enriched_so_far,
                total,
            } => {
                tracing::info!(batch, batches, enriched_so_far, total, "Batch enriched");
            }

            StargazeProgress::EnrichComplete { total } => {
                tracing::info!(total, "Enrichment complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
