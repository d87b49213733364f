//! Progress reporting for the fetch command.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): Animated progress bars using indicatif
//! - Logging mode (non-TTY): Structured logging using tracing

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use stargaze::{ProgressCallback, StargazeProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: StargazeProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_events() -> Vec<StargazeProgress> {
        vec![
            StargazeProgress::FetchingStargazers {
                repo: "octo/widgets".to_string(),
            },
            StargazeProgress::FetchedPage {
                page: 1,
                count: 100,
                total_so_far: 100,
            },
            StargazeProgress::FetchedPage {
                page: 2,
                count: 3,
                total_so_far: 103,
            },
            StargazeProgress::FetchComplete { total: 103 },
            StargazeProgress::Filtered {
                kept: 3,
                total: 103,
                cutoff: chrono::Utc::now(),
            },
            StargazeProgress::EnrichingStargazers {
                total: 3,
                batch_size: 2,
                batches: 2,
            },
            StargazeProgress::BatchEnriched {
                batch: 1,
                batches: 2,
                enriched_so_far: 2,
                total: 3,
            },
            StargazeProgress::BatchEnriched {
                batch: 2,
                batches: 2,
                enriched_so_far: 3,
                total: 3,
            },
            StargazeProgress::EnrichComplete { total: 3 },
        ]
    }

    #[test]
    fn interactive_reporter_handles_full_event_sequence() {
        let reporter = Arc::new(ProgressReporter::Interactive(InteractiveReporter::new()));
        let callback = reporter.as_callback();
        for event in all_events() {
            callback(event);
        }
        reporter.finish();
    }

    #[test]
    fn logging_reporter_handles_full_event_sequence() {
        let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
        let callback = reporter.as_callback();
        for event in all_events() {
            callback(event);
        }
        reporter.finish();
    }

    #[test]
    fn interactive_reporter_tolerates_empty_enrichment() {
        let reporter = InteractiveReporter::new();
        reporter.handle(StargazeProgress::FetchingStargazers {
            repo: "octo/empty".to_string(),
        });
        reporter.handle(StargazeProgress::FetchComplete { total: 0 });
        reporter.handle(StargazeProgress::EnrichingStargazers {
            total: 0,
            batch_size: 50,
            batches: 0,
        });
        reporter.handle(StargazeProgress::EnrichComplete { total: 0 });
        reporter.finish();
    }
}
