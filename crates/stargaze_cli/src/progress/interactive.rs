use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use stargaze::StargazeProgress;

/// Bars for the two pipeline phases, under a single lock.
#[derive(Default)]
struct ProgressState {
    /// Spinner counting fetched stargazers.
    fetch_bar: Option<ProgressBar>,
    /// Bar advancing once per enriched batch.
    enrich_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: StargazeProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            StargazeProgress::FetchingStargazers { repo } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                pb.set_prefix(format!("{:12}", "Fetching"));
                pb.set_message(format!("Stargazers of {repo}..."));
                state.fetch_bar = Some(pb);
            }

            StargazeProgress::FetchedPage {
                page, total_so_far, ..
            } => {
                if let Some(ref pb) = state.fetch_bar {
                    pb.set_message(format!("Page {page} ({total_so_far} stargazers)"));
                }
            }

            StargazeProgress::FetchComplete { total } => {
                if let Some(ref pb) = state.fetch_bar {
                    pb.set_style(Self::done_style());
                    pb.finish_with_message(format!("Fetched {total} stargazers"));
                }
            }

            StargazeProgress::Filtered {
                kept,
                total,
                cutoff,
            } => {
                self.multi
                    .println(format!(
                        "Kept {kept} of {total} stargazers since {}",
                        cutoff.format("%Y-%m-%d %H:%M UTC")
                    ))
                    .ok();
            }

            StargazeProgress::EnrichingStargazers { total, .. } => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{:12}", "Enriching"));
                state.enrich_bar = Some(pb);
            }

            StargazeProgress::BatchEnriched {
                batch,
                batches,
                enriched_so_far,
                ..
            } => {
                if let Some(ref pb) = state.enrich_bar {
                    pb.set_position(enriched_so_far as u64);
                    pb.set_message(format!("batch {batch}/{batches}"));
                }
            }

            StargazeProgress::EnrichComplete { total } => {
                if let Some(ref pb) = state.enrich_bar {
                    pb.set_position(total as u64);
                    pb.finish_with_message("done");
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.fetch_bar, &state.enrich_bar].into_iter().flatten() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .expect("Invalid template")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn done_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {msg:.green}")
            .expect("Invalid template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
