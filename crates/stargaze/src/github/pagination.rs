//! Paging through a repository's stargazers.

use crate::error::Result;
use crate::progress::{ProgressCallback, StargazeProgress, emit};

use super::client::GitHubClient;
use super::types::{PER_PAGE, RawStargazer, STAR_MEDIA_TYPE};

/// Build the API route for one page of stargazers.
pub fn stargazers_route(repo_path: &str, page: u32) -> String {
    format!("/repos/{repo_path}/stargazers?page={page}&per_page={PER_PAGE}")
}

impl GitHubClient {
    /// Fetch every stargazer of `repo_path` (`owner/repo`), in API order.
    ///
    /// Pages are requested from 1 upward until one comes back with fewer than
    /// [`PER_PAGE`] records. A repository whose star count is an exact
    /// multiple of the page size therefore costs one extra request that
    /// returns an empty page. Errors from any page are returned as-is; this
    /// layer does not retry on its own.
    pub async fn fetch_all_stargazers(
        &self,
        repo_path: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<RawStargazer>> {
        let mut all_items: Vec<RawStargazer> = Vec::new();
        let mut page = 1u32;

        emit(
            on_progress,
            StargazeProgress::FetchingStargazers {
                repo: repo_path.to_string(),
            },
        );

        loop {
            let route = stargazers_route(repo_path, page);
            let items: Vec<RawStargazer> = self.get_json(&route, STAR_MEDIA_TYPE).await?;
            let count = items.len();
            all_items.extend(items);

            tracing::debug!(repo = %repo_path, page, count, "Fetched stargazer page");
            emit(
                on_progress,
                StargazeProgress::FetchedPage {
                    page,
                    count,
                    total_so_far: all_items.len(),
                },
            );

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        tracing::info!(repo = %repo_path, total = all_items.len(), pages = page, "Fetched stargazers");
        emit(
            on_progress,
            StargazeProgress::FetchComplete {
                total: all_items.len(),
            },
        );

        Ok(all_items)
    }
}
