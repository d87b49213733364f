//! Batched, concurrent profile enrichment.
//!
//! Stargazers are split into contiguous batches. Every member of a batch
//! resolves its profile in its own task; the batch is a join barrier, and
//! each task writes into the slot of its position so output order always
//! matches input order. Every completed batch is followed by a fixed pause
//! to stay under the API quota; a failed batch returns immediately.

use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::error::{Result, StargazeError};
use crate::github::{GitHubClient, RawStargazer, UserProfile};
use crate::progress::{ProgressCallback, StargazeProgress, emit};

/// Default number of profiles resolved concurrently.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default pause between consecutive batches.
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 2_000;

/// Placeholder for any field GitHub did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Options for the enrichment stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Members per batch (values below 1 are treated as 1).
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub inter_batch_delay: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
        }
    }
}

/// A stargazer together with their public profile, flattened for export.
///
/// Every field is populated; missing values carry [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedStargazer {
    pub username: String,
    pub profile_url: String,
    pub email: String,
    pub company: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub twitter: String,
    pub bio: String,
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

/// The website, if it points at LinkedIn.
pub fn linkedin_from_website(website: Option<&str>) -> String {
    or_na(website.filter(|w| w.contains("linkedin.com")))
}

/// Full profile URL for a Twitter handle.
pub fn twitter_url(handle: Option<&str>) -> String {
    handle.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |h| format!("https://twitter.com/{h}"),
    )
}

impl EnrichedStargazer {
    /// Combine a raw stargazer with the profile fetched for them.
    pub fn from_profile(stargazer: &RawStargazer, profile: &UserProfile) -> Self {
        Self {
            username: stargazer.user.login.clone(),
            profile_url: stargazer.user.html_url.clone(),
            email: or_na(profile.email()),
            company: or_na(profile.company()),
            location: or_na(profile.location()),
            website: or_na(profile.blog()),
            linkedin: linkedin_from_website(profile.blog()),
            twitter: twitter_url(profile.twitter_username()),
            bio: or_na(profile.bio()),
        }
    }
}

/// Resolve the profile of every stargazer.
///
/// The result has exactly one entry per input record, in input order. If any
/// single lookup fails (retry budget exhausted or a non-retryable status),
/// the remaining lookups of that batch are cancelled and the whole call
/// fails; no partial result is returned.
pub async fn enrich_stargazers(
    client: &GitHubClient,
    records: &[RawStargazer],
    options: &EnrichOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<EnrichedStargazer>> {
    let total = records.len();
    let batch_size = options.batch_size.max(1);
    let batches = total.div_ceil(batch_size);

    emit(
        on_progress,
        StargazeProgress::EnrichingStargazers {
            total,
            batch_size,
            batches,
        },
    );

    let mut enriched = Vec::with_capacity(total);

    for (index, batch) in records.chunks(batch_size).enumerate() {
        enriched.extend(enrich_batch(client, batch).await?);

        tracing::debug!(
            batch = index + 1,
            batches,
            enriched = enriched.len(),
            total,
            "Enriched batch"
        );
        emit(
            on_progress,
            StargazeProgress::BatchEnriched {
                batch: index + 1,
                batches,
                enriched_so_far: enriched.len(),
                total,
            },
        );

        // Every completed batch is followed by the pause, the last one included
        if !options.inter_batch_delay.is_zero() {
            tokio::time::sleep(options.inter_batch_delay).await;
        }
    }

    tracing::info!(total = enriched.len(), "Enrichment complete");
    emit(
        on_progress,
        StargazeProgress::EnrichComplete {
            total: enriched.len(),
        },
    );

    Ok(enriched)
}

async fn enrich_batch(
    client: &GitHubClient,
    batch: &[RawStargazer],
) -> Result<Vec<EnrichedStargazer>> {
    let mut join_set: JoinSet<(usize, Result<UserProfile>)> = JoinSet::new();

    for (slot, stargazer) in batch.iter().enumerate() {
        let client = client.clone();
        let login = stargazer.user.login.clone();
        join_set.spawn(async move { (slot, client.get_user_profile(&login).await) });
    }

    let mut profiles: Vec<Option<UserProfile>> = vec![None; batch.len()];

    while let Some(joined) = join_set.join_next().await {
        let (slot, result) =
            joined.map_err(|e| StargazeError::Internal(format!("profile task failed: {e}")))?;
        match result {
            Ok(profile) => profiles[slot] = Some(profile),
            Err(e) => {
                tracing::warn!(
                    login = %batch[slot].user.login,
                    error = %e,
                    "Profile lookup failed, abandoning batch"
                );
                join_set.abort_all();
                return Err(e);
            }
        }
    }

    batch
        .iter()
        .zip(profiles)
        .map(|(stargazer, profile)| {
            profile
                .map(|p| EnrichedStargazer::from_profile(stargazer, &p))
                .ok_or_else(|| {
                    StargazeError::Internal(format!(
                        "no profile resolved for {}",
                        stargazer.user.login
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::github::{ClientConfig, StargazerUser};
    use crate::http::{HttpResponse, MockTransport};
    use crate::retry::RetryPolicy;

    const BASE: &str = "https://api.test";

    fn star(login: &str) -> RawStargazer {
        RawStargazer {
            user: StargazerUser {
                login: login.to_string(),
                html_url: format!("https://github.com/{login}"),
            },
            starred_at: None,
        }
    }

    fn user_url(login: &str) -> String {
        format!("{BASE}/users/{login}")
    }

    fn profile_response(login: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: serde_json::to_vec(&serde_json::json!({
                "login": login,
                "company": format!("{login} inc"),
                "blog": null,
            }))
            .expect("serialize profile"),
        }
    }

    fn client(transport: &MockTransport) -> GitHubClient {
        let config = ClientConfig {
            api_base: BASE.to_string(),
            retry: RetryPolicy::new(3, Duration::from_millis(10), Duration::from_secs(60)),
            ..ClientConfig::default()
        };
        GitHubClient::new_with_transport(config, Arc::new(transport.clone()))
    }

    #[test]
    fn linkedin_is_derived_from_website() {
        assert_eq!(
            linkedin_from_website(Some("http://linkedin.com/in/x")),
            "http://linkedin.com/in/x"
        );
        assert_eq!(linkedin_from_website(Some("http://example.com")), "N/A");
        assert_eq!(linkedin_from_website(None), "N/A");
    }

    #[test]
    fn twitter_handle_becomes_profile_url() {
        assert_eq!(twitter_url(Some("rustlang")), "https://twitter.com/rustlang");
        assert_eq!(twitter_url(None), "N/A");
    }

    #[test]
    fn from_profile_fills_sentinels() {
        let enriched = EnrichedStargazer::from_profile(&star("ghost"), &UserProfile::default());
        assert_eq!(enriched.username, "ghost");
        assert_eq!(enriched.profile_url, "https://github.com/ghost");
        for field in [
            &enriched.email,
            &enriched.company,
            &enriched.location,
            &enriched.website,
            &enriched.linkedin,
            &enriched.twitter,
            &enriched.bio,
        ] {
            assert_eq!(field, NOT_AVAILABLE);
        }
    }

    #[test]
    fn from_profile_maps_every_field() {
        let profile = UserProfile {
            login: "octocat".to_string(),
            email: Some("octo@example.com".to_string()),
            company: Some("GitHub".to_string()),
            location: Some("San Francisco".to_string()),
            blog: Some("https://www.linkedin.com/in/octocat".to_string()),
            twitter_username: Some("octo".to_string()),
            bio: Some("Mascot".to_string()),
        };
        let enriched = EnrichedStargazer::from_profile(&star("octocat"), &profile);
        assert_eq!(enriched.email, "octo@example.com");
        assert_eq!(enriched.company, "GitHub");
        assert_eq!(enriched.location, "San Francisco");
        assert_eq!(enriched.website, "https://www.linkedin.com/in/octocat");
        assert_eq!(enriched.linkedin, "https://www.linkedin.com/in/octocat");
        assert_eq!(enriched.twitter, "https://twitter.com/octo");
        assert_eq!(enriched.bio, "Mascot");
    }

    #[test]
    fn test_enrich_options_default() {
        let options = EnrichOptions::default();
        assert_eq!(options.batch_size, 50);
        assert_eq!(options.inter_batch_delay, Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn output_order_matches_input_despite_reversed_completion() {
        let transport = MockTransport::new();
        let logins = ["a", "b", "c", "d", "e"];
        for (i, login) in logins.iter().enumerate() {
            // Earlier members answer later.
            let delay = Duration::from_millis(100 * (logins.len() - i) as u64);
            transport.push_delayed_response(user_url(login), profile_response(login), delay);
        }
        let records: Vec<_> = logins.iter().map(|l| star(l)).collect();

        let enriched = enrich_stargazers(
            &client(&transport),
            &records,
            &EnrichOptions::default(),
            None,
        )
        .await
        .expect("enrich");

        let usernames: Vec<&str> = enriched.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(usernames, logins);
        assert_eq!(enriched[2].company, "c inc");
    }

    #[tokio::test(start_paused = true)]
    async fn batch_members_run_concurrently() {
        let transport = MockTransport::new();
        let logins = ["a", "b", "c", "d"];
        for login in logins {
            transport.push_delayed_response(
                user_url(login),
                profile_response(login),
                Duration::from_secs(1),
            );
        }
        let records: Vec<_> = logins.iter().map(|l| star(l)).collect();

        let options = EnrichOptions {
            inter_batch_delay: Duration::ZERO,
            ..EnrichOptions::default()
        };

        let start = tokio::time::Instant::now();
        enrich_stargazers(&client(&transport), &records, &options, None)
            .await
            .expect("enrich");

        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn one_failed_member_fails_the_whole_call() {
        let transport = MockTransport::new();
        for login in ["a", "b", "d", "e"] {
            transport.push_response(user_url(login), profile_response(login));
        }
        for _ in 0..3 {
            transport.push_transport_error(user_url("c"), "connection reset");
        }
        let records: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|l| star(l)).collect();

        let err = enrich_stargazers(
            &client(&transport),
            &records,
            &EnrichOptions::default(),
            None,
        )
        .await
        .expect_err("member c exhausts its retries");

        assert!(matches!(err, StargazeError::Transient { attempts: 3, .. }));
        assert_eq!(transport.request_count(&user_url("c")), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_in_later_batch_skips_remaining_batches() {
        let transport = MockTransport::new();
        transport.push_response(user_url("a"), profile_response("a"));
        transport.push_response(
            user_url("b"),
            HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: br#"{"message":"Not Found"}"#.to_vec(),
            },
        );
        let records: Vec<_> = ["a", "b", "c"].iter().map(|l| star(l)).collect();
        let options = EnrichOptions {
            batch_size: 1,
            inter_batch_delay: Duration::from_millis(2_000),
        };

        let err = enrich_stargazers(&client(&transport), &records, &options, None)
            .await
            .expect_err("b is not found");

        assert!(matches!(err, StargazeError::Upstream { status: 404, .. }));
        assert_eq!(transport.request_count(&user_url("c")), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn batches_are_throttled_and_report_progress() {
        let transport = MockTransport::new();
        let logins = ["a", "b", "c", "d", "e"];
        for login in logins {
            transport.push_response(user_url(login), profile_response(login));
        }
        let records: Vec<_> = logins.iter().map(|l| star(l)).collect();
        let options = EnrichOptions {
            batch_size: 2,
            inter_batch_delay: Duration::from_millis(2_000),
        };

        let events: Arc<Mutex<Vec<StargazeProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            capture.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        });

        let start = tokio::time::Instant::now();
        let enriched = enrich_stargazers(&client(&transport), &records, &options, Some(&callback))
            .await
            .expect("enrich");

        assert_eq!(enriched.len(), 5);
        // Three batches, each followed by a pause
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(6_000));
        assert!(elapsed < Duration::from_millis(7_000));

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        let progress: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                StargazeProgress::BatchEnriched {
                    batch,
                    enriched_so_far,
                    ..
                } => Some((*batch, *enriched_so_far)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(1, 2), (2, 4), (3, 5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn single_batch_still_pauses_before_returning() {
        let transport = MockTransport::new();
        transport.push_response(user_url("solo"), profile_response("solo"));

        let start = tokio::time::Instant::now();
        let enriched = enrich_stargazers(
            &client(&transport),
            &[star("solo")],
            &EnrichOptions::default(),
            None,
        )
        .await
        .expect("enrich");

        assert_eq!(enriched.len(), 1);
        assert!(start.elapsed() >= Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_batch_returns_without_pausing() {
        let transport = MockTransport::new();
        transport.push_response(
            user_url("gone"),
            HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: br#"{"message":"Not Found"}"#.to_vec(),
            },
        );

        let start = tokio::time::Instant::now();
        enrich_stargazers(
            &client(&transport),
            &[star("gone")],
            &EnrichOptions::default(),
            None,
        )
        .await
        .expect_err("404 fails the call");

        assert!(start.elapsed() < Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn empty_input_makes_no_requests() {
        let transport = MockTransport::new();
        let enriched = enrich_stargazers(
            &client(&transport),
            &[],
            &EnrichOptions::default(),
            None,
        )
        .await
        .expect("enrich");

        assert!(enriched.is_empty());
        assert!(transport.requests().is_empty());
    }
}
