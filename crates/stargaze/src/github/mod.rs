//! GitHub API client for stargazer operations.
//!
//! # Module Structure
//!
//! - [`types`] - Wire types (`RawStargazer`, `UserProfile`) and the `Credential` wrapper
//! - [`client`] - Client configuration and the rate-limit-aware GET
//! - [`pagination`] - Paging through a repository's stargazers
//!
//! # Example
//!
//! ```ignore
//! use stargaze::github::{ClientConfig, GitHubClient};
//!
//! let client = GitHubClient::new(ClientConfig::with_credential(&token))?;
//! let stargazers = client.fetch_all_stargazers("rust-lang/rust", None).await?;
//! ```

mod client;
mod pagination;
mod types;

pub use client::{ClientConfig, DEFAULT_TIMEOUT_SECS, GITHUB_API_URL, GitHubClient};
pub use pagination::stargazers_route;
pub use types::{
    Credential, JSON_MEDIA_TYPE, PER_PAGE, RawStargazer, STAR_MEDIA_TYPE, StargazerUser,
    UserProfile,
};
