//! Wire types for the GitHub REST endpoints used by stargaze.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Maximum page size accepted by the stargazers endpoint.
pub const PER_PAGE: usize = 100;

/// `Accept` header that makes GitHub include `starred_at` on each stargazer.
pub const STAR_MEDIA_TYPE: &str = "application/vnd.github.v3.star+json";

/// Default `Accept` header for every other endpoint.
pub const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// One record from `GET /repos/{owner}/{repo}/stargazers` (star media type).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawStargazer {
    pub user: StargazerUser,
    /// Absent if the server ignored the star media type.
    #[serde(default)]
    pub starred_at: Option<DateTime<Utc>>,
}

impl RawStargazer {
    pub fn login(&self) -> &str {
        &self.user.login
    }
}

/// The user part of a stargazer record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StargazerUser {
    pub login: String,
    pub html_url: String,
}

/// Public profile from `GET /users/{login}`.
///
/// GitHub returns `null` for unset fields and sometimes an empty string
/// (notably `blog`); use the accessors, which treat both as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub login: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub twitter_username: Option<String>,
    pub bio: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

impl UserProfile {
    pub fn email(&self) -> Option<&str> {
        present(&self.email)
    }

    pub fn company(&self) -> Option<&str> {
        present(&self.company)
    }

    pub fn location(&self) -> Option<&str> {
        present(&self.location)
    }

    pub fn blog(&self) -> Option<&str> {
        present(&self.blog)
    }

    pub fn twitter_username(&self) -> Option<&str> {
        present(&self.twitter_username)
    }

    pub fn bio(&self) -> Option<&str> {
        present(&self.bio)
    }
}

/// An opaque API token.
///
/// `Debug` is redacted so the token cannot leak into logs or panic messages.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token. Blank input means "unauthenticated" and yields `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) fn authorization(&self) -> String {
        format!("token {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
