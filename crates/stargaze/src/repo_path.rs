//! Extracting `owner/repo` from user-supplied GitHub URLs.

use std::sync::LazyLock;

use regex::Regex;

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)")
        .expect("repository URL pattern is valid")
});

/// Find `github.com/<owner>/<repo>` anywhere in `input` and return
/// `<owner>/<repo>`.
///
/// Surrounding text, a scheme, a trailing path, query or fragment and a
/// `.git` suffix are all ignored. Returns `None` if no such segment exists.
pub fn extract_repo_path(input: &str) -> Option<String> {
    let caps = REPO_URL.captures(input)?;
    let owner = &caps[1];
    let repo = caps[2].trim_end_matches(".git").trim_end_matches('.');

    if repo.is_empty() {
        return None;
    }

    Some(format!("{owner}/{repo}"))
}
