//! CI job context
//!
//! The facts about the current job that cache keys and the coverage gate
//! are built from. Values come from command-line flags, which fall back to
//! the Travis environment variables.

use crate::cache::CacheKey;
use std::fmt;

/// Label of test-run records
pub const TESTED: &str = "tested";

/// Label of deploy records
pub const DEPLOYED: &str = "deployed";

/// Context information about the current CI job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiContext {
    /// Branch being built (for pull requests, the target branch)
    pub branch: String,
    /// Whether this build is for a pull request
    pub pull_request: bool,
    /// Commit under test
    pub commit: String,
    /// Commit of a companion repository the build also depends on
    pub companion_commit: Option<String>,
    /// Repository slug, e.g. `org/repo`
    pub repo: String,
    /// Link to this job's log, when the CI provides one
    pub job_url: Option<String>,
    /// Provider job id
    pub job_id: Option<String>,
}

impl CiContext {
    /// Key recording a successful test run of this commit under `label`
    /// (normally [`TESTED`])
    pub fn tested_key(&self, label: &str) -> CacheKey {
        self.with_commits(CacheKey::new([label, self.repo.as_str()]))
    }

    /// Key recording a successful deploy of this commit in `mode`
    pub fn deployed_key(&self, mode: &str) -> CacheKey {
        self.with_commits(CacheKey::new([DEPLOYED, mode, self.repo.as_str()]))
    }

    fn with_commits(&self, key: CacheKey) -> CacheKey {
        let key = key.child(self.commit.as_str());
        match &self.companion_commit {
            Some(companion) => key.child(companion.as_str()),
            None => key,
        }
    }

    /// Reference stored for a completed run: the job URL if known, else one
    /// built from `job_url_base`, else `"unknown"`
    pub fn result_reference(&self, job_url_base: &str) -> String {
        if let Some(url) = self.job_url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        match self.job_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) if !self.repo.is_empty() => format!(
                "{}/{}/jobs/{}",
                job_url_base.trim_end_matches('/'),
                self.repo,
                id
            ),
            _ => "unknown".to_string(),
        }
    }
}

impl fmt::Display for CiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({}{})",
            self.repo,
            self.branch,
            self.commit.get(..7).unwrap_or(&self.commit),
            if self.pull_request { ", pull request" } else { "" }
        )
    }
}

/// Interpret a pull-request flag: `"false"`, empty or `"0"` mean no,
/// anything else (a PR number, `"true"`) means yes
pub fn parse_pull_request(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "false" | "0" | "no")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";
    const COMPANION: &str = "fedcba9876543210fedcba9876543210fedcba98";

    fn context() -> CiContext {
        CiContext {
            branch: "master".to_string(),
            commit: SHA.to_string(),
            repo: "org/repo".to_string(),
            ..CiContext::default()
        }
    }

    #[test]
    fn tested_key_layout() {
        let mut ctx = context();
        assert_eq!(
            ctx.tested_key(TESTED).tokens(),
            &["tested", "org/repo", SHA]
        );

        ctx.companion_commit = Some(COMPANION.to_string());
        assert_eq!(
            ctx.tested_key(TESTED).tokens(),
            &["tested", "org/repo", SHA, COMPANION]
        );
    }

    #[test]
    fn tested_key_custom_label() {
        let key = context().tested_key("tested-e2e");
        assert_eq!(key.tokens()[0], "tested-e2e");
        assert_ne!(key.encode(), context().tested_key(TESTED).encode());
    }

    #[test]
    fn deployed_key_layout() {
        let key = context().deployed_key("staging");
        assert_eq!(
            key.encode(),
            format!("deployed/staging/org/repo/01/{}", &SHA[2..])
        );
    }

    #[test]
    fn pull_request_flag() {
        assert!(!parse_pull_request("false"));
        assert!(!parse_pull_request(""));
        assert!(!parse_pull_request("FALSE"));
        assert!(parse_pull_request("1234"));
        assert!(parse_pull_request("true"));
    }

    #[test]
    fn result_reference_prefers_job_url() {
        let mut ctx = context();
        ctx.job_url = Some("https://travis-ci.com/org/repo/jobs/9".to_string());
        ctx.job_id = Some("1".to_string());
        assert_eq!(
            ctx.result_reference("https://travis-ci.org"),
            "https://travis-ci.com/org/repo/jobs/9"
        );
    }

    #[test]
    fn result_reference_from_job_id() {
        let mut ctx = context();
        ctx.job_id = Some("42".to_string());
        assert_eq!(
            ctx.result_reference("https://travis-ci.org/"),
            "https://travis-ci.org/org/repo/jobs/42"
        );
    }

    #[test]
    fn result_reference_unknown() {
        assert_eq!(context().result_reference("https://travis-ci.org"), "unknown");
    }

    #[test]
    fn display_short_sha() {
        let ctx = context();
        assert_eq!(ctx.to_string(), "org/repo@master (0123456)");
    }
}
