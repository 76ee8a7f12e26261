//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Environment variables that identify a CI provider, with display names
const CI_PROVIDERS: &[(&str, &str)] = &[
    ("TRAVIS", "Travis CI"),
    ("GITHUB_ACTIONS", "GitHub Actions"),
    ("GITLAB_CI", "GitLab CI"),
    ("CIRCLECI", "CircleCI"),
    ("JENKINS_URL", "Jenkins"),
    ("BUILDKITE", "Buildkite"),
    ("TEAMCITY_VERSION", "TeamCity"),
    ("TF_BUILD", "Azure Pipelines"),
];

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether running in an interactive terminal
    interactive: bool,
    /// Detected CI provider, if any
    ci_provider: Option<&'static str>,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        let ci_provider = Self::detect_ci_provider();
        let interactive = ci_provider.is_none()
            && std::env::var_os("CI").is_none()
            && std::io::stdout().is_terminal()
            && std::io::stdin().is_terminal();
        Self {
            interactive,
            ci_provider,
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ci_provider: None,
        }
    }

    /// Check if we should use fancy output (cliclack, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    /// Name of the CI provider running this job
    pub fn ci_provider(&self) -> Option<&'static str> {
        self.ci_provider
    }

    fn detect_ci_provider() -> Option<&'static str> {
        CI_PROVIDERS
            .iter()
            .find(|(var, _)| std::env::var_os(var).is_some())
            .map(|(_, name)| *name)
    }
}
