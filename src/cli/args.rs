//! CLI argument definitions using clap derive

use crate::ci::{self, parse_pull_request, CiContext};
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// cicache - git-backed CI run cache and coverage gate
///
/// Skips test and deploy runs that already succeeded for the same commits
/// and fails builds whose coverage drops below the trunk baseline.
#[derive(Parser, Debug)]
#[command(name = "cicache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CICACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .cicache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Cache repository remote URL (overrides config)
    #[arg(long, global = true, env = "CICACHE_REMOTE")]
    pub remote: Option<String>,

    /// Local clone of the cache repository (overrides config)
    #[arg(long, global = true, env = "CICACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read or write cache entries directly
    Cache(CacheArgs),

    /// Gate the build on coverage against the trunk baseline
    Coverage(CoverageArgs),

    /// Run tests unless this commit already passed
    Test(TestArgs),

    /// Deploy unless this commit is already deployed in MODE
    Deploy(DeployArgs),

    /// Check git and cache remote availability
    Status,

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

/// CI job facts, defaulting to the Travis environment
#[derive(Args, Debug, Clone, Default)]
pub struct CiArgs {
    /// Branch being built (target branch for pull requests)
    #[arg(long, env = "TRAVIS_BRANCH", default_value = "")]
    pub branch: String,

    /// Pull request number, or "false"
    #[arg(long, env = "TRAVIS_PULL_REQUEST", default_value = "false")]
    pub pull_request: String,

    /// Commit being built
    #[arg(long, env = "TRAVIS_COMMIT", default_value = "")]
    pub commit: String,

    /// Commit of a companion repository included in the build
    #[arg(long, env = "CICACHE_COMPANION_COMMIT")]
    pub companion_commit: Option<String>,

    /// Repository slug (org/repo)
    #[arg(long, env = "TRAVIS_REPO_SLUG", default_value = "")]
    pub repo: String,

    /// Link to this job's log
    #[arg(long, env = "TRAVIS_JOB_WEB_URL")]
    pub job_url: Option<String>,

    /// CI job id, used to build a log link when --job-url is absent
    #[arg(long, env = "TRAVIS_JOB_ID")]
    pub job_id: Option<String>,
}

impl CiArgs {
    /// Build the job context
    pub fn context(&self) -> CiContext {
        CiContext {
            branch: self.branch.clone(),
            pull_request: parse_pull_request(&self.pull_request),
            commit: self.commit.clone(),
            companion_commit: self.companion_commit.clone().filter(|c| !c.is_empty()),
            repo: self.repo.clone(),
            job_url: self.job_url.clone(),
            job_id: self.job_id.clone(),
        }
    }
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the path a key encodes to
    Key {
        /// Key tokens in order
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Print a stored value (exits non-zero on a miss)
    Get {
        /// Key tokens in order
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Store a value
    Put {
        /// Key tokens in order
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Value to store
        #[arg(long)]
        value: String,
    },
}

/// Arguments for the coverage command
#[derive(Parser, Debug)]
pub struct CoverageArgs {
    /// Read the coverage report from a file instead of running the command
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Key prefix of the coverage record (comma-separated tokens)
    #[arg(long, value_delimiter = ',')]
    pub identity: Vec<String>,

    #[command(flatten)]
    pub ci: CiArgs,
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// First token of the test record key
    #[arg(long, default_value = ci::TESTED)]
    pub key_label: String,

    #[command(flatten)]
    pub ci: CiArgs,

    /// Test command (defaults to actions.test from config)
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the deploy command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Deploy mode (e.g. staging, production)
    pub mode: String,

    #[command(flatten)]
    pub ci: CiArgs,

    /// Deploy command (defaults to actions.deploy from config)
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
