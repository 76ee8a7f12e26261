//! Integration tests for cicache

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tempfile::TempDir;

const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

/// Environment variables that would leak CI facts into a test run
const CI_ENV: &[&str] = &[
    "CICACHE_CONFIG",
    "CICACHE_REMOTE",
    "CICACHE_DIR",
    "CICACHE_COMPANION_COMMIT",
    "TRAVIS_BRANCH",
    "TRAVIS_PULL_REQUEST",
    "TRAVIS_COMMIT",
    "TRAVIS_REPO_SLUG",
    "TRAVIS_JOB_WEB_URL",
    "TRAVIS_JOB_ID",
];

fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap();
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// A bare remote whose master branch holds one initial commit
struct Remote {
    root: TempDir,
}

impl Remote {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let bare = root.path().join("cache.git");
        let seed = root.path().join("seed");
        std::fs::create_dir_all(&bare).unwrap();
        std::fs::create_dir_all(&seed).unwrap();

        git(&bare, &["init", "--quiet", "--bare"]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        git(&seed, &["init", "--quiet"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        git(&seed, &["config", "user.name", "seed"]);
        git(&seed, &["config", "user.email", "seed@localhost"]);
        std::fs::write(seed.join("README"), "cache\n").unwrap();
        git(&seed, &["add", "README"]);
        git(&seed, &["commit", "--quiet", "-m", "init"]);
        git(
            &seed,
            &["push", "--quiet", bare.to_str().unwrap(), "HEAD:master"],
        );

        Self { root }
    }

    fn url(&self) -> String {
        self.root.path().join("cache.git").display().to_string()
    }

    fn clone_dir(&self, name: &str) -> PathBuf {
        self.root.path().join("clones").join(name)
    }
}

mod cli_tests {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    /// Isolated invocation: own config file, no journal, no CI env
    struct Harness {
        dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(
                dir.path().join("config.toml"),
                "[general]\njournal = false\n",
            )
            .unwrap();
            Self { dir }
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("cicache");
            for var in CI_ENV {
                cmd.env_remove(var);
            }
            cmd.arg("--config")
                .arg(self.dir.path().join("config.toml"))
                .arg("--no-local");
            cmd
        }

        fn with_remote(&self, remote: &Remote, clone: &str) -> Command {
            let mut cmd = self.cmd();
            cmd.arg("--remote")
                .arg(remote.url())
                .arg("--cache-dir")
                .arg(remote.clone_dir(clone));
            cmd
        }
    }

    #[test]
    fn help_displays() {
        Harness::new()
            .cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("git-backed CI run cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("cicache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cicache"));
    }

    #[test]
    fn cache_key_shards_long_tokens() {
        Harness::new()
            .cmd()
            .args(["cache", "key", "tested", "org/repo", SHA])
            .assert()
            .success()
            .stdout(predicate::str::diff(format!(
                "tested/org/repo/01/{}\n",
                &SHA[2..]
            )));
    }

    #[test]
    fn config_path() {
        Harness::new()
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        Harness::new()
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("journal = false"));
    }

    #[test]
    fn cache_get_without_remote_fails() {
        Harness::new()
            .cmd()
            .args(["cache", "get", "tested", "org/repo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cache remote configured"));
    }

    #[test]
    fn test_requires_commit() {
        Harness::new()
            .cmd()
            .args(["test", "--repo", "org/repo", "--", "true"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No commit given"));
    }

    #[test]
    fn completions_bash() {
        Harness::new()
            .cmd()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cicache"));
    }

    #[test]
    fn cache_put_then_get() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let harness = Harness::new();

        harness
            .with_remote(&remote, "writer")
            .args(["cache", "put", "coverage", "site", "master", "--value", "82"])
            .assert()
            .success();

        harness
            .with_remote(&remote, "reader")
            .args(["cache", "get", "coverage", "site", "master"])
            .assert()
            .success()
            .stdout("82\n");

        harness
            .with_remote(&remote, "reader")
            .args(["cache", "get", "coverage", "site", "release"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cache entry"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_once_per_commit() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let harness = Harness::new();
        let marker = harness.dir.path().join("runs");
        let script = format!("echo ran >> '{}'", marker.display());

        for clone in ["first", "second"] {
            harness
                .with_remote(&remote, clone)
                .args([
                    "test",
                    "--repo",
                    "org/repo",
                    "--commit",
                    SHA,
                    "--job-url",
                    "https://ci.example/jobs/1",
                    "--",
                    "sh",
                    "-c",
                    script.as_str(),
                ])
                .assert()
                .success();
        }

        let runs = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(runs.lines().count(), 1);

        harness
            .with_remote(&remote, "third")
            .args(["cache", "get", "tested", "org/repo", SHA])
            .assert()
            .success()
            .stdout("https://ci.example/jobs/1\n");
    }

    #[cfg(unix)]
    #[test]
    fn failed_test_is_not_recorded() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let harness = Harness::new();

        harness
            .with_remote(&remote, "first")
            .args(["test", "--repo", "org/repo", "--commit", SHA, "--", "false"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Action failed"));

        harness
            .with_remote(&remote, "first")
            .args(["cache", "get", "tested", "org/repo", SHA])
            .assert()
            .failure();
    }

    #[test]
    fn coverage_gate_records_and_blocks_regression() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let harness = Harness::new();
        let report = harness.dir.path().join("coverage.txt");

        std::fs::write(&report, "Name Stmts Miss Cover\nTOTAL 100 20 80%\n").unwrap();
        harness
            .with_remote(&remote, "ci")
            .args(["coverage", "--repo", "org/site", "--branch", "master"])
            .arg("--report")
            .arg(&report)
            .assert()
            .success();

        std::fs::write(&report, "TOTAL 100 25 75%\n").unwrap();
        harness
            .with_remote(&remote, "ci")
            .args(["coverage", "--repo", "org/site", "--branch", "feature"])
            .arg("--report")
            .arg(&report)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Coverage regression"));

        harness
            .with_remote(&remote, "ci")
            .args(["cache", "get", "coverage", "org/site", "master"])
            .assert()
            .success()
            .stdout("80\n");
    }

    #[test]
    fn unreadable_coverage_report_fails() {
        let harness = Harness::new();
        let report = harness.dir.path().join("coverage.txt");
        std::fs::write(&report, "no totals here\n").unwrap();

        harness
            .cmd()
            .args(["coverage", "--repo", "org/site", "--branch", "master"])
            .arg("--report")
            .arg(&report)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Coverage report unusable"));
    }
}

mod store_tests {
    use super::*;
    use cicache::cache::{CacheKey, CacheStore, GitCacheStore, PutOutcome};
    use cicache::config::schema::CacheConfig;

    fn config(remote: &Remote, clone: &str) -> CacheConfig {
        CacheConfig {
            remote: remote.url(),
            dir: Some(remote.clone_dir(clone)),
            ..CacheConfig::default()
        }
    }

    #[tokio::test]
    async fn concurrent_writers_both_land() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();

        let a = GitCacheStore::attach(&config(&remote, "a")).await.unwrap();
        let b = GitCacheStore::attach(&config(&remote, "b")).await.unwrap();

        let key_a = CacheKey::new(["tested", "org/repo", SHA]);
        let key_b = CacheKey::new(["deployed", "staging", "org/repo", SHA]);

        assert_eq!(a.put(&key_a, "https://ci/jobs/1").await, PutOutcome::Committed);
        // b is now behind the remote; its push is rejected once, then merged
        assert_eq!(b.put(&key_b, "https://ci/jobs/2").await, PutOutcome::Committed);

        let fresh = GitCacheStore::attach(&config(&remote, "fresh"))
            .await
            .unwrap();
        assert_eq!(
            fresh.get(&key_a).await.unwrap().as_deref(),
            Some("https://ci/jobs/1")
        );
        assert_eq!(
            fresh.get(&key_b).await.unwrap().as_deref(),
            Some("https://ci/jobs/2")
        );
    }

    #[tokio::test]
    async fn reattach_discards_local_changes() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let cfg = config(&remote, "local");

        let store = GitCacheStore::attach(&cfg).await.unwrap();
        let stray = store.work_tree().join("stray.txt");
        std::fs::write(&stray, "junk").unwrap();
        std::fs::write(store.work_tree().join("README"), "edited").unwrap();

        let store = GitCacheStore::attach(&cfg).await.unwrap();
        assert!(!stray.exists());
        assert_eq!(
            std::fs::read_to_string(store.work_tree().join("README")).unwrap(),
            "cache\n"
        );
    }

    #[tokio::test]
    async fn cache_dir_inside_project_checkout_leaves_project_alone() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let project = TempDir::new().unwrap();
        git(project.path(), &["init", "--quiet"]);
        git(
            project.path(),
            &["remote", "add", "origin", "https://example.invalid/project.git"],
        );
        let cache_dir = project.path().join(".cicache");
        std::fs::create_dir_all(&cache_dir).unwrap();

        let cfg = CacheConfig {
            remote: remote.url(),
            dir: Some(cache_dir.clone()),
            ..CacheConfig::default()
        };
        let store = GitCacheStore::attach(&cfg).await.unwrap();
        assert!(cache_dir.join(".git").exists());
        assert!(cache_dir.join("README").exists());
        assert!(!project.path().join("README").exists());

        let origin = StdCommand::new("git")
            .arg("-C")
            .arg(project.path())
            .args(["remote", "get-url", "origin"])
            .output()
            .unwrap();
        assert_eq!(
            String::from_utf8_lossy(&origin.stdout).trim(),
            "https://example.invalid/project.git"
        );

        // Reattaching refreshes the nested clone, not the project
        drop(store);
        GitCacheStore::attach(&cfg).await.unwrap();
        assert!(!project.path().join("README").exists());
    }

    #[tokio::test]
    async fn populated_non_clone_dir_is_refused() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let cfg = CacheConfig {
            remote: remote.url(),
            dir: Some(dir.path().to_path_buf()),
            ..CacheConfig::default()
        };
        let err = GitCacheStore::attach(&cfg).await.err().unwrap();
        assert!(matches!(
            err,
            cicache::CicacheError::CacheUnavailable { .. }
        ));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "keep me"
        );
    }

    #[tokio::test]
    async fn empty_and_corrupt_entries_are_misses() {
        if !git_available() {
            return;
        }
        let remote = Remote::new();
        let store = GitCacheStore::attach(&config(&remote, "entries"))
            .await
            .unwrap();

        let empty = CacheKey::new(["tested", "org/repo", "empty"]);
        assert_eq!(store.put(&empty, "").await, PutOutcome::Committed);
        assert_eq!(store.get(&empty).await.unwrap(), None);

        let corrupt = CacheKey::new(["tested", "org/repo", "corrupt"]);
        let path = store.work_tree().join(corrupt.relative_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, [0xc3, 0x28, 0xff]).unwrap();
        assert_eq!(store.get(&corrupt).await.unwrap(), None);

        let ran = cicache::guard::run_once(&store, &corrupt, "https://ci/jobs/9", || async {
            Ok(())
        })
        .await
        .unwrap();
        assert!(matches!(ran, cicache::guard::RunOutcome::Executed { .. }));
    }

    #[tokio::test]
    async fn unreachable_remote_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let cfg = CacheConfig {
            remote: dir.path().join("missing.git").display().to_string(),
            dir: Some(dir.path().join("clone")),
            ..CacheConfig::default()
        };

        let err = GitCacheStore::attach(&cfg).await.err().unwrap();
        assert!(matches!(
            err,
            cicache::CicacheError::CacheUnavailable { .. }
        ));
    }
}
