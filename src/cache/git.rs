//! Git-backed cache store
//!
//! The store is a working tree cloned from a shared remote. Each entry is
//! a plain text file at the key's encoded path. Writes are committed and
//! pushed to the trunk branch; a rejected push is retried once after
//! merging the remote, after which the write is given up as lost.

use crate::cache::key::CacheKey;
use crate::cache::store::{normalize_value, CacheStore, PutOutcome};
use crate::config::schema::CacheConfig;
use crate::error::{CicacheError, CicacheResult};
use crate::git::{GitRunner, SystemGit};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Cache store backed by a git working tree
pub struct GitCacheStore<G: GitRunner = SystemGit> {
    git: G,
    remote: String,
    branch: String,
    work_tree: PathBuf,
}

impl GitCacheStore<SystemGit> {
    /// Attach to the configured remote using the system git
    pub async fn attach(config: &CacheConfig) -> CicacheResult<Self> {
        Self::attach_with(SystemGit::new(), config).await
    }
}

impl<G: GitRunner> GitCacheStore<G> {
    /// Attach using a specific git runner
    ///
    /// Clones the remote when the working tree is absent, otherwise fetches
    /// and hard-resets it to the remote trunk. Any failure is fatal and
    /// reported as [`CicacheError::CacheUnavailable`].
    pub async fn attach_with(git: G, config: &CacheConfig) -> CicacheResult<Self> {
        if config.remote.trim().is_empty() {
            return Err(CicacheError::CacheRemoteMissing);
        }

        let store = Self {
            git,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            work_tree: config.work_tree(),
        };

        store
            .sync(&config.author_name, &config.author_email)
            .await
            .map_err(|e| CicacheError::CacheUnavailable {
                remote: store.remote.clone(),
                reason: e.to_string(),
            })?;

        Ok(store)
    }

    /// Local working tree path
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    async fn sync(&self, author_name: &str, author_email: &str) -> CicacheResult<()> {
        let dir = Some(self.work_tree.as_path());

        // `git -C` walks up to an enclosing repository, so only a tree with
        // its own `.git` is refreshed in place.
        if self.work_tree.join(".git").exists() {
            debug!("Refreshing cache clone at {}", self.work_tree.display());
            let upstream = format!("origin/{}", self.branch);
            self.git
                .run_checked(dir, &["remote", "set-url", "origin", &self.remote])
                .await?;
            self.git
                .run_checked(dir, &["fetch", "--quiet", "origin", &self.branch])
                .await?;
            self.git
                .run_checked(dir, &["reset", "--quiet", "--hard", &upstream])
                .await?;
            self.git.run_checked(dir, &["clean", "-fdq"]).await?;
        } else if self.work_tree.exists() && !is_empty_dir(&self.work_tree).await? {
            return Err(CicacheError::User(format!(
                "{} exists and is not a clone of the cache repository",
                self.work_tree.display()
            )));
        } else {
            info!("Cloning cache repository into {}", self.work_tree.display());
            if let Some(parent) = self.work_tree.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    CicacheError::io(format!("creating {}", parent.display()), e)
                })?;
            }
            let dest = self.work_tree.to_string_lossy().into_owned();
            self.git
                .run_checked(None, &["clone", "--quiet", &self.remote, &dest])
                .await?;
        }

        self.git
            .run_checked(dir, &["config", "user.name", author_name])
            .await?;
        self.git
            .run_checked(dir, &["config", "user.email", author_email])
            .await?;
        Ok(())
    }

    async fn try_put(&self, key: &CacheKey, value: &str) -> CicacheResult<PutOutcome> {
        if key.is_empty() {
            return Err(CicacheError::User("empty cache key".to_string()));
        }

        let rel = key.encode();
        let path = self.work_tree.join(key.relative_path());
        let dir = Some(self.work_tree.as_path());

        let unchanged = match fs::read_to_string(&path).await {
            Ok(existing) => normalize_value(&existing) == value,
            Err(_) => false,
        };

        if unchanged {
            debug!("{} already holds this value", rel);
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    CicacheError::io(format!("creating {}", parent.display()), e)
                })?;
            }
            fs::write(&path, format!("{}\n", value))
                .await
                .map_err(|e| CicacheError::io(format!("writing {}", path.display()), e))?;

            self.git.run_checked(dir, &["add", "--", &rel]).await?;
            let message = format!("{}: {}", rel, value);
            self.git
                .run_checked(dir, &["commit", "--quiet", "-m", &message])
                .await?;
        }

        if self.push().await? {
            return Ok(PutOutcome::Committed);
        }

        debug!("Push of {} rejected, merging remote {}", rel, self.branch);
        let pull = self
            .git
            .run(
                dir,
                &["pull", "--quiet", "--no-rebase", "--no-edit", "origin", &self.branch],
            )
            .await?;
        if !pull.success {
            warn!("Merging remote cache failed: {}", pull.stderr.trim());
            return Ok(PutOutcome::Lost);
        }

        if self.push().await? {
            Ok(PutOutcome::Committed)
        } else {
            Ok(PutOutcome::Lost)
        }
    }

    async fn push(&self) -> CicacheResult<bool> {
        let refspec = format!("HEAD:{}", self.branch);
        let output = self
            .git
            .run(
                Some(self.work_tree.as_path()),
                &["push", "--quiet", "origin", &refspec],
            )
            .await?;
        if !output.success {
            debug!("git push failed: {}", output.stderr.trim());
        }
        Ok(output.success)
    }
}

async fn is_empty_dir(path: &Path) -> CicacheResult<bool> {
    let mut entries = fs::read_dir(path)
        .await
        .map_err(|e| CicacheError::io(format!("reading {}", path.display()), e))?;
    let first = entries
        .next_entry()
        .await
        .map_err(|e| CicacheError::io(format!("reading {}", path.display()), e))?;
    Ok(first.is_none())
}

#[async_trait]
impl<G: GitRunner> CacheStore for GitCacheStore<G> {
    async fn get(&self, key: &CacheKey) -> CicacheResult<Option<String>> {
        if key.is_empty() {
            return Ok(None);
        }
        let path = self.work_tree.join(key.relative_path());
        if !path.is_file() {
            return Ok(None);
        }

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        let value = normalize_value(&raw);
        Ok((!value.is_empty()).then_some(value))
    }

    async fn put(&self, key: &CacheKey, value: &str) -> PutOutcome {
        match self.try_put(key, value).await {
            Ok(PutOutcome::Committed) => {
                info!("Recorded {} = {}", key, value);
                PutOutcome::Committed
            }
            Ok(PutOutcome::Lost) => {
                warn!("Cache write for {} lost after retry", key);
                PutOutcome::Lost
            }
            Err(e) => {
                warn!("Cache write for {} lost: {}", key, e);
                PutOutcome::Lost
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "git"
    }
}
