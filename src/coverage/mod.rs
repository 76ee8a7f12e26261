//! Coverage regression gate
//!
//! Compares the current coverage total against the baseline recorded for
//! the trunk branch and records improvements made on the trunk itself.
//!
//! | Baseline | Branch | Outcome |
//! |----------|--------|---------|
//! | absent | other | skip |
//! | absent | trunk | pass, record unless pull request |
//! | present, current lower | any | fail |
//! | present, current higher | trunk | pass, record unless pull request |
//! | present, otherwise | any | pass |

pub mod report;

pub use report::parse_total_percent;

use crate::cache::{CacheKey, CacheStore, PutOutcome};
use crate::error::CicacheResult;
use std::fmt;
use tracing::{info, warn};

/// Gate verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// Nothing to compare against
    Skip,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Full result of a gate evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub verdict: Verdict,
    pub current: u8,
    pub baseline: Option<u8>,
    /// Set when a new baseline was written
    pub recorded: Option<PutOutcome>,
}

/// Branch facts the gate needs
#[derive(Debug, Clone)]
pub struct GateInput<'a> {
    pub current: u8,
    pub branch: &'a str,
    pub pull_request: bool,
}

/// Coverage gate over a cache store
pub struct CoverageGate<'a, S: CacheStore + ?Sized> {
    store: &'a S,
    identity: CacheKey,
    trunk: String,
}

impl<'a, S: CacheStore + ?Sized> CoverageGate<'a, S> {
    /// Gate for the coverage record under `identity` (e.g. `coverage, org/repo`)
    pub fn new(store: &'a S, identity: CacheKey, trunk: impl Into<String>) -> Self {
        Self {
            store,
            identity,
            trunk: trunk.into(),
        }
    }

    /// Key of the trunk baseline record
    pub fn record_key(&self) -> CacheKey {
        self.identity.child(self.trunk.as_str())
    }

    /// Evaluate the gate, recording a new baseline where appropriate
    pub async fn evaluate(&self, input: &GateInput<'_>) -> CicacheResult<GateOutcome> {
        let key = self.record_key();
        let on_trunk = input.branch == self.trunk;
        let baseline = self.baseline(&key).await?;

        let mut outcome = GateOutcome {
            verdict: Verdict::Pass,
            current: input.current,
            baseline,
            recorded: None,
        };

        match baseline {
            None if !on_trunk => {
                outcome.verdict = Verdict::Skip;
                return Ok(outcome);
            }
            Some(baseline) if input.current < baseline => {
                outcome.verdict = Verdict::Fail;
                return Ok(outcome);
            }
            _ => {}
        }

        let improved = baseline.map_or(true, |b| input.current > b);
        if on_trunk && !input.pull_request && improved {
            info!(
                "Recording {} coverage {}% (was {:?})",
                self.trunk, input.current, baseline
            );
            let written = self.store.put(&key, &input.current.to_string()).await;
            outcome.recorded = Some(written);
        }

        Ok(outcome)
    }

    async fn baseline(&self, key: &CacheKey) -> CicacheResult<Option<u8>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match raw.trim().parse::<u8>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!("Ignoring unreadable coverage baseline at {}: {:?}", key, raw);
                Ok(None)
            }
        }
    }
}
