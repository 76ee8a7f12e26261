//! Coverage command - gate the build on the trunk coverage baseline

use super::attach_store;
use crate::cache::{CacheKey, PutOutcome};
use crate::ci::CiContext;
use crate::cli::args::CoverageArgs;
use crate::config::Config;
use crate::coverage::report::{read_report, run_report_command};
use crate::coverage::{parse_total_percent, CoverageGate, GateInput, GateOutcome, Verdict};
use crate::error::{CicacheError, CicacheResult};
use crate::journal::Journal;
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the coverage command
pub async fn execute(args: CoverageArgs, config: &Config) -> CicacheResult<()> {
    let ctx = UiContext::detect();
    let journal = Journal::new(config);
    let ci = args.ci.context();
    let identity = identity_for(&args.identity, &ci, config)?;

    ui::section(&ctx, "Coverage");

    // The report is checked before touching the cache: an unreadable report
    // is a configuration problem, not a regression.
    let report = match &args.report {
        Some(path) => read_report(path).await,
        None => run_report_command(&config.coverage.command).await,
    };
    let current = match report.and_then(|r| parse_total_percent(&r)) {
        Ok(current) => current,
        Err(e) => {
            ui::step_error_detail(&ctx, "Coverage report unreadable", &e.to_string());
            return Err(e);
        }
    };

    let store = attach_store(config, &ctx, false).await?;
    let gate = CoverageGate::new(&store, identity, config.coverage.trunk.as_str());
    let outcome = gate
        .evaluate(&GateInput {
            current,
            branch: &ci.branch,
            pull_request: ci.pull_request,
        })
        .await?;

    journal
        .record(
            "gate.verdict",
            &json!({
                "key": gate.record_key().encode(),
                "branch": ci.branch,
                "pull_request": ci.pull_request,
                "verdict": outcome.verdict.to_string(),
                "current": outcome.current,
                "baseline": outcome.baseline,
            }),
        )
        .await;

    report_outcome(&ctx, &journal, &outcome, &config.coverage.trunk).await
}

fn identity_for(tokens: &[String], ci: &CiContext, config: &Config) -> CicacheResult<CacheKey> {
    if !tokens.is_empty() {
        return Ok(CacheKey::new(tokens.iter().cloned()));
    }
    if ci.repo.is_empty() {
        return Err(CicacheError::User(
            "Coverage needs --repo (or TRAVIS_REPO_SLUG) or --identity".to_string(),
        ));
    }
    Ok(CacheKey::new([
        config.coverage.key_prefix.as_str(),
        ci.repo.as_str(),
    ]))
}

async fn report_outcome(
    ctx: &UiContext,
    journal: &Journal,
    outcome: &GateOutcome,
    trunk: &str,
) -> CicacheResult<()> {
    match (outcome.verdict, outcome.baseline) {
        (Verdict::Fail, Some(baseline)) => {
            ui::step_error_detail(
                ctx,
                "Coverage regression",
                &format!("{}% < {} baseline {}%", outcome.current, trunk, baseline),
            );
            Err(CicacheError::CoverageRegression {
                current: outcome.current,
                baseline,
            })
        }
        (Verdict::Fail, None) => unreachable!("the gate only fails against a baseline"),
        (Verdict::Skip, _) => {
            ui::step_warn_hint(
                ctx,
                &format!("Coverage {}%: no {} baseline to compare", outcome.current, trunk),
                "gate skipped",
            );
            Ok(())
        }
        (Verdict::Pass, baseline) => {
            let detail = baseline.map_or_else(
                || format!("no {} baseline yet", trunk),
                |b| format!("{} baseline {}%", trunk, b),
            );
            ui::step_ok_detail(ctx, &format!("Coverage {}%", outcome.current), &detail);

            match outcome.recorded {
                Some(PutOutcome::Committed) => {
                    ui::step_info(ctx, &format!("Recorded new {} baseline", trunk));
                }
                Some(PutOutcome::Lost) => {
                    ui::step_warn(ctx, "New baseline could not be recorded");
                    journal
                        .record("cache.write_lost", &json!({ "current": outcome.current }))
                        .await;
                }
                None => {}
            }
            Ok(())
        }
    }
}
