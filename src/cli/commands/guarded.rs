//! Test and deploy commands - run an action once per commit

use super::attach_store;
use crate::action::{render_command, run_command};
use crate::cache::{CacheKey, PutOutcome};
use crate::ci::CiContext;
use crate::cli::args::{DeployArgs, TestArgs};
use crate::config::Config;
use crate::error::{CicacheError, CicacheResult};
use crate::guard::{run_once, RunOutcome};
use crate::journal::Journal;
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the test command
pub async fn test(args: TestArgs, config: &Config) -> CicacheResult<()> {
    if args.key_label.trim().is_empty() {
        return Err(CicacheError::User("Key label must not be empty".to_string()));
    }
    let ci = args.ci.context();
    require_commit(&ci)?;

    let command = if args.command.is_empty() {
        config.actions.test.clone()
    } else {
        args.command
    };

    guarded_run(config, &ci, ci.tested_key(&args.key_label), "Tests", &command).await
}

/// Execute the deploy command
pub async fn deploy(args: DeployArgs, config: &Config) -> CicacheResult<()> {
    if args.mode.trim().is_empty() {
        return Err(CicacheError::User("Deploy mode must not be empty".to_string()));
    }
    let ci = args.ci.context();
    require_commit(&ci)?;

    let command = if args.command.is_empty() {
        render_command(&config.actions.deploy, &args.mode)
    } else {
        args.command
    };

    let label = format!("Deploy ({})", args.mode);
    guarded_run(config, &ci, ci.deployed_key(&args.mode), &label, &command).await
}

fn require_commit(ci: &CiContext) -> CicacheResult<()> {
    if ci.commit.is_empty() {
        return Err(CicacheError::User(
            "No commit given: pass --commit or set TRAVIS_COMMIT".to_string(),
        ));
    }
    if ci.repo.is_empty() {
        return Err(CicacheError::User(
            "No repository given: pass --repo or set TRAVIS_REPO_SLUG".to_string(),
        ));
    }
    Ok(())
}

async fn guarded_run(
    config: &Config,
    ci: &CiContext,
    key: CacheKey,
    label: &str,
    command: &[String],
) -> CicacheResult<()> {
    let ctx = UiContext::detect();
    let journal = Journal::new(config);

    ui::section(&ctx, label);
    ui::key_value(&ctx, "Build", &ci.to_string());

    let store = attach_store(config, &ctx, false).await?;
    let reference = ci.result_reference(&config.ci.job_url_base);
    let outcome = run_once(&store, &key, &reference, || run_command(command)).await;

    match outcome {
        Ok(RunOutcome::Skipped(prior)) => {
            ui::step_ok_detail(&ctx, &format!("{} already done", label), &prior);
            journal
                .record("guard.skipped", &json!({ "key": key.encode(), "prior": prior }))
                .await;
        }
        Ok(RunOutcome::Executed { recorded }) => {
            ui::step_ok(&ctx, &format!("{} succeeded", label));
            journal
                .record(
                    "guard.executed",
                    &json!({ "key": key.encode(), "reference": reference }),
                )
                .await;
            if recorded == PutOutcome::Lost {
                ui::step_warn_hint(
                    &ctx,
                    "Result could not be recorded",
                    "a later build of this commit will run again",
                );
                journal
                    .record("cache.write_lost", &json!({ "key": key.encode() }))
                    .await;
            }
        }
        Err(e) => {
            ui::step_error_detail(&ctx, &format!("{} failed", label), &e.to_string());
            return Err(e);
        }
    }

    Ok(())
}
