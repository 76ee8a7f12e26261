//! Status command - check git and the cache remote

use crate::config::Config;
use crate::error::{CicacheError, CicacheResult};
use crate::git::{GitRunner, SystemGit};
use crate::ui::UiContext;
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(config: &Config) -> CicacheResult<()> {
    println!("{}", style("cicache status").bold().cyan());
    println!();

    let mut all_ok = check_git().await;
    if all_ok {
        all_ok &= check_remote(config).await;
    }
    show_environment(config);

    println!();
    if all_ok {
        println!("{}", style("All checks passed").green().bold());
        Ok(())
    } else {
        Err(CicacheError::User(
            "Some checks failed - see above for details".to_string(),
        ))
    }
}

async fn check_git() -> bool {
    println!("{}", style("Git:").bold());

    if !SystemGit::is_installed().await {
        println!(
            "  {} {} - install git and make sure it is on PATH",
            CROSS,
            style("Not installed").red()
        );
        return false;
    }

    match SystemGit::new().run(None, &["--version"]).await {
        Ok(out) => println!("  {} {}", CHECK, style(out.stdout.trim()).green()),
        Err(_) => println!("  {} {}", CHECK, style("Installed").green()),
    }
    true
}

async fn check_remote(config: &Config) -> bool {
    println!();
    println!("{}", style("Cache remote:").bold());

    let remote = config.cache.remote.as_str();
    if remote.is_empty() {
        println!(
            "  {} {} - set cache.remote, --remote or CICACHE_REMOTE",
            CROSS,
            style("Not configured").red()
        );
        return false;
    }
    println!("  {} {}", CHECK, remote);

    let branch = config.cache.branch.as_str();
    let heads = SystemGit::new()
        .run(None, &["ls-remote", "--heads", remote, branch])
        .await;
    match heads {
        Ok(out) if out.success && !out.stdout.trim().is_empty() => {
            println!("  {} Branch {} reachable", CHECK, style(branch).green());
            true
        }
        Ok(out) if out.success => {
            println!(
                "  {} Branch {} missing - push an initial commit to it",
                WARN,
                style(branch).yellow()
            );
            false
        }
        Ok(out) => {
            println!(
                "  {} {} - {}",
                CROSS,
                style("Unreachable").red(),
                out.stderr.trim()
            );
            false
        }
        Err(e) => {
            println!("  {} {} - {}", CROSS, style("Error").red(), e);
            false
        }
    }
}

fn show_environment(config: &Config) {
    println!();
    println!("{}", style("Environment:").bold());
    println!("  Cache dir: {}", config.cache.work_tree().display());
    match UiContext::detect().ci_provider() {
        Some(provider) => println!("  CI: {}", provider),
        None => println!("  CI: none detected"),
    }
}
