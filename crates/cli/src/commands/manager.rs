use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use strato_client::ApiSession;

use crate::cli::{ManagerCommand, SchedulerCommand};
use crate::output;

/// Interval between status polls while `freeze --wait` drains sessions.
pub const FREEZE_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub async fn run(session: &ApiSession, cmd: ManagerCommand, json: bool) -> Result<()> {
    match cmd {
        ManagerCommand::Status => status(session, json).await,
        ManagerCommand::Freeze { wait, force_kill } => {
            freeze(session, wait, force_kill, FREEZE_POLL_INTERVAL).await
        }
        ManagerCommand::Unfreeze => unfreeze(session, json).await,
        ManagerCommand::Scheduler(cmd) => scheduler(session, cmd, json).await,
    }
}

async fn status(session: &ApiSession, json: bool) -> Result<()> {
    let sp = if !json {
        Some(output::spinner("Fetching manager status..."))
    } else {
        None
    };
    let resp = session.manager().status().await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    output::print_header("Manager Status");
    let row = json!({
        "status": resp.status,
        "active_sessions": resp.active_sessions,
    });
    let row = row.as_object().cloned().unwrap_or_default();
    output::print_record_table(
        &[("Status", "status"), ("Active Sessions", "active_sessions")],
        &[row],
    );
    println!();
    Ok(())
}

/// Freeze the manager. `poll_interval` is injected so tests can drive the
/// `--wait` loop without real three-second sleeps.
pub async fn freeze(
    session: &ApiSession,
    wait: bool,
    force_kill: bool,
    poll_interval: Duration,
) -> Result<()> {
    if wait && force_kill {
        eprintln!(
            "  {} You cannot use both --wait and --force-kill options at the same time.",
            "⚠".yellow()
        );
        return Ok(());
    }

    if wait {
        loop {
            let resp = session.manager().status().await?;
            if resp.active_sessions == 0 {
                break;
            }
            println!(
                "  {} Waiting for all sessions to terminate... ({} left)",
                "…".dimmed(),
                resp.active_sessions
            );
            tokio::time::sleep(poll_interval).await;
        }
        println!("  {} All sessions are terminated.", "✓".green().bold());
    }

    if force_kill {
        println!("  {} Killing all sessions...", "…".dimmed());
    }

    session.manager().freeze(force_kill).await?;

    if force_kill {
        println!("  {} All sessions are killed.", "✓".green().bold());
    }

    println!("  {} Manager is successfully frozen.", "✓".green().bold());
    Ok(())
}

async fn unfreeze(session: &ApiSession, json: bool) -> Result<()> {
    session.manager().unfreeze().await?;
    if json {
        println!("{}", json!({ "frozen": false }));
        return Ok(());
    }
    println!("  {} Manager is successfully unfrozen.", "✓".green().bold());
    Ok(())
}

async fn scheduler(session: &ApiSession, cmd: SchedulerCommand, json: bool) -> Result<()> {
    match cmd {
        SchedulerCommand::IncludeAgents { agent_ids } => {
            session
                .manager()
                .scheduler_op("include-agents", &agent_ids)
                .await?;
            if json {
                println!("{}", json!({ "included": agent_ids }));
                return Ok(());
            }
            println!(
                "  {} The given agents now accept new sessions.",
                "✓".green().bold()
            );
        }
        SchedulerCommand::ExcludeAgents { agent_ids } => {
            session
                .manager()
                .scheduler_op("exclude-agents", &agent_ids)
                .await?;
            if json {
                println!("{}", json!({ "excluded": agent_ids }));
                return Ok(());
            }
            println!(
                "  {} The given agents will no longer start new sessions.",
                "✓".green().bold()
            );
        }
    }
    Ok(())
}
