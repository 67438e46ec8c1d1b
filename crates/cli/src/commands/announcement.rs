use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Editor};
use serde_json::Value;
use strato_client::ApiSession;

use crate::cli::AnnouncementCommand;

const EDITOR_TEMPLATE: &str = "<!-- Use Markdown format to edit the announcement message -->";

pub async fn run(session: &ApiSession, cmd: AnnouncementCommand, json: bool) -> Result<()> {
    match cmd {
        AnnouncementCommand::Get => get(session, json).await,
        AnnouncementCommand::Update { message } => update(session, message).await,
        AnnouncementCommand::Delete => delete(session).await,
        AnnouncementCommand::Dismiss => dismiss(),
    }
}

async fn get(session: &ApiSession, json: bool) -> Result<()> {
    let announcement = session.manager().get_announcement().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&announcement)?);
        return Ok(());
    }

    if !announcement.enabled {
        println!("  {}", "No announcements.".dimmed());
        return Ok(());
    }

    let message = announcement.message.unwrap_or_default();
    println!("{message}");

    // Best-effort cache of the last shown announcement; `dismiss` edits it.
    if let Ok(path) = state_file() {
        let _ = record_shown(&path, &message);
    }
    Ok(())
}

async fn update(session: &ApiSession, message: Option<String>) -> Result<()> {
    let message = match message {
        Some(message) => message,
        None => match Editor::new().edit(EDITOR_TEMPLATE)? {
            Some(edited) if !edited.trim().is_empty() => edited,
            _ => anyhow::bail!("Cancelled."),
        },
    };

    session
        .manager()
        .update_announcement(true, Some(&message))
        .await?;
    println!("  {} Posted new announcement.", "✓".green().bold());
    Ok(())
}

async fn delete(session: &ApiSession) -> Result<()> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("  Delete the current announcement?")
        .default(false)
        .interact()?;
    if !confirmed {
        anyhow::bail!("Cancelled.");
    }

    session.manager().update_announcement(false, None).await?;
    println!("  {} Deleted announcement.", "✓".green().bold());
    Ok(())
}

fn dismiss() -> Result<()> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("  Do not show the last announcement again?")
        .default(false)
        .interact()?;
    if !confirmed {
        anyhow::bail!("Cancelled.");
    }

    dismiss_at(&state_file()?)?;
    println!(
        "  {} Dismissed the last shown announcement.",
        "✓".green().bold()
    );
    Ok(())
}

/// Local state file: <state dir>/strato/announcement.json
fn state_file() -> Result<PathBuf> {
    let state_dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .context("Cannot determine state directory")?
        .join("strato");
    Ok(state_dir.join("announcement.json"))
}

/// Mark the last shown announcement as dismissed, keeping any other keys in
/// the state file intact. A missing or unparseable file means no
/// announcement has been shown on this machine yet.
pub fn dismiss_at(path: &Path) -> Result<()> {
    let state = std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
    let Some(Value::Object(mut state)) = state else {
        anyhow::bail!("No announcements seen yet.");
    };

    state.insert("dismissed".to_string(), Value::Bool(true));
    std::fs::write(path, serde_json::to_string(&Value::Object(state))?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Record the announcement that was just shown. The dismissed flag survives
/// only while the message stays the same; a new message resets it.
pub fn record_shown(path: &Path, message: &str) -> Result<()> {
    let previous = std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
    let dismissed = matches!(
        &previous,
        Some(Value::Object(state))
            if state.get("message").and_then(Value::as_str) == Some(message)
                && state.get("dismissed").and_then(Value::as_bool) == Some(true)
    );

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let state = serde_json::json!({ "message": message, "dismissed": dismissed });
    std::fs::write(path, serde_json::to_string(&state)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
