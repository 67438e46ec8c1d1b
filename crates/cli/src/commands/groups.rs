use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use strato_client::ApiSession;

use crate::cli::GroupsCommand;
use crate::output;

const GROUP_FIELDS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("Name", "name"),
    ("Description", "description"),
    ("Active?", "is_active"),
    ("Created At", "created_at"),
    ("Domain Name", "domain_name"),
];

fn field_keys() -> Vec<&'static str> {
    GROUP_FIELDS.iter().map(|(_, key)| *key).collect()
}

pub async fn run(session: &ApiSession, cmd: GroupsCommand, json: bool) -> Result<()> {
    match cmd {
        GroupsCommand::Add {
            domain_name,
            name,
            description,
            inactive,
        } => add(session, &domain_name, &name, &description, inactive, json).await,
        GroupsCommand::Update {
            gid,
            name,
            description,
            is_active,
        } => {
            update(
                session,
                &gid,
                name.as_deref(),
                description.as_deref(),
                is_active,
                json,
            )
            .await
        }
        GroupsCommand::Delete { gid } => delete(session, &gid, json).await,
        GroupsCommand::AddUsers { gid, user_uuids } => {
            add_users(session, &gid, &user_uuids, json).await
        }
        GroupsCommand::RemoveUsers { gid, user_uuids } => {
            remove_users(session, &gid, &user_uuids, json).await
        }
    }
}

pub async fn show(session: &ApiSession, gid: &str, json: bool) -> Result<()> {
    let sp = if !json {
        Some(output::spinner("Fetching group detail..."))
    } else {
        None
    };
    let resp = session.group().detail(gid, &field_keys()).await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    let Some(detail) = resp else {
        anyhow::bail!("There is no such group.");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    output::print_header(&format!("Group {gid}"));
    let rows: Vec<(String, String)> = GROUP_FIELDS
        .iter()
        .filter(|(_, key)| detail.contains_key(*key))
        .map(|(label, key)| (label.to_string(), output::cell(detail.get(*key))))
        .collect();
    output::print_kv_table(&rows);
    println!();
    Ok(())
}

pub async fn list(session: &ApiSession, domain_name: Option<&str>, json: bool) -> Result<()> {
    let Some(domain_name) = domain_name else {
        anyhow::bail!(
            "Domain name should be given with the \"-d\" option. \
             Run \"strato groups --help\" for details."
        );
    };

    let sp = if !json {
        Some(output::spinner("Loading groups..."))
    } else {
        None
    };
    let groups = session.group().list(domain_name, &field_keys()).await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    output::print_header(&format!("Groups in domain {domain_name}"));
    if groups.is_empty() {
        println!("  {}", "There is no group.".dimmed());
        println!();
        return Ok(());
    }

    output::print_record_table(GROUP_FIELDS, &groups);
    println!();
    Ok(())
}

async fn add(
    session: &ApiSession,
    domain_name: &str,
    name: &str,
    description: &str,
    inactive: bool,
    json: bool,
) -> Result<()> {
    let sp = if !json {
        Some(output::spinner("Creating group..."))
    } else {
        None
    };
    let data = session
        .group()
        .create(domain_name, name, description, !inactive)
        .await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    let payload = data.expect_ok("Group creation has failed")?;
    let created = payload.get("group");
    let created_name = created
        .and_then(|g| g.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(name);
    let created_domain = created
        .and_then(|g| g.get("domain_name"))
        .and_then(Value::as_str)
        .unwrap_or(domain_name);
    println!(
        "  {} Group name {} is created in domain {}.",
        "✓".green().bold(),
        created_name.bold(),
        created_domain.bold()
    );
    Ok(())
}

async fn update(
    session: &ApiSession,
    gid: &str,
    name: Option<&str>,
    description: Option<&str>,
    is_active: Option<bool>,
    json: bool,
) -> Result<()> {
    let sp = if !json {
        Some(output::spinner("Updating group..."))
    } else {
        None
    };
    let data = session
        .group()
        .update(gid, name, description, is_active)
        .await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    data.expect_ok("Group update has failed")?;
    println!("  {} Group {} is updated.", "✓".green().bold(), gid.bold());
    Ok(())
}

async fn delete(session: &ApiSession, gid: &str, json: bool) -> Result<()> {
    let sp = if !json {
        Some(output::spinner("Deleting group..."))
    } else {
        None
    };
    let data = session.group().delete(gid).await?;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    data.expect_ok("Group deletion has failed")?;
    println!("  {} Group is deleted: {}.", "✓".green().bold(), gid.bold());
    Ok(())
}

async fn add_users(
    session: &ApiSession,
    gid: &str,
    user_uuids: &[String],
    json: bool,
) -> Result<()> {
    let data = session.group().add_users(gid, user_uuids).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    data.expect_ok("Error on adding users to group")?;
    println!(
        "  {} {} user(s) are added to group {}.",
        "✓".green().bold(),
        user_uuids.len(),
        gid.bold()
    );
    Ok(())
}

async fn remove_users(
    session: &ApiSession,
    gid: &str,
    user_uuids: &[String],
    json: bool,
) -> Result<()> {
    let data = session.group().remove_users(gid, user_uuids).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    data.expect_ok("Error on removing users from group")?;
    println!(
        "  {} {} user(s) are removed from group {}.",
        "✓".green().bold(),
        user_uuids.len(),
        gid.bold()
    );
    Ok(())
}
