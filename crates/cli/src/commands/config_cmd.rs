use anyhow::Result;
use colored::Colorize;
use strato_client::ApiConfig;

use crate::cli::ConfigCommand;

pub fn run(cmd: ConfigCommand, config: &ApiConfig) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(config),
        ConfigCommand::Set { key, value } => set(&key, &value),
    }
}

fn show(config: &ApiConfig) -> Result<()> {
    let path = ApiConfig::path()?;

    println!();
    println!("  {}", "Configuration".bold());
    println!("  {}", "─".repeat(36).dimmed());
    println!("  {}           {}", "file:".dimmed(), path.display());
    println!("  {}       {}", "endpoint:".dimmed(), config.endpoint);
    println!(
        "  {}  {}",
        "endpoint_type:".dimmed(),
        config.endpoint_type
    );
    println!(
        "  {}     {}",
        "access_key:".dimmed(),
        match &config.access_key {
            Some(k) if k.len() > 8 => format!("{}...{}", &k[..4], &k[k.len() - 4..]),
            Some(_) => "***".to_string(),
            None => "(not set)".dimmed().to_string(),
        }
    );
    println!();

    for var in ["STRATO_ENDPOINT", "STRATO_ENDPOINT_TYPE", "STRATO_ACCESS_KEY"] {
        if std::env::var(var).is_ok() {
            println!("  {} {var} environment variable is active", "ℹ".blue());
        }
    }

    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    ApiConfig::set(key, value)?;

    println!(
        "  {} {key} = {}",
        "✓".green().bold(),
        if key == "access_key" {
            "***".to_string()
        } else {
            value.to_string()
        }
    );
    Ok(())
}
