pub mod announcement;
pub mod config_cmd;
pub mod groups;
pub mod manager;
pub mod resources;
pub mod sessions;

use anyhow::Result;
use strato_client::{ApiConfig, ApiSession};

use crate::cli::*;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = ApiConfig::load()?;
    let session = ApiSession::connect(&config);

    match cli.command {
        Commands::Group { gid } => groups::show(&session, &gid, cli.json).await,
        Commands::Groups {
            domain_name,
            command,
        } => match command {
            Some(cmd) => groups::run(&session, cmd, cli.json).await,
            None => groups::list(&session, domain_name.as_deref(), cli.json).await,
        },
        Commands::Sessions { status, access_key } => {
            sessions::list(&session, status, access_key.as_deref(), cli.json).await
        }
        Commands::Session { name } => sessions::show(&session, &name, cli.json).await,
        Commands::Manager(cmd) => manager::run(&session, cmd, cli.json).await,
        Commands::Announcement(cmd) => announcement::run(&session, cmd, cli.json).await,
        Commands::GetResources {
            scaling_group,
            group,
            all,
        } => resources::run(&session, &scaling_group, &group, all, cli.json).await,
        Commands::Config(cmd) => config_cmd::run(cmd, &config),
    }
}
