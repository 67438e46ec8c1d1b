use clap::Parser;
use strato_cli::{cli, commands, error};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    if let Err(e) = commands::dispatch(cli).await {
        error::display_error(&e);
        std::process::exit(1);
    }
}
