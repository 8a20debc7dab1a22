//! Outpost CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (application schema + session table)
//! outpost-cli migrate
//!
//! # Give an existing account a role
//! outpost-cli user promote -e admin@example.com -r admin
//!
//! # Switch maintenance mode
//! outpost-cli maintenance on
//! outpost-cli maintenance off
//! outpost-cli maintenance status
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "outpost-cli")]
#[command(author, version, about = "Outpost CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Switch maintenance mode
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Change the role of an existing account
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New role (`user`, `moderator`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[derive(Subcommand)]
enum MaintenanceAction {
    /// Turn maintenance mode on
    On,
    /// Turn maintenance mode off
    Off,
    /// Show whether maintenance mode is on
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Promote { email, role } => {
                commands::user::promote(&email, &role).await?;
            }
        },
        Commands::Maintenance { action } => match action {
            MaintenanceAction::On => commands::maintenance::set(true).await?,
            MaintenanceAction::Off => commands::maintenance::set(false).await?,
            MaintenanceAction::Status => commands::maintenance::status().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_promote() {
        let cli = Cli::try_parse_from(["outpost-cli", "user", "promote", "-e", "a@b.co"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Promote { role, .. }
            }) if role == "admin"
        ));
    }
}
