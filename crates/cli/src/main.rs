//! TeaInn CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! teainn-cli migrate
//!
//! # Load the demo catalog (safe to re-run)
//! teainn-cli seed
//! teainn-cli seed --file path/to/data.yaml
//!
//! # Create an admin account (password from --password or ADMIN_PASSWORD)
//! teainn-cli admin create -u manager -n "店長"
//!
//! # Rotate a password
//! teainn-cli admin set-password manager --password '...'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert demo data by slug/key
//! - `admin create` / `admin set-password` - Manage admin accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "teainn-cli")]
#[command(author, version, about = "TeaInn CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert or refresh the demo catalog and page content
    Seed {
        /// YAML file with the data to load (default: bundled demo data)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Password (at least 8 characters)
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Replace an admin's password
    SetPassword {
        /// Login name
        username: String,

        /// New password (at least 8 characters)
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // .env may supply ADMIN_PASSWORD for `admin create`
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                name,
                password,
            } => {
                commands::admin::create(&username, name.as_deref(), &password).await?;
            }
            AdminAction::SetPassword { username, password } => {
                commands::admin::set_password(&username, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_file_is_optional() {
        let cli = Cli::try_parse_from(["teainn-cli", "seed"]).unwrap();
        match cli.command {
            Commands::Seed { file } => assert!(file.is_none()),
            _ => panic!("expected seed command"),
        }
    }

    #[test]
    fn test_set_password_takes_positional_username() {
        let cli = Cli::try_parse_from([
            "teainn-cli",
            "admin",
            "set-password",
            "manager",
            "--password",
            "oolong-2025",
        ])
        .unwrap();
        match cli.command {
            Commands::Admin {
                action: AdminAction::SetPassword { username, password },
            } => {
                assert_eq!(username, "manager");
                assert_eq!(password, "oolong-2025");
            }
            _ => panic!("expected admin set-password"),
        }
    }
}
