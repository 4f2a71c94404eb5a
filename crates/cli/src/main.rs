//! `PlantNet` CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! plantnet-cli migrate
//!
//! # Promote an existing or new user to admin
//! plantnet-cli admin promote -e admin@example.com -r admin
//!
//! # Load sample listings
//! plantnet-cli seed -f crates/cli/seed/plants.yaml
//! ```
//!
//! All commands read `PLANTNET_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "plantnet-cli")]
#[command(author, version, about = "PlantNet CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert sample plants from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long, default_value = "crates/cli/seed/plants.yaml")]
        file: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Set a user's role, creating the user if needed
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// Role (`customer`, `seller`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
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
        Commands::Admin { action } => match action {
            AdminAction::Promote { email, role } => {
                commands::admin::promote(&email, &role).await?;
            }
        },
        Commands::Seed { file } => commands::seed::plants(&file).await?,
    }
    Ok(())
}
