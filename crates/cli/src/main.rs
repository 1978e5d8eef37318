//! Larder CLI - database migrations and shop management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! larder migrate
//!
//! # Create an admin account (password from -p or LARDER_ADMIN_PASSWORD)
//! larder admin create -e owner@larder.shop -n "Shop Owner" -r super_admin
//!
//! # List admin accounts
//! larder admin list
//!
//! # Load the demo catalog into an empty database
//! larder seed
//! ```
//!
//! Every command reads `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "larder")]
#[command(author, version, about = "Larder CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load demo categories, products, combos and storefront content
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`super_admin`, `admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Initial password
        #[arg(short, long, env = "LARDER_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List admin users
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::admin::create_user(&email, &name, &role, &password).await?;
            }
            AdminAction::List => commands::admin::list_users().await?,
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_parses_flags() {
        let cli = Cli::try_parse_from([
            "larder", "admin", "create", "-e", "ops@larder.shop", "-n", "Ops", "-r", "viewer",
            "-p", "brine-and-dill",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Create { ref role, .. }
            }) if role == "viewer"
        ));
    }
}
