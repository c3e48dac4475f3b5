//! Kasir CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! kasir migrate
//!
//! # Create a user (password from -p or KASIR_USER_PASSWORD)
//! kasir user create -e owner@example.com -n "Owner" -r admin
//!
//! # Create the cash-on-hand row
//! kasir cash init --nominal 500000
//!
//! # Load products from YAML
//! kasir seed products menu.yaml --owner owner@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "kasir")]
#[command(author, version, about = "Kasir CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage the cash-on-hand balance
    Cash {
        #[command(subcommand)]
        action: CashAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `cashier`)
        #[arg(short, long, default_value = "cashier")]
        role: String,

        /// Password
        #[arg(short, long, env = "KASIR_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum CashAction {
    /// Create the cash row if none exists
    Init {
        /// Opening balance
        #[arg(long, default_value = "0")]
        nominal: Decimal,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML list
    Products {
        /// Path to the YAML file
        file: String,

        /// Email of the user recorded as creator
        #[arg(long)]
        owner: Option<String>,
    },
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, &role, &password).await?;
            }
        },
        Commands::Cash { action } => match action {
            CashAction::Init { nominal } => commands::cash::init(nominal).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, owner } => {
                commands::seed::products(&file, owner.as_deref()).await?;
            }
        },
    }
    Ok(())
}
