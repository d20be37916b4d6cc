//! Oakline CLI - storefront sessions and admin console from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as a customer and look at the cached profile
//! oak login -e a@b.com
//! oak whoami
//!
//! # Sign in to the admin console and browse products
//! oak --scope admin login -e admin@oakline.example
//! oak --scope admin admin list products
//!
//! # End the session
//! oak logout
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` - Session lifecycle
//! - `status` - Local session state
//! - `whoami` - Cached (or `--remote`) profile
//! - `profile update` - Partial profile update
//! - `admin list|get|delete` - Admin resources
//!
//! Logging goes to stderr and honours `RUST_LOG` (default: info).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use oakline_admin::ResourceKind;
use oakline_core::AccessScope;
use oakline_session::ProfileChanges;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "oak")]
#[command(author, version, about = "Oakline storefront and admin console client")]
struct Cli {
    /// Which session to use (`customer` or `admin`); defaults to OAKLINE_SCOPE
    #[arg(long, global = true)]
    scope: Option<AccessScope>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "OAKLINE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "OAKLINE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        password_confirmation: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Delivery address
        #[arg(long)]
        address: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the local session state
    Status,
    /// Show the signed-in user's profile
    Whoami {
        /// Fetch the profile from the service instead of the local cache
        #[arg(long)]
        remote: bool,
    },
    /// Manage the signed-in user's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage admin console resources
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update one or more profile fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List records of a resource
    List {
        /// Resource name (e.g. products, location-costs)
        resource: ResourceKind,

        /// Filter as key=value; may be repeated
        #[arg(long = "where", value_parser = commands::admin::parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Show one record
    Get {
        /// Resource name
        resource: ResourceKind,
        /// Record ID
        id: i64,
    },
    /// Delete one record
    Delete {
        /// Resource name
        resource: ResourceKind,
        /// Record ID
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env(cli.scope)?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = commands::resolve_password(password)?;
            commands::session::login(&ctx, &email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            password_confirmation,
            phone,
            address,
        } => {
            let args = commands::session::RegisterArgs {
                name,
                email,
                password: commands::resolve_password(password)?,
                password_confirmation: password_confirmation.map(Into::into),
                phone,
                address,
            };
            commands::session::register(&ctx, args).await?;
        }
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Status => commands::session::status(&ctx).await,
        Commands::Whoami { remote } => commands::session::whoami(&ctx, remote).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Update {
                name,
                email,
                phone,
                address,
            } => {
                let changes = ProfileChanges {
                    name,
                    email,
                    phone,
                    address,
                };
                commands::session::update_profile(&ctx, changes).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::List { resource, filters } => {
                commands::admin::list(&ctx, resource, &filters).await?;
            }
            AdminAction::Get { resource, id } => commands::admin::get(&ctx, resource, id).await?,
            AdminAction::Delete { resource, id } => {
                commands::admin::delete(&ctx, resource, id).await?;
            }
        },
    }
    Ok(())
}
