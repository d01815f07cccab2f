//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Customer Manager - customer records API with branch-scoped visibility
#[derive(Parser, Debug)]
#[command(name = "customer-manager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file replacing the built-in group/city access tables
    #[arg(short, long, global = true, env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage principals
    Users(UsersArgs),
}

/// Arguments for the serve command. Unset values fall back to the environment.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back
        #[arg(short, long, default_value_t = 1)]
        steps: u32,
    },
    /// Show migration status
    Status,
    /// Drop everything and re-run all migrations
    Fresh,
}

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

/// Principal management actions
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// Create a principal with group memberships
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Plain text password (minimum 8 characters)
        #[arg(short, long, env = "NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Group names, comma separated, in membership order
        #[arg(short, long, value_delimiter = ',')]
        groups: Vec<String>,
    },
}
