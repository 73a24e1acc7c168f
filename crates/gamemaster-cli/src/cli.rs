//! Command-line arguments.
//!
//! - `register` / `login` / `logout` / `whoami` / `profile` - accounts
//! - `login-federated` / `link-federated` - ID token sign-in
//! - `progress`, `favorites`, `recent`, `catalog` - portal data
//! - `play <title>` - run a game tracker driven by stdin

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gamemaster")]
#[command(author, version, about = "The Game Master local portal", long_about = None)]
pub struct Cli {
    /// Directory holding gamemaster.db
    #[arg(long, env = "GAMEMASTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON game catalog (default: built-in)
    #[arg(long, env = "GAMEMASTER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a local account and log in
    Register {
        username: String,
        password: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// Log in with username, email or user id
    Login { identifier: String, password: String },

    /// Log in with a federated ID token
    LoginFederated {
        #[arg(long)]
        token: String,
    },

    /// Link a federated ID token to the current local account
    LinkFederated {
        #[arg(long)]
        token: String,
    },

    Logout,

    /// Show the current user
    Whoami,

    /// Show the profile summary
    Profile,

    #[command(subcommand)]
    Progress(ProgressCommands),

    #[command(subcommand)]
    Catalog(CatalogCommands),

    #[command(subcommand)]
    Favorites(FavoritesCommands),

    #[command(subcommand)]
    Recent(RecentCommands),

    /// Play a game; reads tracker commands from stdin
    Play { title: String },
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// Saved progress for every game
    Show,
    /// Delete all saved progress
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    Categories,
    List {
        /// "All", "Favorites" or a category name
        #[arg(short, long, default_value = "All")]
        category: String,
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommands {
    List,
    Toggle { title: String },
}

#[derive(Subcommand, Debug)]
pub enum RecentCommands {
    List,
    /// Record a game as just played
    Play { title: String },
    Remove { title: String },
}
