//! # gamemaster
//!
//! Command-line front end for The Game Master portal.  Every invocation opens
//! the local storage partition, runs one command against it and prints the
//! notifications the portal raised along the way.

mod cli;
mod notify;
mod play;

use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::broadcast::Receiver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gamemaster_client::state::{self, lock, SharedAuth};
use gamemaster_client::{AuthError, EventBus, PortalConfig, PortalEvent};
use gamemaster_shared::catalog::{Catalog, CategoryFilter, GameEntry};
use gamemaster_shared::identity::IdTokenProvider;

use crate::cli::{
    CatalogCommands, Cli, Commands, FavoritesCommands, ProgressCommands, RecentCommands,
};

const DEFAULT_LOG_FILTER: &str =
    "gamemaster=info,gamemaster_client=info,gamemaster_store=warn,warn";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 1. Initialize tracing (stderr, so command output stays clean)
    // -----------------------------------------------------------------------
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // -----------------------------------------------------------------------
    // 2. Configuration, storage and auth
    // -----------------------------------------------------------------------
    let mut config = PortalConfig::from_env();
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog.clone();
    }

    let events = EventBus::new();
    let mut rx = events.subscribe();

    let result = match open_portal(&config, events) {
        Ok(auth) => run(cli.command, &config, &auth, &mut rx).await,
        Err(e) => Err(e),
    };

    notify::drain(&mut rx);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // already shown as a notification
        Err(e) if e.downcast_ref::<AuthError>().is_some_and(is_user_facing) => {
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn open_portal(config: &PortalConfig, events: EventBus) -> anyhow::Result<SharedAuth> {
    let db = config
        .open_database()
        .context("failed to open local storage")?;
    info!(path = ?db.path(), "storage opened");
    Ok(state::shared(db, events)?)
}

fn is_user_facing(err: &AuthError) -> bool {
    !matches!(err, AuthError::Store(_) | AuthError::LockPoisoned)
}

async fn run(
    command: Commands,
    config: &PortalConfig,
    auth: &SharedAuth,
    rx: &mut Receiver<PortalEvent>,
) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            username,
            password,
            email,
        } => {
            lock(auth)?.register(&username, &password, email.as_deref())?;
        }

        Commands::Login {
            identifier,
            password,
        } => {
            lock(auth)?.authenticate(&identifier, &password)?;
        }

        Commands::LoginFederated { token } => {
            let provider =
                IdTokenProvider::new(token).with_audience(config.identity_audience.clone());
            lock(auth)?.login_federated(&provider)?;
        }

        Commands::LinkFederated { token } => {
            let provider =
                IdTokenProvider::new(token).with_audience(config.identity_audience.clone());
            lock(auth)?.link_federated(&provider)?;
        }

        Commands::Logout => lock(auth)?.logout()?,

        Commands::Whoami => match lock(auth)?.current_user() {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => println!("Not logged in."),
        },

        Commands::Profile => match lock(auth)?.profile() {
            Some(profile) => {
                println!("{} ({})", profile.username, profile.account_label);
                println!("Email:        {}", profile.email);
                println!("Joined:       {}", profile.join_date.format("%Y-%m-%d"));
                println!("Games played: {}", profile.games_played);
                println!("Favorites:    {}", profile.favorite_count);
                println!("Play time:    {} min", profile.play_minutes);
                for (game, p) in &profile.progress {
                    println!(
                        "  {game}: level {} score {} ({}s)",
                        p.snapshot.level, p.snapshot.score, p.snapshot.play_time
                    );
                }
            }
            None => println!("Not logged in."),
        },

        Commands::Progress(ProgressCommands::Show) => {
            let auth = lock(auth)?;
            if !auth.is_logged_in() {
                println!("Not logged in.");
                return Ok(());
            }
            match auth.all_progress() {
                Some(all) if !all.is_empty() => {
                    println!("{}", serde_json::to_string_pretty(all)?)
                }
                _ => println!("No saved progress."),
            }
        }

        Commands::Progress(ProgressCommands::Clear) => lock(auth)?.clear_all_progress()?,

        Commands::Catalog(CatalogCommands::Categories) => {
            for category in load_catalog(config)?.categories() {
                println!("{category}");
            }
        }

        Commands::Catalog(CatalogCommands::List { category, search }) => {
            let catalog = load_catalog(config)?;
            let favorites = lock(auth)?.database().favorite_titles()?;
            let filter = CategoryFilter::parse(&category);
            for game in catalog.filter(&filter, &search, favorites.as_slice()) {
                let star = if favorites.contains(&game.title) { "*" } else { " " };
                println!("{star} {:<20} {:<12} {}", game.title, game.category, game.url);
            }
        }

        Commands::Favorites(FavoritesCommands::List) => {
            for fav in lock(auth)?.database().favorites()? {
                println!("{} ({})", fav.title, fav.url);
            }
        }

        Commands::Favorites(FavoritesCommands::Toggle { title }) => {
            let catalog = load_catalog(config)?;
            let game = find_game(&catalog, &title)?;
            lock(auth)?.toggle_favorite(game)?;
        }

        Commands::Recent(RecentCommands::List) => {
            for (i, game) in lock(auth)?.database().recently_played()?.iter().enumerate() {
                println!("{}. {} ({})", i + 1, game.title, game.url);
            }
        }

        Commands::Recent(RecentCommands::Play { title }) => {
            let catalog = load_catalog(config)?;
            let game = find_game(&catalog, &title)?;
            lock(auth)?.database().record_played(game)?;
        }

        Commands::Recent(RecentCommands::Remove { title }) => {
            if !lock(auth)?.database().remove_recent(&title)? {
                bail!("'{title}' is not in recently played");
            }
        }

        Commands::Play { title } => {
            let catalog = load_catalog(config)?;
            let game = find_game(&catalog, &title)?.clone();

            play::run(auth.clone(), &game, config.tracker.clone(), rx).await?;
        }
    }
    Ok(())
}

fn load_catalog(config: &PortalConfig) -> anyhow::Result<Catalog> {
    config.load_catalog().context("failed to load game catalog")
}

fn find_game<'a>(catalog: &'a Catalog, title: &str) -> anyhow::Result<&'a GameEntry> {
    match catalog.find(title) {
        Some(game) => Ok(game),
        None => bail!("no game called '{title}' in the catalog"),
    }
}
