//! cinelog - command-line client
//!
//! Keeps a personal log of watched movies, series, anime and played games in
//! a Supabase table. Searches go to TMDB directly and to the game catalog
//! through cinelog-proxy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use cinelog_client::auth::{self, SupabaseAuth};
use cinelog_client::catalog::CatalogSearch;
use cinelog_client::profile::GeminiAnalyzer;
use cinelog_client::{http_client, EventBus, SupabaseStore, SyncController};
use cinelog_common::config::CineLogConfig;
use cinelog_common::projection::{AppMode, SortOption, TypeFilter};
use cinelog_common::{CatalogCandidate, Entry, MediaKind};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Command-line arguments for cinelog
#[derive(Parser, Debug)]
#[command(name = "cinelog")]
#[command(about = "Personal log of movies, series, anime and games")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "CINELOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Session file (default: session.json in the config directory)
    #[arg(long, env = "CINELOG_SESSION", global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login(Credentials),
    /// Create an account
    Signup(Credentials),
    /// Forget the saved session
    Logout,
    /// Show the logged entries
    List {
        /// catalog (movies, series, anime) or game
        #[arg(short, long, default_value = "catalog")]
        mode: AppMode,
        /// all, movie, series, anime or game
        #[arg(short = 't', long = "type", default_value = "all")]
        type_filter: TypeFilter,
        /// recent, oldest, titleAsc, titleDesc or ratingDesc
        #[arg(short, long, default_value = "recent")]
        sort: SortOption,
        /// Case-insensitive match on title or director/developer
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Search the catalog for something to add
    Search {
        query: String,
        #[arg(short, long, default_value = "catalog")]
        mode: AppMode,
    },
    /// Search and add one result to the log
    Add {
        query: String,
        #[arg(short, long, default_value = "catalog")]
        mode: AppMode,
        /// Catalog id of the result to add (default: first result)
        #[arg(long)]
        id: Option<i64>,
        /// 1-5, 0 for unrated
        #[arg(short, long, default_value_t = 0)]
        rating: u8,
    },
    /// Delete an entry
    Remove {
        id: Uuid,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Counts and rating distribution
    Stats,
    /// Ask the model for a taste profile
    Analyze,
    /// Write a JSON backup of the log
    Export {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Include a freshly generated taste profile
        #[arg(long)]
        with_analysis: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct Credentials {
    #[arg(long, env = "CINELOG_EMAIL")]
    email: String,
    #[arg(long, env = "CINELOG_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = CineLogConfig::load(args.config.as_deref()).context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cinelog_client={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("cinelog {}", env!("CARGO_PKG_VERSION"));

    let session_path = match args.session {
        Some(path) => path,
        None => auth::default_session_path()
            .ok_or_else(|| anyhow!("Could not determine config directory for the session file"))?,
    };

    let http = http_client()?;

    match args.command {
        Command::Login(creds) => {
            let provider = SupabaseAuth::from_config(http, &config.supabase)?;
            let identity = provider.sign_in(&creds.email, &creds.password).await?;
            auth::save_session(&session_path, &identity)?;
            println!("Signed in as {}", creds.email);
        }
        Command::Signup(creds) => {
            let provider = SupabaseAuth::from_config(http, &config.supabase)?;
            match provider.sign_up(&creds.email, &creds.password).await? {
                Some(identity) => {
                    auth::save_session(&session_path, &identity)?;
                    println!("Account created, signed in as {}", creds.email);
                }
                None => println!("Account created. Confirm your email, then run `cinelog login`."),
            }
        }
        Command::Logout => {
            if auth::clear_session(&session_path)? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        Command::List {
            mode,
            type_filter,
            sort,
            search,
        } => {
            let controller = connect(http, &config, &session_path).await?;
            let entries = controller.view(mode, &search, type_filter, sort).await;
            if entries.is_empty() {
                println!("Nothing logged yet");
            }
            for entry in &entries {
                println!("{}", format_entry(entry));
            }
        }
        Command::Search { query, mode } => {
            let catalog = CatalogSearch::from_config(http, &config);
            let results = catalog.search(&query, mode).await;
            if results.is_empty() {
                println!("No results");
            }
            for candidate in &results {
                println!("{}", format_candidate(candidate));
            }
        }
        Command::Add {
            query,
            mode,
            id,
            rating,
        } => {
            let catalog = CatalogSearch::from_config(http.clone(), &config);
            let results = catalog.search(&query, mode).await;
            let candidate = pick_candidate(results, id)?;
            let candidate = catalog.enrich(candidate).await;

            let controller = connect(http, &config, &session_path).await?;
            let entry = controller.save(&candidate, rating).await?;
            println!("Added {}", format_entry(&entry));
        }
        Command::Remove { id, yes } => {
            if !yes {
                bail!("Refusing to delete without --yes");
            }
            let controller = connect(http, &config, &session_path).await?;
            let title = controller.find(id).await.map(|e| e.title);
            controller.remove(id, yes).await?;
            println!("Removed {}", title.unwrap_or_else(|| id.to_string()));
        }
        Command::Stats => {
            let controller = connect(http, &config, &session_path).await?;
            let stats = controller.stats().await;
            println!("Total: {}", stats.total);
            for kind in MediaKind::ALL {
                println!("  {:<7} {}", kind.to_string(), stats.count(kind));
            }
            match stats.average_rating {
                Some(avg) => println!("Average rating: {:.2}", avg),
                None => println!("Average rating: -"),
            }
            for (i, count) in stats.rating_histogram.iter().enumerate() {
                println!("  {} star{} {}", i + 1, if i == 0 { " " } else { "s" }, count);
            }
        }
        Command::Analyze => {
            let analyzer = GeminiAnalyzer::from_config(http.clone(), &config.gemini)?;
            let controller = connect(http, &config, &session_path).await?;
            let profile = analyzer.analyze(&controller.entries().await).await?;
            println!("Favorite genre: {}", profile.favorite_genre);
            println!("Estimated hours: {:.0}", profile.total_hours_estimate);
            println!();
            println!("{}", profile.personality_profile);
            println!();
            for title in &profile.recommendations {
                println!("  - {}", title);
            }
        }
        Command::Export { dir, with_analysis } => {
            let analyzer = if with_analysis {
                Some(GeminiAnalyzer::from_config(http.clone(), &config.gemini)?)
            } else {
                None
            };
            let controller = connect(http, &config, &session_path).await?;
            let analysis = match analyzer {
                Some(analyzer) => Some(analyzer.analyze(&controller.entries().await).await?),
                None => None,
            };
            let backup = controller.export_backup(analysis).await;
            let path = backup.write_to_dir(&dir)?;
            println!("Wrote {} entries to {}", backup.entries.len(), path.display());
        }
    }

    Ok(())
}

/// Build the controller for the saved session and load its list
async fn connect(
    http: reqwest::Client,
    config: &CineLogConfig,
    session_path: &Path,
) -> Result<SyncController<SupabaseStore>> {
    let identity = auth::load_session(session_path)
        .context("Failed to read session")?
        .ok_or_else(|| anyhow!("Not signed in. Run `cinelog login` first."))?;

    let store = SupabaseStore::from_config(http, &config.supabase)?;
    let controller = SyncController::new(Arc::new(store), EventBus::default());
    let count = controller.set_identity(Some(identity)).await?;
    info!(count, "Entries loaded");
    Ok(controller)
}

fn pick_candidate(results: Vec<CatalogCandidate>, id: Option<i64>) -> Result<CatalogCandidate> {
    let candidate = match id {
        Some(id) => results.into_iter().find(|c| match c {
            CatalogCandidate::Title(t) => t.id == id,
            CatalogCandidate::Game(g) => g.id == id,
        }),
        None => results.into_iter().next(),
    };
    candidate.ok_or_else(|| anyhow!("No matching search result"))
}

fn format_entry(entry: &Entry) -> String {
    let rating = entry
        .rating
        .map(|r| format!("{}/5", r))
        .unwrap_or_else(|| "-".to_string());
    let year = entry.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    let creator = entry
        .creator
        .as_deref()
        .map(|c| format!(", {}", c))
        .unwrap_or_default();
    format!(
        "{}  {:<6} {:>3}  {}{}{}",
        entry.id, entry.kind.to_string(), rating, entry.title, year, creator
    )
}

fn format_candidate(candidate: &CatalogCandidate) -> String {
    match candidate {
        CatalogCandidate::Title(t) => {
            let year = t.year().map(|y| format!(" ({})", y)).unwrap_or_default();
            format!("{:>8}  {:<6} {}{}", t.id, t.kind().to_string(), t.display_title(), year)
        }
        CatalogCandidate::Game(g) => {
            let year = g.year().map(|y| format!(" ({})", y)).unwrap_or_default();
            let platform = g
                .primary_platform()
                .map(|p| format!(" [{}]", p))
                .unwrap_or_default();
            format!("{:>8}  Game   {}{}{}", g.id, g.name, year, platform)
        }
    }
}
