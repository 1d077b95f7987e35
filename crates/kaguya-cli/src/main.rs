use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kaguya_api::{ApiError, BackendClient};
use kaguya_core::config::AppConfig;
use kaguya_core::episodes::EpisodeList;
use kaguya_core::error::KaguyaError;
use kaguya_core::ordinal::EpisodeOrdinal;
use kaguya_runtime::{DbHandle, Runtime, RuntimeError, WatchRoute};

const DEFAULT_FILTER: &str =
    "kaguya_cli=info,kaguya_runtime=info,kaguya_api=info,kaguya_player=info,kaguya_core=info";

/// Viewport assumed when mounting a page without a window.
const HEADLESS_WIDTH: f32 = 1280.0;

#[derive(Parser, Debug)]
#[command(name = "kaguya", version, about = "Anime catalog and watch-progress client")]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this device as touch-primary.
    #[arg(long, global = true)]
    touch: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recently updated titles.
    Recent {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Episodes of a title in watch order.
    Episodes { anime: i64 },
    /// Playable sources of an episode.
    Sources { episode: i64 },
    /// Local watch history.
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Where a watch page for this title would pick up.
    Resume { anime: i64, episode: Option<i64> },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] KaguyaError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _guard = init_logging();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = AppConfig::data_dir().join("logs");
    let file_appender = tracing_appender::rolling::daily(&log_dir, "kaguya.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_ansi(false)
        .init();
    guard
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if cli.touch {
        config.device.touch_primary = true;
    }

    let client = BackendClient::from_config(&config.backend)?;
    let db = DbHandle::open(&AppConfig::ensure_db_path()?)?;
    let runtime = Runtime::new(client, db, config);
    info!(command = ?cli.command, "kaguya starting");

    match cli.command {
        Command::Recent { limit } => {
            for card in runtime.recent_titles(limit).await? {
                let score = card.score_label.unwrap_or_else(|| "-".into());
                let favourites = card.favourites_label.unwrap_or_else(|| "-".into());
                println!(
                    "{:>8}  {:<40} {:>4}  ♥ {:>8}  {}",
                    card.ani_id,
                    card.title,
                    score,
                    favourites,
                    card.genres.join(", ")
                );
            }
        }
        Command::Episodes { anime } => {
            let title = runtime.title(anime).await?;
            println!("{}", title.display_title());
            let episodes = EpisodeList::sorted(title.episodes);
            for (i, episode) in episodes.iter().enumerate() {
                let ordinal = match EpisodeOrdinal::of(&episode.name) {
                    EpisodeOrdinal::Parsed(n) => n.to_string(),
                    EpisodeOrdinal::Missing => "?".into(),
                };
                println!(
                    "{:>4}  {:>5}  {:<24} {}",
                    i + 1,
                    ordinal,
                    episode.name,
                    WatchRoute::new(anime, Some(episode.episode_id))
                );
            }
        }
        Command::Sources { episode } => match runtime.sources(episode).await {
            Some(sources) => {
                for source in sources.as_slice() {
                    println!("{:<8} {}", source.label, source.file);
                }
            }
            None => {
                let placeholder = runtime.config().watch.placeholder_sources();
                println!(
                    "no sources available, player would show {} ({})",
                    placeholder.primary().file,
                    placeholder.primary().label
                );
            }
        },
        Command::History { limit } => {
            for record in runtime.history(limit).await? {
                let title = record
                    .anime
                    .as_ref()
                    .map(|a| a.display_title().to_string())
                    .unwrap_or_else(|| record.anime_id.to_string());
                let episode = record
                    .episode
                    .as_ref()
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| record.episode_id.to_string());
                println!(
                    "{}  {:<40} {:<16} {}",
                    record.updated_at.format("%Y-%m-%d %H:%M"),
                    title,
                    episode,
                    format_position(record.watched_time)
                );
            }
        }
        Command::Resume { anime, episode } => {
            let route = WatchRoute::new(anime, episode);
            let session = runtime.open_watch(route, HEADLESS_WIDTH).await?;
            let page = session.page();
            println!(
                "{} / {}",
                page.anime().display_title(),
                page.current_episode().name
            );
            if let Some(saved) = page.resume_prompt() {
                println!(
                    "saved progress is on {}: {}",
                    saved.name,
                    WatchRoute::new(anime, Some(saved.episode_id))
                );
            } else if let Some(position) = page.pending_resume() {
                println!("continues at {}", format_position(position));
            } else {
                println!("starts from the beginning");
            }
        }
    }

    Ok(())
}

/// `3725.4` → `"1:02:05"`, `95.0` → `"1:35"`.
fn format_position(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
