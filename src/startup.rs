/// # The Main Entry Points of the Command Line Host
///
/// These functions play the part of the media-center UI: they load the
/// configuration, run a synchronization pass with a terminal progress bar,
/// reconcile the owned games with the installed ones and launch games.
///
/// # Steps of a synchronization:
/// 1. Loads the configuration
/// 2. Fetches the owned games, caching their artwork
/// 3. Lists the installed games
/// 4. Prints the library
///
use crate::configuration::{self, ConfigFolder, Settings};
use crate::foundation::artwork::ArtworkCache;
use crate::foundation::game::{start_client, Game};
use crate::library::{ProgressReporter, ReqwestSource, SteamLibrary};
use crate::process::SystemProcesses;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the user asked the host to do.
pub enum Action {
    Sync {
        skip_artwork: bool,
        refresh_artwork: bool,
        json: bool,
    },
    Installed,
    Launch(u32),
    Start,
}

pub async fn run(cfg_folder: ConfigFolder, action: Action) -> anyhow::Result<()> {
    if !cfg_folder.config_dir.exists() || !cfg_folder.config_file.exists() {
        eprintln!(
            "\x1b[1m\x1b[31mConfiguration folder or config.yaml not found. Please run 'steamlib config' first.\x1b[0m"
        );
        return Ok(());
    }

    let config_file = cfg_folder
        .config_file
        .to_str()
        .context("Failed to convert the configuration path to a string")?;
    let settings =
        configuration::get_configuration(config_file).context("Unable to parse configuration file")?;

    match action {
        Action::Sync {
            skip_artwork,
            refresh_artwork,
            json,
        } => sync(&cfg_folder, &settings, skip_artwork, refresh_artwork, json).await,
        Action::Installed => list_installed(&cfg_folder, &settings),
        Action::Launch(game_id) => launch(&settings, game_id).await,
        Action::Start => {
            if start_client(&SystemProcesses, &settings.steam_settings) {
                println!("\x1b[32mSteam is starting in the background.\x1b[0m");
            } else {
                println!("\x1b[33mSteam was not started (already running or unable to launch).\x1b[0m");
            }
            Ok(())
        }
    }
}

fn open_library(cfg_folder: &ConfigFolder, settings: &Settings) -> SteamLibrary {
    SteamLibrary::new(
        settings.steam_settings.clone(),
        Box::new(ReqwestSource::new()),
        ArtworkCache::new(settings.artwork_cache_dir(cfg_folder)),
    )
}

async fn sync(
    cfg_folder: &ConfigFolder,
    settings: &Settings,
    skip_artwork: bool,
    refresh_artwork: bool,
    json: bool,
) -> anyhow::Result<()> {
    let library = open_library(cfg_folder, settings);
    let fetch_artwork = settings.artwork_settings.fetch_artwork && !skip_artwork;

    println!(
        "\x1b[1m\x1b[34mFetching games owned by '{}'...\x1b[0m",
        settings.steam_settings.public_name
    );

    let reporter = BarReporter::new();
    let cancel_flag = reporter.cancel_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_flag.store(true, Ordering::SeqCst);
        }
    });

    let result = library
        .fetch_owned_games(Some(&reporter), fetch_artwork, refresh_artwork)
        .await;
    ctrl_c.abort();
    reporter.finish();

    let games = result.context("Can't get the games list from Steam Community")?;
    if games.is_empty() && reporter.is_cancelled() {
        println!("\x1b[33mSynchronization cancelled.\x1b[0m");
        return Ok(());
    }

    let installed = installed_ids(&library);

    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
    } else {
        for game in &games {
            println!("{}", format_game_line(game, &installed));
        }
        println!(
            "\x1b[32m{} games owned, {} installed.\x1b[0m",
            games.len(),
            games
                .iter()
                .filter(|game| installed.contains(&game.game_id.to_string()))
                .count()
        );
    }

    Ok(())
}

fn list_installed(cfg_folder: &ConfigFolder, settings: &Settings) -> anyhow::Result<()> {
    let library = open_library(cfg_folder, settings);
    let app_ids = library
        .list_installed_game_ids()
        .context("Unable to list installed games")?;

    if app_ids.is_empty() {
        println!("\x1b[33mNo installed games found.\x1b[0m");
    }
    for app_id in app_ids {
        println!("{app_id}");
    }

    Ok(())
}

async fn launch(settings: &Settings, game_id: u32) -> anyhow::Result<()> {
    let game = Game::new(game_id, &format!("app {game_id}"));
    println!("\x1b[1m\x1b[34mLaunching app {game_id}...\x1b[0m");

    if game.launch(&SystemProcesses, &settings.steam_settings).await {
        println!("\x1b[32mSteam is running, the game should start shortly.\x1b[0m");
    } else {
        eprintln!("\x1b[31mSteam does not appear to be running after the launch request.\x1b[0m");
    }

    Ok(())
}

/// Installed app ids, or none when the Steam folder cannot be read.
fn installed_ids(library: &SteamLibrary) -> HashSet<String> {
    match library.list_installed_game_ids() {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            log::warn!("Unable to list installed games: {}", e);
            HashSet::new()
        }
    }
}

fn format_game_line(game: &Game, installed: &HashSet<String>) -> String {
    let marker = if installed.contains(&game.game_id.to_string()) {
        " [installed]"
    } else {
        ""
    };
    format!(
        "{:>8}  {} ({:.1}h last 2 weeks, {:.1}h total){}",
        game.game_id, game.name, game.hours_recent, game.hours_total, marker
    )
}

/// Progress bar driven by a synchronization pass, cancelled with Ctrl-C.
struct BarReporter {
    bar: ProgressBar,
    cancelled: Arc<AtomicBool>,
}

impl BarReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );

        Self {
            bar,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for BarReporter {
    fn update(&self, percent: u8, message: &str) {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(message.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
