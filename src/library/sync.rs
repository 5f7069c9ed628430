//! This module builds the owned-games list from the public community feed.
//!
//! It fetches the feed of a profile, turns every record into a [`Game`],
//! attaches playtime and cached artwork, and reports progress to the host
//! along the way. It also lists the games installed on this machine.

use crate::configuration::SteamSettings;
use crate::foundation::artwork::ArtworkCache;
use crate::foundation::feed::{parse_game_feed, GameRecord};
use crate::foundation::game::Game;
use crate::foundation::utils::{executable_dir, manifest_app_id, parse_hours};
use crate::library::{HttpSource, SyncError};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Time allowed for the feed request.
const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Progress reported once the feed has been downloaded and parsed.
const FEED_PROGRESS: u32 = 15;

/// Receives progress of a synchronization pass.
pub trait ProgressReporter: Send + Sync {
    /// `percent` is in `0..=100`.
    fn update(&self, percent: u8, message: &str);

    /// Polled once per game; `true` aborts the pass.
    fn is_cancelled(&self) -> bool;
}

pub struct SteamLibrary {
    settings: SteamSettings,
    session: Box<dyn HttpSource>,
    artwork: ArtworkCache,
}

impl SteamLibrary {
    pub fn new(settings: SteamSettings, session: Box<dyn HttpSource>, artwork: ArtworkCache) -> Self {
        Self {
            settings,
            session,
            artwork,
        }
    }

    /// URL of the games list feed for the configured profile.
    pub fn feed_url(&self) -> String {
        format!(
            "{}/id/{}/games?tab=all&xml=1",
            self.settings.community_url.trim_end_matches('/'),
            self.settings.public_name
        )
    }

    /// Fetches the list of games owned by the configured profile.
    ///
    /// Games are returned in feed order. When `progress` reports a
    /// cancellation the pass stops and an empty list is returned, never a
    /// partial one. Artwork problems only leave a game without a logo; an
    /// unreachable or empty feed fails the whole pass.
    ///
    /// # Arguments
    ///
    /// * `progress` - Optional receiver of progress updates.
    /// * `fetch_artwork` - Whether logos should be cached for every game.
    /// * `force_art_refresh` - Whether cached logos should be downloaded again.
    ///
    pub async fn fetch_owned_games(
        &self,
        progress: Option<&dyn ProgressReporter>,
        fetch_artwork: bool,
        force_art_refresh: bool,
    ) -> Result<Vec<Game>, SyncError> {
        let url = self.feed_url();
        info!("Fetching games list from {}", url);

        let body = self
            .session
            .fetch(&url, FEED_TIMEOUT)
            .await
            .map_err(|e| SyncError::FetchError(e.to_string()))?;
        if body.is_empty() {
            return Err(SyncError::FetchError("no data received".to_string()));
        }

        let records = parse_game_feed(&body)?;
        let total = records.len();
        let mut owned_games = Vec::with_capacity(total);

        for (processed, record) in records.iter().enumerate() {
            let name = field(record, "name").unwrap_or_default();

            if let Some(progress) = progress {
                progress.update(progress_percent(processed, total), &format!("Loading {name}"));
                if progress.is_cancelled() {
                    info!("Games list fetch cancelled after {} of {} games", processed, total);
                    return Ok(Vec::new());
                }
            }

            let Some(mut game) = game_from_record(record) else {
                warn!("Skipping game without a valid appID: {:?}", record);
                continue;
            };

            if fetch_artwork {
                self.artwork
                    .resolve_logo(&mut game, Some(self.session.as_ref()), force_art_refresh)
                    .await;
            }

            owned_games.push(game);
        }

        if let Some(progress) = progress {
            progress.update(100, "Done");
        }
        info!("Found {} owned games", owned_games.len());

        Ok(owned_games)
    }

    /// Lists the app ids of the games installed with the configured client.
    pub fn list_installed_game_ids(&self) -> Result<Vec<String>, SyncError> {
        list_installed_game_ids(&self.settings.steam_bin)
    }

    pub fn artwork(&self) -> &ArtworkCache {
        &self.artwork
    }
}

/// Lists the app ids found as `appmanifest_<id>.acf` files next to `steam_bin`.
///
/// The ids are sorted numerically.
pub fn list_installed_game_ids(steam_bin: &str) -> Result<Vec<String>, SyncError> {
    let apps_dir = steam_apps_dir(Path::new(executable_dir(steam_bin)));
    debug!("Looking for installed games in {}", apps_dir.display());

    let mut app_ids = WalkDir::new(&apps_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .map(|entry| {
            entry.map_err(|e| {
                SyncError::IoError(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "Failed to read steamapps")
                }))
            })
        })
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => entry
                .file_name()
                .to_str()
                .and_then(manifest_app_id)
                .map(Ok),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<String>, SyncError>>()?;

    app_ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
    Ok(app_ids)
}

/// Steam names the directory `steamapps`; older Windows installs use `SteamApps`.
fn steam_apps_dir(steam_root: &Path) -> PathBuf {
    let legacy = steam_root.join("SteamApps");
    if legacy.is_dir() && !steam_root.join("steamapps").is_dir() {
        legacy
    } else {
        steam_root.join("steamapps")
    }
}

fn progress_percent(processed: usize, total: usize) -> u8 {
    let span = 100 - FEED_PROGRESS as usize;
    (FEED_PROGRESS as usize + processed * span / total.max(1)) as u8
}

fn field(record: &GameRecord, key: &str) -> Option<String> {
    record.get(key).map(|value| value.trim().to_string())
}

fn game_from_record(record: &GameRecord) -> Option<Game> {
    let game_id = field(record, "appID")?.parse::<u32>().ok()?;
    let mut game = Game::new(game_id, &field(record, "name").unwrap_or_default());
    game.logo_url = field(record, "logo").unwrap_or_default();

    if let (Some(recent), Some(total)) = (record.get("hoursLast2Weeks"), record.get("hoursOnRecord")) {
        match (parse_hours(recent), parse_hours(total)) {
            (Some(recent), Some(total)) => game.set_play_time(recent, total),
            _ => warn!(
                "Ignoring unreadable playtime for #{}: {:?} / {:?}",
                game_id, recent, total
            ),
        }
    }

    Some(game)
}
