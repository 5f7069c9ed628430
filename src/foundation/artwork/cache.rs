//! Disk cache for game logos.
//!
//! Logos are stored as `game_<ID>_logo_1.png` inside the cache directory.
//! Downloads land in `game_<ID>_logo_1.jpg` first and are removed once the
//! PNG exists, so only the converted form stays on disk.

use crate::foundation::game::Game;
use crate::library::{HttpSource, ReqwestSource};
use image::{Rgb, RgbImage};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Size of the placeholder used when a download cannot be decoded.
pub const PLACEHOLDER_SIZE: (u32, u32) = (460, 215);

const PLACEHOLDER_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

pub struct ArtworkCache {
    cache_dir: PathBuf,
}

impl ArtworkCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Path of the converted logo for `game_id`.
    pub fn logo_path(&self, game_id: u32) -> PathBuf {
        self.cache_dir.join(format!("game_{game_id}_logo_1.png"))
    }

    /// Path the logo for `game_id` is downloaded to before conversion.
    pub fn raw_logo_path(&self, game_id: u32) -> PathBuf {
        self.cache_dir.join(format!("game_{game_id}_logo_1.jpg"))
    }

    /// Makes sure the logo of `game` is cached and records it in `game.logo_paths`.
    ///
    /// An existing logo is reused unless `force_refresh` is set. Downloads go
    /// through `session` when given, otherwise through a one-off session.
    /// Returns `None` when the logo could not be downloaded; a download that
    /// cannot be decoded is replaced by a blank placeholder.
    pub async fn resolve_logo(
        &self,
        game: &mut Game,
        session: Option<&dyn HttpSource>,
        force_refresh: bool,
    ) -> Option<PathBuf> {
        debug!("Checking artwork for #{}", game.game_id);
        let logo_path = self.logo_path(game.game_id);

        if logo_path.is_file() && !force_refresh {
            game.logo_paths = vec![logo_path.clone()];
            return Some(logo_path);
        }

        if force_refresh {
            remove_if_exists(&logo_path);
        }

        if game.logo_url.is_empty() {
            debug!("No logo URL for #{}", game.game_id);
            return None;
        }

        if let Err(e) = fs::create_dir_all(&self.cache_dir) {
            warn!(
                "Unable to create artwork cache {}: {}",
                self.cache_dir.display(),
                e
            );
            return None;
        }

        let raw_path = self.raw_logo_path(game.game_id);
        let downloaded = match session {
            Some(session) => session.download_to(&game.logo_url, &raw_path).await,
            None => {
                ReqwestSource::new()
                    .download_to(&game.logo_url, &raw_path)
                    .await
            }
        };

        if let Err(e) = downloaded {
            warn!("Artwork download failed for #{}: {}", game.game_id, e);
            remove_if_exists(&raw_path);
            return None;
        }

        if let Err(e) = convert_logo(&raw_path, &logo_path) {
            warn!(
                "Unable to convert artwork for #{} ({}), using placeholder",
                game.game_id, e
            );
            if let Err(e) = save_placeholder(&logo_path) {
                warn!("Unable to write placeholder for #{}: {}", game.game_id, e);
                return None;
            }
        }

        remove_if_exists(&raw_path);
        game.logo_paths = vec![logo_path.clone()];
        Some(logo_path)
    }
}

fn convert_logo(raw_path: &Path, logo_path: &Path) -> image::ImageResult<()> {
    let logo = image::ImageReader::open(raw_path)?
        .with_guessed_format()?
        .decode()?;
    logo.save(logo_path)
}

fn save_placeholder(logo_path: &Path) -> image::ImageResult<()> {
    let (width, height) = PLACEHOLDER_SIZE;
    RgbImage::from_pixel(width, height, PLACEHOLDER_COLOR).save(logo_path)
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Unable to remove {}: {}", path.display(), e),
    }
}
