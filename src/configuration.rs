use config::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

/// Prefix of environment variables overriding the configuration file,
/// e.g. `STEAMLIB__STEAM_SETTINGS__PUBLIC_NAME`.
const ENV_PREFIX: &str = "STEAMLIB";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub steam_settings: SteamSettings,
    #[serde(default)]
    pub artwork_settings: ArtworkSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamSettings {
    pub steam_bin: String,
    pub public_name: String,
    #[serde(default = "default_community_url")]
    pub community_url: String,
    #[serde(default = "default_launch_grace_secs")]
    pub launch_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtworkSettings {
    #[serde(default = "default_fetch_artwork")]
    pub fetch_artwork: bool,
    #[serde(default)]
    pub cache_dir: Option<String>,
}

impl Default for ArtworkSettings {
    fn default() -> Self {
        Self {
            fetch_artwork: default_fetch_artwork(),
            cache_dir: None,
        }
    }
}

fn default_community_url() -> String {
    "https://steamcommunity.com".to_string()
}

fn default_launch_grace_secs() -> u64 {
    5
}

fn default_fetch_artwork() -> bool {
    true
}

impl SteamSettings {
    pub fn new(steam_bin: &str, public_name: &str) -> Self {
        Self {
            steam_bin: steam_bin.to_string(),
            public_name: public_name.to_string(),
            community_url: default_community_url(),
            launch_grace_secs: default_launch_grace_secs(),
        }
    }

    /// Time given to the client to come up before checking it is running.
    pub fn launch_grace(&self) -> Duration {
        Duration::from_secs(self.launch_grace_secs)
    }
}

impl Settings {
    /// Artwork cache directory, falling back to the one inside the config folder.
    pub fn artwork_cache_dir(&self, cfg_folder: &ConfigFolder) -> PathBuf {
        self.artwork_settings
            .cache_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| cfg_folder.artwork_cache.clone())
    }
}

pub fn get_configuration(cfg_file: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::new(cfg_file, config::FileFormat::Yaml))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    if settings.steam_settings.public_name.trim().is_empty() {
        return Err(ConfigError::Message(
            "steam_settings.public_name must not be empty".to_string(),
        ));
    }

    Ok(settings)
}

pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub artwork_cache: PathBuf,
}

impl ConfigFolder {
    pub fn new() -> io::Result<Self> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))?;

        Ok(Self::in_dir(Path::new(&home_dir)))
    }

    pub fn in_dir(home_dir: &Path) -> Self {
        let config_dir = home_dir.join(".steamlib");

        Self {
            config_file: config_dir.join("config.yaml"),
            artwork_cache: config_dir.join("artworkcache"),
            config_dir,
        }
    }
}

pub fn create_config(cfg_folder: ConfigFolder) -> Result<(), Box<dyn std::error::Error>> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");
    let config_dir = &cfg_folder.config_dir;

    if config_dir.exists() && !confirm_overwrite()? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    write_config_template(&cfg_folder)?;

    println!("\x1b[32mConfiguration file created at:");
    println!("  -> {}", cfg_folder.config_file.display());
    println!("Artwork cache folder created at:");
    println!("  -> {}", cfg_folder.artwork_cache.display());
    println!("\x1b[0mPlease edit the configuration file with your Steam settings.");

    Ok(())
}

fn write_config_template(cfg_folder: &ConfigFolder) -> io::Result<()> {
    fs::create_dir_all(&cfg_folder.config_dir)?;
    fs::create_dir_all(&cfg_folder.artwork_cache)?;

    let config_content = include_str!("config_template.yaml");
    fs::write(&cfg_folder.config_file, config_content)
}

fn confirm_overwrite() -> Result<bool, io::Error> {
    println!("\x1b[31mThe configuration folder already exists.");
    println!("Do you want to overwrite the configuration file? Cached artwork is kept. (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_get_configuration_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "steam_settings:\n  steam_bin: 'C:\\Steam\\steam.exe'\n  public_name: 'gaben'\n",
        );

        let settings = get_configuration(&path).unwrap();
        assert_eq!(settings.steam_settings.steam_bin, "C:\\Steam\\steam.exe");
        assert_eq!(settings.steam_settings.public_name, "gaben");
        assert_eq!(
            settings.steam_settings.community_url,
            "https://steamcommunity.com"
        );
        assert_eq!(settings.steam_settings.launch_grace(), Duration::from_secs(5));
        assert!(settings.artwork_settings.fetch_artwork);
        assert!(settings.artwork_settings.cache_dir.is_none());
    }

    #[test]
    fn test_get_configuration_reads_overrides() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "steam_settings:\n  steam_bin: '/opt/steam/steam.exe'\n  public_name: 'gaben'\n  launch_grace_secs: 1\nartwork_settings:\n  fetch_artwork: false\n  cache_dir: '/tmp/art'\n",
        );

        let settings = get_configuration(&path).unwrap();
        assert_eq!(settings.steam_settings.launch_grace_secs, 1);
        assert!(!settings.artwork_settings.fetch_artwork);

        let folder = ConfigFolder::in_dir(dir.path());
        assert_eq!(settings.artwork_cache_dir(&folder), PathBuf::from("/tmp/art"));
    }

    #[test]
    fn test_get_configuration_rejects_empty_public_name() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "steam_settings:\n  steam_bin: 'steam.exe'\n  public_name: '  '\n",
        );

        assert!(get_configuration(&path).is_err());
    }

    #[test]
    fn test_template_is_valid_configuration() {
        let dir = TempDir::new().unwrap();
        let folder = ConfigFolder::in_dir(dir.path());
        write_config_template(&folder).unwrap();

        assert!(folder.artwork_cache.is_dir());
        let settings = get_configuration(folder.config_file.to_str().unwrap()).unwrap();
        assert_eq!(
            settings.artwork_cache_dir(&folder),
            folder.artwork_cache
        );
    }
}
