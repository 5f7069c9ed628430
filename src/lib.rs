pub mod configuration;
pub mod foundation;
pub mod library;
pub mod process;
pub mod startup;

pub use configuration::*;
pub use foundation::artwork::ArtworkCache;
pub use foundation::feed::{parse_game_feed, GameRecord};
pub use foundation::game::{start_client, Game};
pub use library::{
    list_installed_game_ids, HttpSource, ProgressReporter, ReqwestSource, SteamLibrary, SyncError,
};
pub use process::{list_running_process_names, ProcessRunner, SystemProcesses};
