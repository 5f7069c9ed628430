//! Starting the Steam client and games through it.
//!
//! Steam gives no completion signal for a launch request, so success is
//! judged by the client process being alive after a grace period.

use crate::configuration::SteamSettings;
use crate::foundation::game::Game;
use crate::foundation::utils::executable_name;
use crate::process::ProcessRunner;
use log::{info, warn};

impl Game {
    /// Client arguments asking it to start this game.
    pub fn launch_args(&self) -> Vec<String> {
        vec!["-applaunch".to_string(), self.game_id.to_string()]
    }

    /// Launches this game through the Steam client.
    ///
    /// Returns whether the client is running once the grace period has
    /// elapsed. `true` does not guarantee the game itself started.
    pub async fn launch(&self, runner: &dyn ProcessRunner, settings: &SteamSettings) -> bool {
        info!("Launching {} ({})", self.name, self.game_id);
        if runner
            .launch_detached(&settings.steam_bin, &self.launch_args())
            .is_err()
        {
            return false;
        }

        tokio::time::sleep(settings.launch_grace()).await;
        is_client_running(runner, &settings.steam_bin)
    }
}

/// Starts the Steam client in the background unless it is already running.
///
/// Returns `true` when a new client process was requested.
pub fn start_client(runner: &dyn ProcessRunner, settings: &SteamSettings) -> bool {
    if is_client_running(runner, &settings.steam_bin) {
        info!("Steam is already running");
        return false;
    }

    runner
        .launch_detached(&settings.steam_bin, &["-silent".to_string()])
        .is_ok()
}

fn is_client_running(runner: &dyn ProcessRunner, steam_bin: &str) -> bool {
    let exe = executable_name(steam_bin).to_lowercase();
    match runner.running_process_names() {
        Ok(names) => names.iter().any(|name| name.to_lowercase() == exe),
        Err(e) => {
            warn!("Unable to list running processes: {}", e);
            false
        }
    }
}
