use serde::Serialize;
use std::path::PathBuf;

/// One owned game, as built during a synchronization pass.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Game {
    pub game_id: u32,
    pub name: String,
    pub hours_recent: f64,
    pub hours_total: f64,
    pub logo_url: String,
    pub logo_paths: Vec<PathBuf>, // converted artwork, in display order
}

impl Game {
    pub fn new(game_id: u32, name: &str) -> Self {
        Self {
            game_id,
            name: name.to_string(),
            hours_recent: 0.0,
            hours_total: 0.0,
            logo_url: String::new(),
            logo_paths: Vec::new(),
        }
    }

    /// Sets the hours played in the last two weeks and overall.
    pub fn set_play_time(&mut self, recent: f64, total: f64) {
        self.hours_recent = recent;
        self.hours_total = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_has_default_play_time() {
        let game = Game::new(440, "Team Fortress 2");
        assert_eq!(game.game_id, 440);
        assert_eq!(game.name, "Team Fortress 2");
        assert_eq!((game.hours_recent, game.hours_total), (0.0, 0.0));
        assert!(game.logo_paths.is_empty());
    }

    #[test]
    fn test_set_play_time() {
        let mut game = Game::new(440, "Team Fortress 2");
        game.set_play_time(2.5, 130.0);
        assert_eq!(game.hours_recent, 2.5);
        assert_eq!(game.hours_total, 130.0);
    }
}
