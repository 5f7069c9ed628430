mod parser;

pub use parser::{parse_game_feed, GameRecord};
