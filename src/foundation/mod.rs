pub mod artwork;
pub mod feed;
pub mod game;
pub mod utils;
