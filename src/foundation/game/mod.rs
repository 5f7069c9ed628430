mod launch;
mod models;

pub use launch::start_client;
pub use models::Game;
