mod cache;

pub use cache::{ArtworkCache, PLACEHOLDER_SIZE};
