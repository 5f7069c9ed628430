mod http;
mod sync;
mod sync_error;

pub use http::*;
pub use sync::*;
pub use sync_error::SyncError;
