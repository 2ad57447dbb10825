mod client;
mod types;

pub use client::PlexClient;
pub use types::{MediaItem, MediaKind, RawMediaRecord};
