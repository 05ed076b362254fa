// src/ingest/providers/mod.rs
pub mod fixture;
pub mod youtube;

pub use fixture::FixtureChatSource;
pub use youtube::YouTubeChatSource;
