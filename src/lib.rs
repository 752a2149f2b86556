pub mod api;
pub mod config;
pub mod keys;
pub mod models;
pub mod redirect;
pub mod shortener;
pub mod storage;

pub use keys::KeyDeriver;
pub use shortener::{ShortenStatus, Shortened, Shortener, ShortenerError};
