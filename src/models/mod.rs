pub mod url;

pub use url::{ResolveResponse, ShortenRequest, ShortenResponse, UrlMapping};
