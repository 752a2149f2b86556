pub mod handlers;
pub mod routes;

pub use handlers::{short_url, validate_url_scheme};
pub use routes::create_api_router;
