pub mod auth;
pub mod fallback;
pub mod logging;

pub use auth::{require_access_token, require_refresh_token, Identity};
pub use fallback::json_method_not_allowed;
pub use logging::request_logging;
