pub mod credentials;
pub mod orders;
pub mod tokens;
