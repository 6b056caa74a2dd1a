pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rest;
pub mod services;

use config::Config;
use services::{credentials::CredentialStore, orders::OrderStore, tokens::TokenService};
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub orders: OrderStore,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: &Config, db: SqlitePool) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone()),
            orders: OrderStore::new(db),
            tokens: TokenService::new(config),
        }
    }
}
