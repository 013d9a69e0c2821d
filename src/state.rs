//! Shared application state

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::auth::revocation::RevocationList;
use crate::config::{Config, UnknownItemPolicy};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Symmetric JWT signing key
    pub jwt_secret: String,
    /// `iss` claim written into and required from tokens
    pub jwt_issuer: String,
    /// `aud` claim written into and required from tokens
    pub jwt_audience: String,
    /// Token lifetime in minutes
    pub token_ttl_minutes: i64,
    /// Handling of unknown menu item ids in submitted orders
    pub unknown_item_policy: UnknownItemPolicy,
    /// Tokens revoked before their natural expiry (logout)
    pub revoked: RevocationList,
}

impl AppState {
    /// Connect to the database, run migrations, and build the state.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            jwt_issuer: config.jwt_issuer.clone(),
            jwt_audience: config.jwt_audience.clone(),
            token_ttl_minutes: config.token_ttl_minutes,
            unknown_item_policy: config.unknown_item_policy,
            revoked: RevocationList::new(),
        })
    }
}
