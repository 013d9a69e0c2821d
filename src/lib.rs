//! cafeteria-server — cafeteria ordering backend
//!
//! Users register and log in, browse a fixed menu, and manage orders tied to
//! their account. Exposed as a JSON HTTP API:
//!
//! - **auth** (`/auth/*`): registration, login, logout (token revocation)
//! - **menu** (`/orders/menu`): public read-only catalog
//! - **orders** (`/orders/*`): per-user order CRUD with derived totals
//!
//! ```text
//! src/
//! ├── config.rs   # env-driven configuration
//! ├── error.rs    # API error taxonomy
//! ├── state.rs    # shared application state (pool, token policy, ...)
//! ├── auth/       # JWT issue/verify, middleware, revocation set
//! ├── api/        # HTTP routes and handlers
//! └── db/         # sqlx query modules, one per table family
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;
