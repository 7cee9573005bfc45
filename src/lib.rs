pub mod auth;
pub mod context;
pub mod cors;
pub mod debounce;
pub mod emails;
pub mod error;
pub mod filter;
pub mod mock_data;
pub mod models;
pub mod routes;
pub mod settings;
pub mod store;

pub use error::ApiError;
pub use routes::{configure, evict_idle_sessions, sweep_idle_sessions, AppState};
pub use settings::Settings;
pub use store::{Catalog, SessionRegistry, SkinStore};
