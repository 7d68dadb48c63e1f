pub mod app;
pub mod backend;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod state;
pub mod ui;

pub use app::router;
pub use backend::BackendClient;
pub use config::Config;
pub use reconcile::{build_diff, deduplicate};
pub use state::AppState;
