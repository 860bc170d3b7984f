//! `hims-app`: wiring and the application shell.

pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::{Navigation, Router};
pub use state::AppState;
