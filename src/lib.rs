pub mod aggregate;
pub mod app;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod dates;
pub mod errors;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod poller;
pub mod state;
pub mod transform;
pub mod ui;

pub use aggregate::{build_board, build_buckets, summarize};
pub use app::router;
pub use config::Config;
pub use state::AppState;
