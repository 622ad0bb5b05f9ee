pub mod app;
pub mod config;
pub mod error;
mod matchmaking;
mod signaling;

pub use app::{AppState, build_app, serve};
pub use config::{RelayConfig, ServerArgs};
pub use error::{RelayError, StoreError};
pub use matchmaking::*;
pub use signaling::*;
