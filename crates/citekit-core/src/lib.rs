pub mod config;
pub mod error;
pub mod models;

pub use config::AppConfig;
pub use error::{CitekitError, ExitCode, Result};
pub use models::*;
