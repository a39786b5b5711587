pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod errlog;
pub mod error;
pub mod io;
pub mod paths;
pub mod progress;
pub mod stats;
pub mod store;
pub mod text;
pub mod types;

pub use error::{Result, VibeError};
