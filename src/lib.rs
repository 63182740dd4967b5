pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::{build_router, AppState};
pub use crate::config::ServiceConfig;
pub use crate::core::invoker::ResilientInvoker;
pub use crate::domain::model::{ConversionRequest, ConversionResult};
pub use crate::utils::error::{Result, SkedError};
