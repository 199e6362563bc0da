pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, SqliteRepository};
pub use config::{AppSettings, DataSource};
pub use crate::core::runner::{Mode, RunReport, Runner};
pub use crate::core::{etl::EtlEngine, import::ImportPipeline};
pub use utils::error::{OrderImportError, Result};
