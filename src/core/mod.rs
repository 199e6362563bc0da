pub mod check;
pub mod clean;
pub mod etl;
pub mod import;
pub mod parser;
pub mod runner;

pub use crate::domain::model::{ImportBatch, ImportSource, ImportSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Repository, Storage};
pub use crate::utils::error::Result;
