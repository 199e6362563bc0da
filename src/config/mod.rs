#[cfg(feature = "cli")]
pub mod cli;
pub mod connection;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use connection::DataSource;
pub use settings::AppSettings;
