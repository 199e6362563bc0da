use crate::core::runner::Mode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "order-import")]
#[command(about = "Loads customer and order files and reports credit limit overruns")]
pub struct CliConfig {
    /// Settings file holding ConnectionStrings:DefaultConnection (JSON or TOML)
    #[arg(short, long, global = true, default_value = "appsettings.json")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub mode: Mode,
}
