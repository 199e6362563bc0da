use anyhow::Context;
use clap::Parser;
use order_import::core::ConfigProvider;
use order_import::utils::error::ErrorSeverity;
use order_import::utils::{logger, validation::Validate};
use order_import::{AppSettings, CliConfig, LocalStorage, OrderImportError, Runner, SqliteRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting order-import ({})", config.mode.name());
    tracing::debug!("CLI config: {:?}", config);

    // 載入並驗證設定
    let settings = AppSettings::from_file(&config.config)
        .with_context(|| format!("failed to load settings from '{}'", config.config.display()))?;
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }
    let data_source = settings.data_source()?;
    tracing::debug!("Connection string: {}", settings.connection_string());
    tracing::info!("📁 Store: {}", data_source);

    let result = match SqliteRepository::open(&data_source) {
        Ok(repository) => {
            let runner = Runner::new(LocalStorage::current_dir(), &repository, &settings);
            let mut stdout = std::io::stdout().lock();
            runner.run(&config.mode, &mut stdout).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => {
            tracing::info!("✅ {} completed", config.mode.name());
            Ok(())
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                config.mode.name(),
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(exit_code(&e));
        }
    }
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &OrderImportError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
