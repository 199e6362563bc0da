use crate::config::connection::{parse_connection_string, DataSource};
use crate::core::ConfigProvider;
use crate::utils::error::{OrderImportError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Settings file contents; `appsettings.json` or the same shape in TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "ConnectionStrings", default)]
    pub connection_strings: ConnectionStrings,
    #[serde(rename = "OrderImport", default)]
    pub order_import: Option<OrderImportSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionStrings {
    #[serde(rename = "DefaultConnection")]
    pub default_connection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderImportSettings {
    /// 以單一 scope 包住 full 模式的 clean/import/check
    #[serde(rename = "AtomicFull")]
    pub atomic_full: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Json,
        }
    }
}

impl AppSettings {
    /// 從檔案載入設定，依副檔名決定格式
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content, SettingsFormat::from_path(&path))
    }

    pub fn parse(content: &str, format: SettingsFormat) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        match format {
            SettingsFormat::Json => Ok(serde_json::from_str(&processed)?),
            SettingsFormat::Toml => {
                toml::from_str(&processed).map_err(|e| OrderImportError::ConfigError {
                    message: format!("TOML parsing error: {}", e),
                })
            }
        }
    }

    /// 替換環境變數 (例如 ${ORDER_DB})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn data_source(&self) -> Result<DataSource> {
        let raw = validate_required_field(
            "ConnectionStrings.DefaultConnection",
            &self.connection_strings.default_connection,
        )?;
        parse_connection_string(raw)
    }
}

impl ConfigProvider for AppSettings {
    fn connection_string(&self) -> &str {
        self.connection_strings
            .default_connection
            .as_deref()
            .unwrap_or_default()
    }

    fn atomic_full(&self) -> bool {
        self.order_import
            .as_ref()
            .and_then(|o| o.atomic_full)
            .unwrap_or(false)
    }
}

impl Validate for AppSettings {
    fn validate(&self) -> Result<()> {
        self.data_source().map(|_| ())
    }
}
