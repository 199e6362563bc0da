use crate::utils::error::{OrderImportError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path};
use std::fmt;
use std::path::PathBuf;

const DATA_SOURCE_KEYS: [&str; 3] = ["data source", "datasource", "filename"];

/// Where the SQLite store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Memory,
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Memory => write!(f, ":memory:"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// 解析連線字串，例如 `Data Source=orders.db;Cache=Shared`
///
/// 不含 `=` 的字串直接視為檔案路徑；未知的 key 會被忽略。
pub fn parse_connection_string(raw: &str) -> Result<DataSource> {
    const FIELD: &str = "ConnectionStrings.DefaultConnection";
    validate_non_empty_string(FIELD, raw)?;

    let raw = raw.trim();
    let path = if raw.contains('=') {
        raw.split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| DATA_SOURCE_KEYS.contains(&key.trim().to_ascii_lowercase().as_str()))
            .map(|(_, value)| value.trim().to_string())
            .ok_or_else(|| OrderImportError::InvalidConfigValueError {
                field: FIELD.to_string(),
                value: raw.to_string(),
                reason: "no 'Data Source' entry".to_string(),
            })?
    } else {
        raw.to_string()
    };

    validate_path(FIELD, &path)?;

    if path.eq_ignore_ascii_case(":memory:") {
        Ok(DataSource::Memory)
    } else {
        Ok(DataSource::File(PathBuf::from(path)))
    }
}
