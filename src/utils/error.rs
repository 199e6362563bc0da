use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(rusqlite::Error),

    #[error("Transaction scope error: {message}")]
    ScopeError { message: String },

    #[error("Cannot open database '{target}': {source}")]
    ConnectionError {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("File '{path}' is not valid UTF-8")]
    EncodingError { path: String },

    #[error("Parse error in {file} line {line}: {message}")]
    ParseError {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    #[error("No customer named '{name}'")]
    CustomerNotFound { name: String },

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, OrderImportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Data,
    Database,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<rusqlite::Error> for OrderImportError {
    fn from(err: rusqlite::Error) -> Self {
        // SQLite 約束錯誤獨立歸類，其餘視為資料庫錯誤
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => OrderImportError::ConstraintViolation {
                message: err.to_string(),
            },
            _ => OrderImportError::DatabaseError(err),
        }
    }
}

impl OrderImportError {
    pub fn parse(file: &str, line: u64, message: impl Into<String>) -> Self {
        OrderImportError::ParseError {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        OrderImportError::ConstraintViolation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            OrderImportError::IoError(_) => ErrorCategory::Io,
            OrderImportError::CsvError(_)
            | OrderImportError::EncodingError { .. }
            | OrderImportError::ParseError { .. } => ErrorCategory::Input,
            OrderImportError::ConstraintViolation { .. }
            | OrderImportError::CustomerNotFound { .. }
            | OrderImportError::NotFound { .. } => ErrorCategory::Data,
            OrderImportError::DatabaseError(_)
            | OrderImportError::ScopeError { .. }
            | OrderImportError::ConnectionError { .. } => ErrorCategory::Database,
            OrderImportError::SerializationError(_)
            | OrderImportError::ConfigError { .. }
            | OrderImportError::MissingConfigError { .. }
            | OrderImportError::InvalidConfigValueError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Config => ErrorSeverity::Medium,
            ErrorCategory::Io | ErrorCategory::Input | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Database => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OrderImportError::IoError(_) => "Check that the input files exist and are readable",
            OrderImportError::CsvError(_) | OrderImportError::EncodingError { .. } => {
                "Make sure the file is UTF-8, tab-separated text with a header line"
            }
            OrderImportError::ParseError { .. } => {
                "Fix the reported line; numbers use '.' as decimal separator"
            }
            OrderImportError::ConstraintViolation { .. } => {
                "Names are limited to 100 characters and amounts to 8 digits with 2 decimals"
            }
            OrderImportError::CustomerNotFound { .. } => {
                "Add the customer to the customer file or correct the name in the order file"
            }
            OrderImportError::NotFound { .. } => "Run 'clean' and re-import the data",
            OrderImportError::ScopeError { .. } => {
                "Every commit or rollback needs a matching begin on the same repository"
            }
            OrderImportError::ConnectionError { .. } | OrderImportError::DatabaseError(_) => {
                "Check ConnectionStrings:DefaultConnection and the database file permissions"
            }
            OrderImportError::SerializationError(_)
            | OrderImportError::ConfigError { .. }
            | OrderImportError::MissingConfigError { .. }
            | OrderImportError::InvalidConfigValueError { .. } => {
                "Check the settings file (default: appsettings.json)"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OrderImportError::CustomerNotFound { name } => {
                format!("Order references unknown customer '{}'; orders were not imported", name)
            }
            OrderImportError::ConnectionError { target, .. } => {
                format!("Could not open the database at '{}'", target)
            }
            other => other.to_string(),
        }
    }
}
