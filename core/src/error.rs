use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabase(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("No connection pool available for driver")]
    NoPoolAvailable,
    /// 字段值不合法（例如库中存储了未知的状态值）
    #[error("Invalid field: {0}")]
    InvalidField(String),
    /// 边界校验失败，携带全部违规项
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
