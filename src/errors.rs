use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataHubError {
    /// 网络、超时或非 2xx 响应
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 页面中找不到指数表格
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 数值字段无法按本地格式转换
    #[error("Format error: {0}")]
    FormatError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invoke error: {0}")]
    InvokeError(String),

    #[error("Empty table: {0}")]
    EmptyTable(String),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl DataHubError {
    /// Short, stable name of the error class, used in logs and exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DataHubError::FetchError(_) | DataHubError::RequestError(_) => "FetchError",
            DataHubError::ParseError(_) => "ParseError",
            DataHubError::FormatError(_) => "FormatError",
            DataHubError::StorageError(_) => "StorageError",
            DataHubError::InvokeError(_) => "InvokeError",
            DataHubError::EmptyTable(_) => "EmptyTable",
            DataHubError::JsonError(_) => "JsonError",
            DataHubError::ArrowError(_) | DataHubError::ParquetError(_) => "EncodeError",
            DataHubError::DateError(_) => "DateError",
            DataHubError::ConfigError(_) => "ConfigError",
        }
    }
}

pub type Result<T> = std::result::Result<T, DataHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_taxonomy() {
        assert_eq!(DataHubError::FetchError("x".into()).kind(), "FetchError");
        assert_eq!(DataHubError::ParseError("x".into()).kind(), "ParseError");
        assert_eq!(DataHubError::FormatError("x".into()).kind(), "FormatError");
        assert_eq!(DataHubError::StorageError("x".into()).kind(), "StorageError");
        assert_eq!(DataHubError::InvokeError("x".into()).kind(), "InvokeError");
        assert_eq!(DataHubError::EmptyTable("x".into()).kind(), "EmptyTable");
    }
}
