//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CIK: {0}")]
    InvalidCik(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        let display = format!("{}", error);
        assert!(display.contains("JSON error"));
    }

    #[test]
    fn test_error_display_invalid_cik() {
        let error = Error::InvalidCik("ABC".to_string());
        assert_eq!(format!("{}", error), "Invalid CIK: ABC");
    }

    #[test]
    fn test_error_display_invalid_date() {
        let error = Error::InvalidDate("2024-13-40".to_string());
        assert_eq!(format!("{}", error), "Invalid date: 2024-13-40");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
