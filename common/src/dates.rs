//! 日付ユーティリティ

use crate::error::{Error, Result};
use chrono::NaiveDate;

/// EDGAR全文検索の下限日
pub const MINIMUM_SEARCH_START_DATE: &str = "2001-01-01";

const ACCEPTED_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

/// `search_form_info` に渡す形式（YYYY-MM-DD、ゼロ埋め）
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD` / `MM/DD/YYYY` / `YYYYMMDD` を受け付ける
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| Error::InvalidDate(text.to_string()))
}

/// デフォルトの検索開始日
pub fn minimum_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default()
}
