//! 一括インポートファイルのパーサー
//!
//! `.txt` の各行が `CIK START_DATE END_DATE`（空白区切り）の形式。
//! 不正な行は行番号付きの `ImportIssue` として返し、残りの行の処理は続ける。

use crate::dates::parse_date;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;

/// インポート対象1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// 1始まりの行番号
    pub line: usize,
    pub cik: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 不正な行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIssue {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}行目: {}", self.line, self.message)
    }
}

/// CIKを `CIK` + 10桁ゼロ埋めに正規化
///
/// # Examples
/// ```
/// use edgar_common::normalize_cik;
///
/// assert_eq!(normalize_cik("320193").unwrap(), "CIK0000320193");
/// assert_eq!(normalize_cik("cik0000320193").unwrap(), "CIK0000320193");
/// ```
pub fn normalize_cik(text: &str) -> Result<String> {
    lazy_static::lazy_static! {
        static ref CIK_RE: Regex = Regex::new(r"(?i)^(?:cik)?(\d{1,10})$").unwrap();
    }

    let trimmed = text.trim();
    let digits = CIK_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::InvalidCik(trimmed.to_string()))?;

    Ok(format!("CIK{:0>10}", digits))
}

/// 1行をパース（空行は `None`）
pub fn parse_import_line(line_no: usize, line: &str) -> Option<std::result::Result<ImportEntry, ImportIssue>> {
    if line.trim().is_empty() {
        return None;
    }

    let issue = |message: String| ImportIssue { line: line_no, message };
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let (cik, start, end) = match tokens.as_slice() {
        [cik, start, end, ..] => (*cik, *start, *end),
        _ => {
            return Some(Err(issue(
                "CIK・開始日・終了日の3項目が必要です".to_string(),
            )))
        }
    };

    let entry = normalize_cik(cik)
        .and_then(|cik| Ok((cik, parse_date(start)?, parse_date(end)?)))
        .map_err(|e| issue(e.to_string()))
        .and_then(|(cik, start, end)| {
            if start > end {
                Err(issue(format!("開始日 {} が終了日 {} より後です", start, end)))
            } else {
                Ok(ImportEntry {
                    line: line_no,
                    cik,
                    start,
                    end,
                })
            }
        });

    Some(entry)
}

/// テキスト全体をパース
pub fn parse_import(text: &str) -> Vec<std::result::Result<ImportEntry, ImportIssue>> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_import_line(idx + 1, line))
        .collect()
}
