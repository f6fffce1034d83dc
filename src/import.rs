//! 一括インポート
//!
//! `CIK START END` 形式のテキストを1行ずつ処理し、見つかった提出書類をキューに加える。
//! シーケンサーは通さず、各行の呼び出しが終わってから次の行に進む（同時1件）。
//! 不正な行は行番号付きのアラートにして読み飛ばす。

use crate::error::{EdgarError, Result};
use crate::rpc::BackendClient;
use crate::store::{AlertArea, FilingStore};
use edgar_common::parse_import;
use std::path::Path;
use tracing::{info, warn};

/// インポート結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// 検索に成功した行数
    pub lines_imported: usize,
    /// キューに加えた書類数
    pub filings_added: usize,
    /// アラートにした問題（不正行・検索失敗）
    pub issues: Vec<String>,
}

pub async fn import_batch(
    text: &str,
    store: &FilingStore,
    backend: &BackendClient,
    forms: &[String],
) -> ImportReport {
    let mut report = ImportReport::default();

    for parsed in parse_import(text) {
        let entry = match parsed {
            Ok(entry) => entry,
            Err(issue) => {
                warn!(line = issue.line, message = %issue.message, "skipping malformed import line");
                let text = issue.to_string();
                store.add_alert(AlertArea::Search, text.clone());
                report.issues.push(text);
                continue;
            }
        };

        match backend
            .search_form_info(&entry.cik, forms, entry.start, entry.end)
            .await
        {
            Ok(data) => {
                let filings = data.map(|d| d.to_filings()).unwrap_or_default();
                info!(line = entry.line, cik = %entry.cik, count = filings.len(), "import line resolved");
                report.filings_added += store.merge_into_queue(filings);
                report.lines_imported += 1;
            }
            Err(e) => {
                warn!(line = entry.line, error = %e, "import lookup failed");
                let text = e.alert_text();
                store.add_alert(AlertArea::Search, text.clone());
                report.issues.push(text);
            }
        }
    }

    report
}

/// `.txt` ファイルから読み込んでインポート
pub async fn import_file(
    path: &Path,
    store: &FilingStore,
    backend: &BackendClient,
    forms: &[String],
) -> Result<ImportReport> {
    if !path.exists() {
        return Err(EdgarError::FileNotFound(path.display().to_string()));
    }

    let text = tokio::fs::read_to_string(path).await?;
    Ok(import_batch(&text, store, backend, forms).await)
}
