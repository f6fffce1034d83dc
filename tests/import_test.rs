//! 一括インポートのテスト

mod common;

use common::{client, sample_form_data, MockChannel};
use edgar_desk::error::EdgarError;
use edgar_desk::import::{import_batch, import_file};
use edgar_desk::rpc::SEARCH_FORM_INFO;
use edgar_desk::store::{AlertArea, FilingStore};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

fn forms() -> Vec<String> {
    vec!["10-K".to_string()]
}

fn form_info_channel() -> std::sync::Arc<MockChannel> {
    MockChannel::new(|_, args| {
        let cik = args[0].as_str().unwrap_or_default();
        match cik {
            "CIK0000000001" => Err(EdgarError::Backend("LookupError: unknown CIK".into())),
            "CIK0000000002" => Ok(Value::Null),
            _ => Ok(sample_form_data(cik, "Apple Inc.")),
        }
    })
}

/// 不正な行は行番号付きのアラートにして、残りの行は取り込む
#[tokio::test]
async fn test_malformed_line_is_reported_and_skipped() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let text = "320193 2020-01-01 2023-12-31\n0000789019 2021-01-01\n";
    let report = import_batch(text, &store, &client(&channel), &forms()).await;

    assert_eq!(report.lines_imported, 1);
    assert_eq!(report.filings_added, 2);
    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].starts_with("2行目"));

    let alerts = store.alerts(AlertArea::Search);
    assert_eq!(alerts.len(), 1);
    assert!(alerts.messages()[0].starts_with("2行目"));

    assert_eq!(store.queue_len(), 2);
    assert_eq!(channel.count(SEARCH_FORM_INFO), 1);
}

/// 各行は順番に1件ずつ問い合わせる（CIKは10桁に正規化）
#[tokio::test]
async fn test_lines_are_queried_in_order() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let text = "CIK320193 2020-01-01 2023-12-31\n\n789019 01/01/2019 12/31/2019 extra\n";
    let report = import_batch(text, &store, &client(&channel), &forms()).await;
    assert_eq!(report.lines_imported, 2);
    assert!(report.issues.is_empty());

    let calls = channel.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].1,
        vec![
            json!("CIK0000320193"),
            json!(["10-K"]),
            json!("2020-01-01"),
            json!("2023-12-31")
        ]
    );
    assert_eq!(calls[1].1[0], json!("CIK0000789019"));
    assert_eq!(calls[1].1[2], json!("2019-01-01"));
}

/// 途中の検索失敗・該当なしがあっても最後の行まで処理する
#[tokio::test]
async fn test_backend_failure_does_not_stop_batch() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let text = "1 2020-01-01 2020-12-31\n2 2020-01-01 2020-12-31\n320193 2020-01-01 2023-12-31\n";
    let report = import_batch(text, &store, &client(&channel), &forms()).await;

    assert_eq!(channel.count(SEARCH_FORM_INFO), 3);
    assert_eq!(report.lines_imported, 2);
    assert_eq!(report.filings_added, 2);
    assert_eq!(report.issues, vec!["unknown CIK".to_string()]);
    assert_eq!(store.alerts(AlertArea::Search).messages(), vec!["unknown CIK"]);
}

/// 同じ会社を2回読み込んでも追加件数は重複して数えない
#[tokio::test]
async fn test_overlapping_lines_count_new_filings_once() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let text = "320193 2020-01-01 2023-12-31\n320193 2021-01-01 2023-12-31\n";
    let report = import_batch(text, &store, &client(&channel), &forms()).await;

    assert_eq!(report.lines_imported, 2);
    assert_eq!(report.filings_added, 2);
    assert_eq!(store.queue_len(), 2);
}

/// 開始日が終了日より後の行は問い合わせない
#[tokio::test]
async fn test_reversed_dates_are_rejected() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let report = import_batch("320193 2023-01-01 2020-01-01", &store, &client(&channel), &forms()).await;

    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].starts_with("1行目"));
    assert_eq!(channel.count(SEARCH_FORM_INFO), 0);
    assert_eq!(store.queue_len(), 0);
}

/// ファイルから読み込み
#[tokio::test]
async fn test_import_file() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "320193 2020-01-01 2023-12-31").unwrap();

    let report = import_file(file.path(), &store, &client(&channel), &forms())
        .await
        .unwrap();
    assert_eq!(report.lines_imported, 1);
    assert_eq!(store.queue_len(), 2);
}

/// 存在しないファイル
#[tokio::test]
async fn test_import_missing_file() {
    let channel = form_info_channel();
    let store = FilingStore::new();

    let result = import_file(
        std::path::Path::new("/nonexistent/edgar/import.txt"),
        &store,
        &client(&channel),
        &forms(),
    )
    .await;

    assert!(matches!(result, Err(EdgarError::FileNotFound(_))));
    assert!(channel.calls().is_empty());
}
