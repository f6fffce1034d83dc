//! 状態ストアのテスト

use edgar_common::{DocumentState, Filing, BACKEND_JOB_ERROR_KEY, BACKEND_POLL_ERROR_KEY};
use edgar_desk::store::{AlertArea, FilingStore};

fn filing(doc: &str, date: &str) -> Filing {
    Filing {
        entity_name: "Apple Inc.".into(),
        cik_number: "CIK0000320193".into(),
        filing_type: "10-K".into(),
        filing_date: date.into(),
        document_address_10k: doc.into(),
        extract_info: true,
        ..Default::default()
    }
}

/// 同じ文書アドレスを2回追加すると1件になり、後の内容が残る
#[test]
fn test_add_same_key_twice_keeps_latest() {
    let store = FilingStore::new();
    store.add_to_queue(filing("doc-1", "2023-11-03"));
    store.add_to_queue(filing("doc-1", "2023-11-04"));

    let queue = store.queue();
    assert_eq!(queue.len(), 1);
    let entry = &queue["doc-1"];
    assert_eq!(entry.filing_date, "2023-11-04");
    assert_eq!(entry.status, DocumentState::InQueue);
}

/// キューにない書類の削除は何もしない
#[test]
fn test_remove_absent_key_is_noop() {
    let store = FilingStore::new();
    store.add_to_queue(filing("doc-1", "2023-11-03"));
    let before = store.queue();

    store.remove_key("doc-missing");
    store.remove_from_queue(&filing("doc-other", "2020-01-01"));

    assert_eq!(*store.queue(), *before);
    assert_eq!(store.queue_len(), 1);
}

/// 追加して削除すると元の状態に戻る
#[test]
fn test_add_then_remove_restores_queue() {
    let store = FilingStore::new();
    store.add_to_queue(filing("doc-1", "2023-11-03"));
    let before = store.queue();

    let extra = filing("doc-2", "2022-10-28");
    store.add_to_queue(extra.clone());
    assert!(store.is_queued("doc-2"));
    store.remove_from_queue(&extra);

    assert_eq!(*store.queue(), *before);
}

/// 検索結果の状態表示がキュー操作に追従する
#[test]
fn test_results_follow_queue_membership() {
    let store = FilingStore::new();
    store.add_to_queue(filing("doc-1", "2023-11-03"));
    store.set_results(vec![filing("doc-1", "2023-11-03"), filing("doc-2", "2022-10-28")]);

    let results = store.results();
    assert_eq!(results[0].status, DocumentState::InQueue);
    assert_eq!(results[1].status, DocumentState::Search);

    assert!(store.toggle_queue(&results[1]));
    assert_eq!(store.results()[1].status, DocumentState::InQueue);

    assert!(!store.toggle_queue(&results[0]));
    assert_eq!(store.results()[0].status, DocumentState::Search);
    assert_eq!(store.queue_len(), 1);
}

/// 一括抽出前に全件が IN_PROGRESS になる
#[test]
fn test_mark_queue_in_progress() {
    let store = FilingStore::new();
    let merged = store.merge_into_queue(vec![
        filing("doc-1", "2023-11-03"),
        filing("doc-2", "2022-10-28"),
    ]);
    assert_eq!(merged, 2);

    let snapshot = store.mark_queue_in_progress();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.iter().all(|f| f.status == DocumentState::InProgress));
    assert!(store
        .queue()
        .values()
        .all(|f| f.status == DocumentState::InProgress));
}

/// 既にキューにある書類は追加件数に数えない
#[test]
fn test_merge_counts_only_new_keys() {
    let store = FilingStore::new();
    store.add_to_queue(filing("doc-1", "2023-11-03"));

    let added = store.merge_into_queue(vec![
        filing("doc-1", "2023-11-04"),
        filing("doc-2", "2022-10-28"),
        filing("doc-2", "2022-10-29"),
    ]);

    assert_eq!(added, 1);
    assert_eq!(store.queue_len(), 2);
    assert_eq!(store.queue()["doc-1"].filing_date, "2023-11-04");
}

/// ジョブエラー枠とポーリング失敗枠は独立して上書き・削除される
#[test]
fn test_job_and_poll_error_slots() {
    let store = FilingStore::new();
    store.set_job_error(Some("first"));
    store.set_job_error(Some("second"));
    store.set_poll_error(Some("unreachable"));

    let alerts = store.alerts(AlertArea::Queue);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts.get(BACKEND_JOB_ERROR_KEY).unwrap().error_text, "second");

    store.set_poll_error(None);
    let alerts = store.alerts(AlertArea::Queue);
    assert!(alerts.get(BACKEND_POLL_ERROR_KEY).is_none());
    assert!(alerts.get(BACKEND_JOB_ERROR_KEY).is_some());
    assert!(store.alerts(AlertArea::Search).is_empty());
}
