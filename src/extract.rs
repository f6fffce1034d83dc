//! 一括抽出の投入
//!
//! キューの全件を IN_PROGRESS にし、スナップショットを1回の `process_filing_set` で送る。
//! 完了はジョブ状態のポーリングで確認するため、ここでは待たない。

use crate::rpc::BackendClient;
use crate::store::{AlertArea, FilingStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 抽出を投入し、送信タスクのハンドルを返す（待つかどうかは呼び出し側次第）
///
/// キューが空の場合は何も送らず、キューエリアにアラートを出す。
pub fn bulk_extract(
    store: &Arc<FilingStore>,
    backend: &BackendClient,
    output_path: PathBuf,
    perform_ner: bool,
) -> Option<JoinHandle<()>> {
    if store.queue_len() == 0 {
        store.add_alert(AlertArea::Queue, "キューに書類がありません");
        return None;
    }

    let filings = store.mark_queue_in_progress();
    info!(
        count = filings.len(),
        output = %output_path.display(),
        perform_ner,
        "submitting filing set for extraction"
    );

    let store = store.clone();
    let backend = backend.clone();
    Some(tokio::spawn(async move {
        if let Err(e) = backend
            .process_filing_set(&filings, &output_path, perform_ner)
            .await
        {
            warn!(error = %e, "process_filing_set failed");
            store.add_alert(AlertArea::Queue, e.alert_text());
        }
    }))
}
