//! 検索結果・キュー・アラートの状態ストア
//!
//! 各フィールドは `Arc` のスナップショットとして公開し、更新時は
//! `Arc::make_mut` で複製してから書き換える。取得済みのスナップショットは変化しない。

use edgar_common::{
    AlertMap, DocumentState, Filing, BACKEND_JOB_ERROR_KEY, BACKEND_POLL_ERROR_KEY,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// `document_address_10k` → `Filing`
pub type QueueMap = HashMap<String, Filing>;

/// アラートの表示先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertArea {
    /// 検索エリア
    Search,
    /// キュー（オフキャンバス）エリア
    Queue,
}

#[derive(Default)]
struct Inner {
    results: Arc<Vec<Filing>>,
    queue: Arc<QueueMap>,
    search_alerts: Arc<AlertMap>,
    queue_alerts: Arc<AlertMap>,
    job_busy: bool,
}

impl Inner {
    fn alerts_mut(&mut self, area: AlertArea) -> &mut AlertMap {
        match area {
            AlertArea::Search => Arc::make_mut(&mut self.search_alerts),
            AlertArea::Queue => Arc::make_mut(&mut self.queue_alerts),
        }
    }
}

#[derive(Default)]
pub struct FilingStore {
    inner: Mutex<Inner>,
}

impl FilingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- 検索結果 ----

    pub fn results(&self) -> Arc<Vec<Filing>> {
        self.lock().results.clone()
    }

    /// 検索結果を差し替え（キュー済みの書類はキュー上の状態を反映）
    pub fn set_results(&self, filings: Vec<Filing>) {
        let mut inner = self.lock();
        let results = filings
            .into_iter()
            .map(|mut filing| {
                filing.status = inner
                    .queue
                    .get(filing.key())
                    .map(|queued| queued.status)
                    .unwrap_or(DocumentState::Search);
                filing
            })
            .collect();
        inner.results = Arc::new(results);
    }

    pub fn clear_results(&self) {
        self.lock().results = Arc::new(Vec::new());
    }

    // ---- キュー ----

    pub fn queue(&self) -> Arc<QueueMap> {
        self.lock().queue.clone()
    }

    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_queued(&self, key: &str) -> bool {
        self.lock().queue.contains_key(key)
    }

    /// キューに追加（同じキーは置き換え）
    pub fn add_to_queue(&self, mut filing: Filing) {
        filing.status = DocumentState::InQueue;
        let mut inner = self.lock();
        sync_result_status(&mut inner.results, filing.key(), DocumentState::InQueue);
        Arc::make_mut(&mut inner.queue).insert(filing.key().to_string(), filing);
    }

    /// キューから削除（なければ何もしない）
    pub fn remove_from_queue(&self, filing: &Filing) {
        self.remove_key(filing.key());
    }

    pub fn remove_key(&self, key: &str) {
        let mut inner = self.lock();
        if !inner.queue.contains_key(key) {
            return;
        }
        Arc::make_mut(&mut inner.queue).remove(key);
        sync_result_status(&mut inner.results, key, DocumentState::Search);
    }

    /// キュー済みならはずし、なければ追加（戻り値: 追加後にキュー済みか）
    pub fn toggle_queue(&self, filing: &Filing) -> bool {
        if self.is_queued(filing.key()) {
            self.remove_from_queue(filing);
            false
        } else {
            self.add_to_queue(filing.clone());
            true
        }
    }

    /// 複数件をまとめて追加（新たに加わった件数を返す。既存キーは置き換えのみ）
    pub fn merge_into_queue(&self, filings: Vec<Filing>) -> usize {
        let mut added = 0;
        let mut inner = self.lock();
        for mut filing in filings {
            filing.status = DocumentState::InQueue;
            sync_result_status(&mut inner.results, filing.key(), DocumentState::InQueue);
            let key = filing.key().to_string();
            if Arc::make_mut(&mut inner.queue).insert(key, filing).is_none() {
                added += 1;
            }
        }
        added
    }

    /// キュー内の全件を IN_PROGRESS にしてスナップショットを返す
    pub fn mark_queue_in_progress(&self) -> Vec<Filing> {
        let mut inner = self.lock();
        let keys: Vec<String> = inner.queue.keys().cloned().collect();
        for filing in Arc::make_mut(&mut inner.queue).values_mut() {
            filing.status = DocumentState::InProgress;
        }
        for key in &keys {
            sync_result_status(&mut inner.results, key, DocumentState::InProgress);
        }
        inner.queue.values().cloned().collect()
    }

    // ---- アラート ----

    pub fn alerts(&self, area: AlertArea) -> Arc<AlertMap> {
        let inner = self.lock();
        match area {
            AlertArea::Search => inner.search_alerts.clone(),
            AlertArea::Queue => inner.queue_alerts.clone(),
        }
    }

    pub fn add_alert(&self, area: AlertArea, text: impl Into<String>) {
        self.lock().alerts_mut(area).add(text);
    }

    pub fn clear_alerts(&self, area: AlertArea) {
        let mut inner = self.lock();
        match area {
            AlertArea::Search => inner.search_alerts = Arc::new(AlertMap::new()),
            AlertArea::Queue => inner.queue_alerts = Arc::new(AlertMap::new()),
        }
    }

    // ---- ジョブ状態 ----

    pub fn job_busy(&self) -> bool {
        self.lock().job_busy
    }

    pub fn set_job_busy(&self, busy: bool) {
        self.lock().job_busy = busy;
    }

    /// ジョブエラー枠（常に1件まで）
    pub fn set_job_error(&self, error: Option<&str>) {
        set_slot(&mut self.lock(), BACKEND_JOB_ERROR_KEY, error);
    }

    /// ポーリング失敗枠
    pub fn set_poll_error(&self, error: Option<&str>) {
        set_slot(&mut self.lock(), BACKEND_POLL_ERROR_KEY, error);
    }
}

fn set_slot(inner: &mut Inner, key: &str, text: Option<&str>) {
    match text {
        Some(text) => inner.alerts_mut(AlertArea::Queue).set_slot(key, text),
        None => {
            if inner.queue_alerts.get(key).is_some() {
                inner.alerts_mut(AlertArea::Queue).remove(key);
            }
        }
    }
}

fn sync_result_status(results: &mut Arc<Vec<Filing>>, key: &str, status: DocumentState) {
    if !results.iter().any(|f| f.key() == key) {
        return;
    }
    for filing in Arc::make_mut(results).iter_mut().filter(|f| f.key() == key) {
        filing.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filing(key: &str) -> Filing {
        Filing {
            document_address_10k: key.to_string(),
            filing_type: "10-K".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_is_stable_across_mutation() {
        let store = FilingStore::new();
        store.add_to_queue(filing("a"));
        let before = store.queue();

        store.add_to_queue(filing("b"));
        assert_eq!(before.len(), 1);
        assert_eq!(store.queue_len(), 2);
    }

    #[test]
    fn test_results_reflect_queue_membership() {
        let store = FilingStore::new();
        store.add_to_queue(filing("a"));
        store.set_results(vec![filing("a"), filing("b")]);

        let results = store.results();
        assert_eq!(results[0].status, DocumentState::InQueue);
        assert_eq!(results[1].status, DocumentState::Search);

        store.remove_key("a");
        assert_eq!(store.results()[0].status, DocumentState::Search);
    }

    #[test]
    fn test_toggle_queue() {
        let store = FilingStore::new();
        assert!(store.toggle_queue(&filing("a")));
        assert!(store.is_queued("a"));
        assert!(!store.toggle_queue(&filing("a")));
        assert!(!store.is_queued("a"));
    }

    #[test]
    fn test_alert_areas_are_independent() {
        let store = FilingStore::new();
        store.add_alert(AlertArea::Search, "search failed");
        store.add_alert(AlertArea::Queue, "extract failed");
        store.clear_alerts(AlertArea::Search);

        assert!(store.alerts(AlertArea::Search).is_empty());
        assert_eq!(store.alerts(AlertArea::Queue).messages(), vec!["extract failed"]);
    }
}
