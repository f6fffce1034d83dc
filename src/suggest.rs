//! エンティティ候補検索
//!
//! 入力文字列ごとに `search` を呼ぶ。2文字未満はバックエンドに送らず、
//! 候補一覧と読み込み中表示をその場でクリアする。

use crate::rpc::BackendClient;
use crate::sequencer::RequestSequencer;
use crate::store::{AlertArea, FilingStore};
use edgar_common::EntityResult;
use futures::FutureExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// バックエンドに送る最小文字数
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionState {
    pub query: String,
    pub results: Vec<EntityResult>,
    pub loading: bool,
}

type SharedState = Arc<Mutex<SuggestionState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, SuggestionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct EntitySuggester {
    sequencer: RequestSequencer<String>,
    state: SharedState,
}

impl EntitySuggester {
    /// `min_chars` は `MIN_QUERY_CHARS` 未満にはならない
    pub fn new(backend: BackendClient, store: Arc<FilingStore>, min_chars: usize) -> Self {
        let min_chars = min_chars.max(MIN_QUERY_CHARS);
        let state: SharedState = Arc::default();
        let handler_state = state.clone();

        let sequencer = RequestSequencer::new("entity-suggestions", move |query: String| {
            let backend = backend.clone();
            let store = store.clone();
            let state = handler_state.clone();
            async move { lookup(&backend, &store, &state, query, min_chars).await }.boxed()
        });

        Self { sequencer, state }
    }

    /// 入力の変化を通知
    pub fn input(&self, text: impl Into<String>) {
        self.sequencer.enqueue(text.into());
    }

    pub fn snapshot(&self) -> SuggestionState {
        lock(&self.state).clone()
    }

    /// 保留中の検索がすべて終わるまで待つ
    pub async fn settled(&self) {
        self.sequencer.wait_idle().await;
    }
}

async fn lookup(
    backend: &BackendClient,
    store: &FilingStore,
    state: &SharedState,
    query: String,
    min_chars: usize,
) {
    if query.trim().chars().count() < min_chars {
        let mut state = lock(state);
        state.query = query;
        state.results.clear();
        state.loading = false;
        return;
    }

    lock(state).loading = true;
    debug!(query = %query, "searching entities");
    let outcome = backend.search(&query).await;

    let mut state = lock(state);
    state.loading = false;
    state.query = query;
    match outcome {
        Ok(results) => state.results = results,
        Err(e) => {
            warn!(error = %e, "entity search failed");
            store.add_alert(AlertArea::Search, e.alert_text());
        }
    }
}
