//! ジョブ状態ポーリング
//!
//! 一定間隔で `get_job_state` を呼び、結果をストアのビジー表示とアラート枠に反映する。
//! 1回のポーリング完了を待ってから次の周期に入るので、呼び出しが重なることはない。

use crate::rpc::BackendClient;
use crate::store::FilingStore;
use edgar_common::{BackendState, JobState};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// ジョブ状態をストアに反映
///
/// - WORKING のときだけビジー表示をオン
/// - エラーがあれば `backend_job_error` 枠を上書き、なければ枠を消す
pub fn reconcile(store: &FilingStore, state: &BackendState) {
    store.set_job_busy(state.state == JobState::Working);
    store.set_job_error(state.error.as_deref());
}

pub struct JobPoller {
    backend: BackendClient,
    store: Arc<FilingStore>,
    interval: Duration,
}

impl JobPoller {
    pub fn new(backend: BackendClient, store: Arc<FilingStore>, interval: Duration) -> Self {
        Self {
            backend,
            store,
            interval,
        }
    }

    /// 1回ポーリングして反映（失敗時は `None`）
    pub async fn poll_once(&self) -> Option<BackendState> {
        match self.backend.get_job_state().await {
            Ok(state) => {
                debug!(state = %state.state, error = ?state.error, "job state polled");
                self.store.set_poll_error(None);
                reconcile(&self.store, &state);
                Some(state)
            }
            Err(e) => {
                warn!(error = %e, "job state poll failed");
                self.store.set_poll_error(Some(&e.alert_text()));
                None
            }
        }
    }

    /// 停止されるまでポーリングを続ける
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    /// バックグラウンドで開始（`abort()` で停止）
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
