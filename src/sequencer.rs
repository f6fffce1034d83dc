//! リクエストシーケンサー
//!
//! 連続する入力（キー入力・日付変更・エンティティ選択など）に伴うバックエンド呼び出しを
//! 1キューあたり同時1件に制限し、古いレスポンスが新しい結果を上書きしないようにする。
//!
//! - enqueue: 末尾に追加し、処理中でなければ処理を開始
//! - 次の処理を取り出す前にキューを最新1件に畳み込む（間の要求は破棄）
//! - 処理が成功しても失敗しても次へ進み、空になったら処理中フラグを下ろす
//!
//! タイマーを使わないデバウンスとして働く。転送済みのリクエストは取り消せない。

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error};

type Handler<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

struct State<T> {
    queue: VecDeque<T>,
    processing: bool,
}

impl<T> State<T> {
    /// 最新1件だけ残して取り出す
    fn take_latest(&mut self, name: &str) -> Option<T> {
        let latest = self.queue.pop_back();
        if !self.queue.is_empty() {
            debug!(sequencer = name, discarded = self.queue.len(), "collapsed stale requests");
            self.queue.clear();
        }
        latest
    }
}

struct Shared<T> {
    name: &'static str,
    state: Mutex<State<T>>,
    /// true = アイドル
    idle: watch::Sender<bool>,
    handler: Handler<T>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 最新優先のFIFO
pub struct RequestSequencer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for RequestSequencer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> RequestSequencer<T> {
    /// `handler` はキューから取り出された1件ごとに呼ばれる。
    /// 失敗の扱い（アラート化など）はハンドラ内で完結させること。
    pub fn new<F>(name: &'static str, handler: F) -> Self
    where
        F: Fn(T) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let (idle, _) = watch::channel(true);
        Self {
            shared: Arc::new(Shared {
                name,
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    processing: false,
                }),
                idle,
                handler: Arc::new(handler),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// 要求を追加
    ///
    /// アイドル時に追加された要求はその場で実行が確定する。
    /// 処理中に追加された要求は、次の取り出し時点で最新のものだけが実行される。
    pub fn enqueue(&self, item: T) {
        let first = {
            let mut state = self.shared.lock();
            state.queue.push_back(item);
            if state.processing {
                debug!(sequencer = self.shared.name, queued = state.queue.len(), "request queued behind in-flight call");
                return;
            }
            state.processing = true;
            self.shared.idle.send_replace(false);
            state.take_latest(self.shared.name)
        };

        if let Some(first) = first {
            tokio::spawn(drain(self.shared.clone(), first));
        }
    }

    pub fn is_processing(&self) -> bool {
        self.shared.lock().processing
    }

    /// 実行待ちの件数（実行中の1件は含まない）
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// キューが空になり実行中の要求もなくなるまで待つ
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.idle.subscribe();
        let _ = rx.wait_for(|idle| *idle).await;
    }
}

async fn drain<T: Send + 'static>(shared: Arc<Shared<T>>, first: T) {
    let mut item = first;
    loop {
        let run = (shared.handler)(item);
        if AssertUnwindSafe(run).catch_unwind().await.is_err() {
            error!(sequencer = shared.name, "request handler panicked");
        }

        let mut state = shared.lock();
        match state.take_latest(shared.name) {
            Some(next) => item = next,
            None => {
                state.processing = false;
                shared.idle.send_replace(true);
                return;
            }
        }
    }
}
