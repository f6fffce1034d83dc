//! TCP上の改行区切りJSONトランスポート
//!
//! リクエスト: `{"id": 1, "method": "search", "args": ["apple"]}`
//! レスポンス: `{"id": 1, "result": [...], "error": null}`
//!
//! ポーリングと2つのシーケンサーが同じ接続を共有するため、
//! 受信タスクがIDでレスポンスを呼び出し元に振り分ける。

use super::RpcChannel;
use crate::error::{EdgarError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Default)]
struct PendingCalls {
    waiting: HashMap<u64, oneshot::Sender<Result<Value>>>,
    /// 切断理由（切断後の呼び出しは即失敗）
    closed: Option<String>,
}

type Pending = Arc<Mutex<PendingCalls>>;

fn lock(pending: &Pending) -> MutexGuard<'_, PendingCalls> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 呼び出し側の待機登録（応答前に破棄された呼び出しも外す）
struct Registration<'a> {
    pending: &'a Pending,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        lock(self.pending).waiting.remove(&self.id);
    }
}

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    args: &'a [Value],
}

#[derive(Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

pub struct TcpChannel {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: Pending,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
}

impl TcpChannel {
    /// `host:port` に接続
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| EdgarError::Connection(format!("{} ({})", e, addr)))?;
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        let pending: Pending = Arc::new(Mutex::new(PendingCalls::default()));
        let reader = tokio::spawn(read_responses(read_half, pending.clone()));

        info!(addr = %addr, "connected to backend");

        Ok(Self {
            writer: tokio::sync::Mutex::new(write_half),
            pending,
            next_id: AtomicU64::new(1),
            reader,
        })
    }

    /// 受信待ちの呼び出し数
    pub fn in_flight(&self) -> usize {
        lock(&self.pending).waiting.len()
    }
}

impl Drop for TcpChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl RpcChannel for TcpChannel {
    async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut frame = serde_json::to_vec(&Request {
            id,
            method: name,
            args: &args,
        })?;
        frame.push(b'\n');

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            if let Some(reason) = &pending.closed {
                return Err(EdgarError::Connection(reason.clone()));
            }
            pending.waiting.insert(id, tx);
        }
        let _registration = Registration {
            pending: &self.pending,
            id,
        };

        debug!(id, method = name, "rpc request");
        let written = {
            let mut writer = self.writer.lock().await;
            writer.write_all(&frame).await
        };
        if let Err(e) = written {
            return Err(EdgarError::Connection(e.to_string()));
        }

        rx.await
            .map_err(|_| EdgarError::Connection("response channel dropped".into()))?
    }
}

async fn read_responses(read_half: OwnedReadHalf, pending: Pending) {
    let mut lines = BufReader::new(read_half).lines();

    let reason = loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Response>(&line) {
                    Ok(response) => dispatch(&pending, response),
                    Err(e) => warn!(error = %e, "malformed response line from backend"),
                }
            }
            Ok(None) => break "connection closed by backend".to_string(),
            Err(e) => break e.to_string(),
        }
    };

    warn!(reason = %reason, "backend connection lost");
    let waiting = {
        let mut pending = lock(&pending);
        pending.closed = Some(reason.clone());
        std::mem::take(&mut pending.waiting)
    };
    for (_, tx) in waiting {
        let _ = tx.send(Err(EdgarError::Connection(reason.clone())));
    }
}

fn dispatch(pending: &Pending, response: Response) {
    let Some(tx) = lock(pending).waiting.remove(&response.id) else {
        debug!(id = response.id, "response for unknown call id");
        return;
    };

    let outcome = match response.error {
        Some(message) => Err(EdgarError::Backend(message)),
        None => Ok(response.result),
    };
    let _ = tx.send(outcome);
}
