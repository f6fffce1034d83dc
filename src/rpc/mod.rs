//! バックエンドRPCチャネル
//!
//! バックエンドワーカーとの間の単一の双方向接続を、
//! `invoke(name, args) -> result` の1操作だけに絞って公開する。
//! リトライは行わない（呼び出し側の責務）。

mod client;
mod launcher;
mod tcp;

pub use client::{BackendClient, GET_JOB_STATE, PROCESS_FILING_SET, SEARCH, SEARCH_FORM_INFO};
pub use launcher::{parse_port_announcement, BackendProcess};
pub use tcp::TcpChannel;

use crate::error::{EdgarError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};

/// RPC呼び出しの抽象
#[async_trait]
pub trait RpcChannel: Send + Sync {
    async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value>;
}

/// 接続スロット
///
/// ハンドシェイク完了前の呼び出しはキューに溜めず、即座に `NotConnected` で失敗させる。
#[derive(Default)]
pub struct Bridge {
    channel: RwLock<Option<Arc<dyn RpcChannel>>>,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続済みトランスポートを設定（既存の接続は置き換え）
    pub fn attach(&self, channel: Arc<dyn RpcChannel>) {
        *self.channel.write().unwrap_or_else(PoisonError::into_inner) = Some(channel);
        tracing::info!("backend channel attached");
    }

    pub fn detach(&self) {
        self.channel
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_connected(&self) -> bool {
        self.channel
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current(&self) -> Option<Arc<dyn RpcChannel>> {
        self.channel
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RpcChannel for Bridge {
    async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let channel = self.current().ok_or(EdgarError::NotConnected)?;
        channel.invoke(name, args).await
    }
}
