//! セッション
//!
//! RPCブリッジ・状態ストア・2つのシーケンサー・ポーラーを1か所で組み立てる。
//! 各シーケンサーはこのセッションが所有し、グローバル状態は持たない。

use crate::config::Config;
use crate::error::{EdgarError, Result};
use crate::extract::bulk_extract;
use crate::forms::{FormsLookup, SearchCriteria};
use crate::import::{import_file, ImportReport};
use crate::poller::JobPoller;
use crate::rpc::{BackendClient, BackendProcess, Bridge, RpcChannel, TcpChannel};
use crate::store::{AlertArea, FilingStore};
use crate::suggest::EntitySuggester;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct Session {
    config: Config,
    bridge: Arc<Bridge>,
    backend: BackendClient,
    store: Arc<FilingStore>,
    suggester: EntitySuggester,
    forms: FormsLookup,
    process: Option<BackendProcess>,
}

impl Session {
    /// 未接続のセッション（接続前の呼び出しはすべて `NotConnected`）
    pub fn new(config: Config) -> Self {
        let bridge = Arc::new(Bridge::new());
        let backend = BackendClient::new(bridge.clone());
        let store = Arc::new(FilingStore::new());
        let suggester = EntitySuggester::new(backend.clone(), store.clone(), config.min_query_chars);
        let forms = FormsLookup::new(
            backend.clone(),
            store.clone(),
            SearchCriteria::new(config.default_forms.clone()),
        );

        Self {
            config,
            bridge,
            backend,
            store,
            suggester,
            forms,
            process: None,
        }
    }

    /// 既存のチャネルを接続済みとして使う
    pub fn with_channel(config: Config, channel: Arc<dyn RpcChannel>) -> Self {
        let session = Self::new(config);
        session.bridge.attach(channel);
        session
    }

    /// 設定に従って接続（実行ファイル指定があれば起動、なければアドレスへ接続）
    pub async fn connect(&mut self) -> Result<()> {
        let outcome = if let Some(executable) = self.config.backend_executable.clone() {
            self.launch(&executable).await
        } else if let Some(addr) = self.config.backend_addr() {
            self.connect_addr(&addr).await
        } else {
            Err(EdgarError::Config(
                "バックエンドのアドレスまたは実行ファイルが設定されていません".into(),
            ))
        };

        if let Err(e) = &outcome {
            self.store.add_alert(AlertArea::Search, e.alert_text());
        }
        outcome
    }

    pub async fn connect_addr(&self, addr: &str) -> Result<()> {
        let channel = TcpChannel::connect(addr).await?;
        self.bridge.attach(Arc::new(channel));
        Ok(())
    }

    /// ワーカーを起動し、ポート通知を受けてから接続
    pub async fn launch(&mut self, executable: &Path) -> Result<()> {
        let process = BackendProcess::launch(executable).await?;
        let channel = process.connect().await?;
        self.bridge.attach(Arc::new(channel));
        self.process = Some(process);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.bridge.is_connected()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn store(&self) -> &Arc<FilingStore> {
        &self.store
    }

    pub fn suggester(&self) -> &EntitySuggester {
        &self.suggester
    }

    pub fn forms(&self) -> &FormsLookup {
        &self.forms
    }

    pub fn poller(&self) -> JobPoller {
        JobPoller::new(
            self.backend.clone(),
            self.store.clone(),
            self.config.poll_interval(),
        )
    }

    pub fn start_poller(&self) -> JoinHandle<()> {
        self.poller().spawn()
    }

    /// キューの一括抽出（出力先省略時は設定値→デスクトップ）
    pub fn bulk_extract(
        &self,
        output: Option<PathBuf>,
        perform_ner: bool,
    ) -> Result<Option<JoinHandle<()>>> {
        let output = match output {
            Some(dir) => dir,
            None => self.config.output_dir()?,
        };
        Ok(bulk_extract(&self.store, &self.backend, output, perform_ner))
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportReport> {
        let forms = self.forms.criteria().forms;
        let report = import_file(path, &self.store, &self.backend, &forms).await?;
        info!(
            lines = report.lines_imported,
            filings = report.filings_added,
            issues = report.issues.len(),
            "batch import finished"
        );
        Ok(report)
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.bridge.detach();
        if let Some(process) = self.process.take() {
            process.shutdown().await?;
        }
        Ok(())
    }
}
