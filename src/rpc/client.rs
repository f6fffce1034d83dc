//! 型付きバックエンドクライアント

use super::RpcChannel;
use crate::error::{EdgarError, Result};
use chrono::NaiveDate;
use edgar_common::{format_iso_date, BackendState, EntityResult, Filing, FormData};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

pub const SEARCH: &str = "search";
pub const SEARCH_FORM_INFO: &str = "search_form_info";
pub const PROCESS_FILING_SET: &str = "process_filing_set";
pub const GET_JOB_STATE: &str = "get_job_state";

#[derive(Clone)]
pub struct BackendClient {
    channel: Arc<dyn RpcChannel>,
}

impl BackendClient {
    pub fn new(channel: Arc<dyn RpcChannel>) -> Self {
        Self { channel }
    }

    /// エンティティ名/CIKの候補検索
    ///
    /// `cik` と `entity` の揃っていない要素は読み飛ばす。
    pub async fn search(&self, query: &str) -> Result<Vec<EntityResult>> {
        let value = self.channel.invoke(SEARCH, vec![json!(query)]).await?;
        let items: Option<Vec<Value>> = decode(SEARCH, value)?;

        Ok(items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    /// CIK・書式・期間から提出書類を検索（該当なしは `None`）
    pub async fn search_form_info(
        &self,
        cik: &str,
        forms: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<FormData>> {
        let args = vec![
            json!(cik),
            json!(forms),
            json!(format_iso_date(start)),
            json!(format_iso_date(end)),
        ];
        let value = self.channel.invoke(SEARCH_FORM_INFO, args).await?;
        decode(SEARCH_FORM_INFO, value)
    }

    /// 抽出ジョブを投入（完了はジョブ状態のポーリングで確認する）
    pub async fn process_filing_set(
        &self,
        filings: &[Filing],
        output_path: &Path,
        perform_ner: bool,
    ) -> Result<()> {
        let args = vec![
            serde_json::to_value(filings)?,
            json!(output_path.to_string_lossy()),
            json!(perform_ner),
        ];
        self.channel.invoke(PROCESS_FILING_SET, args).await?;
        Ok(())
    }

    pub async fn get_job_state(&self) -> Result<BackendState> {
        let value = self.channel.invoke(GET_JOB_STATE, Vec::new()).await?;
        decode(GET_JOB_STATE, value)
    }
}

fn decode<T: DeserializeOwned>(procedure: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| EdgarError::Decode(format!("{} ({})", e, procedure)))
}
