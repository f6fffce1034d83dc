//! データモデル定義
//!
//! バックエンドとの間でやり取りされる型:
//! - EntityResult: `search` の結果（エンティティ名とCIK）
//! - FormData / FilingEntry: `search_form_info` の結果
//! - Filing: キューに積まれ `process_filing_set` に渡される提出書類
//! - BackendState: `get_job_state` の結果

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// エンティティ検索結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityResult {
    pub cik: String,
    #[serde(rename = "entity")]
    pub name: String,
}

/// 提出書類の状態（SEARCH → IN_QUEUE → IN_PROGRESS → DONE）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentState {
    #[default]
    Search,
    InQueue,
    InProgress,
    Done,
}

impl std::fmt::Display for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentState::Search => write!(f, "SEARCH"),
            DocumentState::InQueue => write!(f, "IN_QUEUE"),
            DocumentState::InProgress => write!(f, "IN_PROGRESS"),
            DocumentState::Done => write!(f, "DONE"),
        }
    }
}

/// 提出書類1件
///
/// `document_address_10k` が一意キー。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filing {
    pub entity_name: String,
    pub cik_number: String,
    pub filing_type: String,
    pub filing_date: String,
    pub document_address_10k: String,
    pub extract_info: bool,
    pub state_of_incorporation: String,
    pub ein: String,
    pub hq_address: String,
    pub status: DocumentState,
}

impl Filing {
    /// キュー上のキー
    pub fn key(&self) -> &str {
        &self.document_address_10k
    }
}

/// 住所ブロック
///
/// バックエンドは文字列またはEDGARの構造化オブジェクトを返す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Text(String),
    Parts(AddressParts),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressParts {
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state_or_country: Option<String>,
    pub zip_code: Option<String>,
}

impl Address {
    /// 1行表記（空要素は除外）
    pub fn one_line(&self) -> String {
        match self {
            Address::Text(text) => text.trim().to_string(),
            Address::Parts(parts) => [
                &parts.street1,
                &parts.street2,
                &parts.city,
                &parts.state_or_country,
                &parts.zip_code,
            ]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Addresses {
    pub mailing: Option<Address>,
    pub business: Option<Address>,
}

/// `search_form_info` の提出書類エントリ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilingEntry {
    pub report_date: String,
    pub filing_date: String,
    pub document: String,
    pub form: String,
    #[serde(rename = "isXBRL")]
    pub is_xbrl: bool,
    #[serde(rename = "isInlineXBRL")]
    pub is_inline_xbrl: bool,
}

/// `search_form_info` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub cik: String,
    pub issuing_entity: String,
    pub state_of_incorporation: Option<String>,
    pub ein: Option<String>,
    pub forms: Vec<String>,
    pub address: Addresses,
    pub filings: Vec<FilingEntry>,
}

impl FormData {
    /// JSON値からパース（`null` は該当なし）
    pub fn from_value(value: serde_json::Value) -> Result<Option<Self>> {
        Ok(serde_json::from_value(value)?)
    }

    /// 本社所在地（事業所住所を優先、なければ郵送先）
    pub fn hq_address(&self) -> String {
        self.address
            .business
            .as_ref()
            .or(self.address.mailing.as_ref())
            .map(Address::one_line)
            .unwrap_or_default()
    }

    /// 提出書類エントリごとに `Filing` を生成
    pub fn to_filings(&self) -> Vec<Filing> {
        let hq_address = self.hq_address();
        self.filings
            .iter()
            .map(|entry| Filing {
                entity_name: self.issuing_entity.clone(),
                cik_number: self.cik.clone(),
                filing_type: entry.form.clone(),
                filing_date: entry.filing_date.clone(),
                document_address_10k: entry.document.clone(),
                extract_info: true,
                state_of_incorporation: self.state_of_incorporation.clone().unwrap_or_default(),
                ein: self.ein.clone().unwrap_or_default(),
                hq_address: hq_address.clone(),
                status: DocumentState::Search,
            })
            .collect()
    }
}

/// バックエンドのジョブ状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    #[serde(rename = "No Work")]
    NoWork,
    Working,
    Complete,
    Error,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::NoWork => write!(f, "No Work"),
            JobState::Working => write!(f, "Working"),
            JobState::Complete => write!(f, "Complete"),
            JobState::Error => write!(f, "Error"),
        }
    }
}

/// `get_job_state` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendState {
    pub state: JobState,
    #[serde(default)]
    pub error: Option<String>,
}
