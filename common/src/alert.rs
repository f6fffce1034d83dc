//! アラート表示状態
//!
//! 検索エリアとキュー（オフキャンバス）エリアでそれぞれ1つずつ保持される。
//! 通常のアラートはメッセージ本文をキーにするため、同じエラーが重複表示されない。

use std::collections::BTreeMap;

/// ジョブエラー用の固定スロット
pub const BACKEND_JOB_ERROR_KEY: &str = "backend_job_error";

/// ポーリング失敗用の固定スロット
pub const BACKEND_POLL_ERROR_KEY: &str = "backend_poll_error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertData {
    pub error_text: String,
    pub show_alert: bool,
}

impl AlertData {
    pub fn new(error_text: impl Into<String>) -> Self {
        Self {
            error_text: error_text.into(),
            show_alert: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertMap {
    entries: BTreeMap<String, AlertData>,
}

impl AlertMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本文をキーにして追加（既存なら上書き）
    pub fn add(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.entries.insert(text.clone(), AlertData::new(text));
    }

    /// 固定キーのスロットに設定
    pub fn set_slot(&mut self, key: &str, text: impl Into<String>) {
        self.entries.insert(key.to_string(), AlertData::new(text));
    }

    pub fn get(&self, key: &str) -> Option<&AlertData> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AlertData> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlertData)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 表示対象の本文一覧
    pub fn messages(&self) -> Vec<&str> {
        self.entries
            .values()
            .filter(|a| a.show_alert)
            .map(|a| a.error_text.as_str())
            .collect()
    }
}

/// エラーメッセージから表示用テキストを取り出す
///
/// `"APIConnectionError: The application failed..."` のように
/// エラークラス名が前置されている場合、最後のコロン以降を使う。
pub fn alert_text(message: &str) -> String {
    let tail = message.rsplit(':').next().unwrap_or(message).trim();
    if tail.is_empty() {
        message.trim().to_string()
    } else {
        tail.to_string()
    }
}
