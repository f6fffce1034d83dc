use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("バックエンドに接続されていません")]
    NotConnected,

    #[error("バックエンド接続エラー: {0}")]
    Connection(String),

    #[error("バックエンド起動エラー: {0}")]
    Launch(String),

    #[error("バックエンド呼び出しエラー: {0}")]
    Backend(String),

    #[error("レスポンスの解析に失敗: {0}")]
    Decode(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] edgar_common::Error),
}

impl EdgarError {
    /// アラートに表示する本文
    ///
    /// バックエンドが返したエラーだけは先頭のエラークラス名を落とす。
    /// ローカルのエラーはアドレスやパスにコロンを含むため全文を使う。
    pub fn alert_text(&self) -> String {
        match self {
            EdgarError::Backend(message) => edgar_common::alert_text(message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EdgarError>;
