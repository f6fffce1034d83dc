//! EDGAR Desk
//!
//! SEC EDGAR の提出書類を検索してキューに積み、外部ワーカーへ一括抽出を依頼するクライアント。

pub mod browse;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod extract;
pub mod forms;
pub mod import;
pub mod monitor;
pub mod poller;
pub mod rpc;
pub mod sequencer;
pub mod session;
pub mod store;
pub mod suggest;
