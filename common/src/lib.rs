//! EDGAR Desk Common Library
//!
//! クライアント本体とフロントエンドで共有される型とユーティリティ

pub mod alert;
pub mod dates;
pub mod error;
pub mod parser;
pub mod types;

pub use alert::{alert_text, AlertData, AlertMap, BACKEND_JOB_ERROR_KEY, BACKEND_POLL_ERROR_KEY};
pub use dates::{format_iso_date, minimum_start_date, parse_date, MINIMUM_SEARCH_START_DATE};
pub use error::{Error, Result};
pub use parser::{normalize_cik, parse_import, parse_import_line, ImportEntry, ImportIssue};
pub use types::{
    Address, AddressParts, Addresses, BackendState, DocumentState, EntityResult, Filing,
    FilingEntry, FormData, JobState,
};
