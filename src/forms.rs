//! 提出書類の候補検索
//!
//! CIK・期間・書式のいずれかが変わるたびにトリガーを積む。
//! 検索条件は実行時点の値を読むため、トリガー自体は引数を持たない。

use crate::rpc::BackendClient;
use crate::sequencer::RequestSequencer;
use crate::store::{AlertArea, FilingStore};
use chrono::{Local, NaiveDate};
use edgar_common::minimum_start_date;
use futures::FutureExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// 検索条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub cik: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub forms: Vec<String>,
}

impl SearchCriteria {
    /// 2001-01-01 から今日まで
    pub fn new(forms: Vec<String>) -> Self {
        Self {
            cik: None,
            start: minimum_start_date(),
            end: Local::now().date_naive(),
            forms,
        }
    }
}

type SharedCriteria = Arc<Mutex<SearchCriteria>>;

fn lock(criteria: &SharedCriteria) -> MutexGuard<'_, SearchCriteria> {
    criteria.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct FormsLookup {
    sequencer: RequestSequencer<()>,
    criteria: SharedCriteria,
}

impl FormsLookup {
    pub fn new(backend: BackendClient, store: Arc<FilingStore>, criteria: SearchCriteria) -> Self {
        let criteria = Arc::new(Mutex::new(criteria));
        let handler_criteria = criteria.clone();

        let sequencer = RequestSequencer::new("suggested-forms", move |()| {
            let backend = backend.clone();
            let store = store.clone();
            let criteria = handler_criteria.clone();
            async move { lookup(&backend, &store, &criteria).await }.boxed()
        });

        Self {
            sequencer,
            criteria,
        }
    }

    pub fn criteria(&self) -> SearchCriteria {
        lock(&self.criteria).clone()
    }

    /// エンティティ選択（`None` で選択解除）
    pub fn select_entity(&self, cik: Option<String>) {
        lock(&self.criteria).cik = cik;
        self.sequencer.enqueue(());
    }

    pub fn set_dates(&self, start: NaiveDate, end: NaiveDate) {
        {
            let mut criteria = lock(&self.criteria);
            criteria.start = start;
            criteria.end = end;
        }
        self.sequencer.enqueue(());
    }

    pub fn set_forms(&self, forms: Vec<String>) {
        lock(&self.criteria).forms = forms;
        self.sequencer.enqueue(());
    }

    /// 現在の条件で再検索
    pub fn refresh(&self) {
        self.sequencer.enqueue(());
    }

    pub async fn settled(&self) {
        self.sequencer.wait_idle().await;
    }
}

async fn lookup(backend: &BackendClient, store: &FilingStore, criteria: &SharedCriteria) {
    let criteria = lock(criteria).clone();

    let Some(cik) = criteria.cik else {
        store.clear_results();
        return;
    };

    if criteria.start > criteria.end {
        store.add_alert(
            AlertArea::Search,
            format!("開始日 {} が終了日 {} より後です", criteria.start, criteria.end),
        );
        return;
    }

    debug!(cik = %cik, forms = ?criteria.forms, start = %criteria.start, end = %criteria.end, "looking up filings");
    match backend
        .search_form_info(&cik, &criteria.forms, criteria.start, criteria.end)
        .await
    {
        Ok(Some(data)) => store.set_results(data.to_filings()),
        Ok(None) => store.clear_results(),
        Err(e) => {
            warn!(error = %e, cik = %cik, "filing lookup failed");
            store.add_alert(AlertArea::Search, e.alert_text());
        }
    }
}
