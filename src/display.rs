//! 端末表示

use crate::store::{AlertArea, FilingStore};
use edgar_common::{EntityResult, Filing};

pub fn print_entities(results: &[EntityResult]) {
    if results.is_empty() {
        println!("該当するエンティティはありません");
        return;
    }
    for (i, entity) in results.iter().enumerate() {
        println!("{:>3}. {}  {}", i + 1, entity.cik, entity.name);
    }
}

/// 1行表記（キュー状態つき）
pub fn filing_row(filing: &Filing) -> String {
    format!(
        "[{:<11}] {:<8} {:<10} {}  {}",
        filing.status.to_string(),
        filing.filing_type,
        filing.filing_date,
        filing.entity_name,
        filing.document_address_10k
    )
}

pub fn print_filings(filings: &[Filing]) {
    if filings.is_empty() {
        println!("該当する提出書類はありません");
        return;
    }
    for filing in filings {
        println!("{}", filing_row(filing));
    }
}

/// キューを提出日順に表示
pub fn print_queue(store: &FilingStore) {
    let queue = store.queue();
    let mut filings: Vec<&Filing> = queue.values().collect();
    filings.sort_by(|a, b| {
        a.entity_name
            .cmp(&b.entity_name)
            .then_with(|| b.filing_date.cmp(&a.filing_date))
    });

    println!("キュー: {}件", filings.len());
    for filing in filings {
        println!("  {}", filing_row(filing));
    }
}

pub fn print_alerts(store: &FilingStore) {
    for (area, label) in [(AlertArea::Search, "検索"), (AlertArea::Queue, "キュー")] {
        let alerts = store.alerts(area);
        for message in alerts.messages() {
            eprintln!("⚠ [{}] {}", label, message);
        }
    }
}
