//! 対話式ブラウザ
//!
//! エンティティ検索 → 期間・書式の指定 → 提出書類の選択でキューを組み立て、
//! 出力先とNERの有無を決めて抽出を依頼する。ジョブ状態は裏でポーリングし続ける。

use crate::display::{filing_row, print_alerts, print_entities, print_queue};
use crate::error::{EdgarError, Result};
use crate::monitor::watch_job;
use crate::session::Session;
use crate::store::AlertArea;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use edgar_common::{parse_date, EntityResult};
use std::path::PathBuf;

/// メニュー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseAction {
    /// 別のエンティティを検索
    Search,
    /// 期間・書式を変えて再検索
    Refine,
    /// 検索結果からキューを編集
    Pick,
    /// キューを表示
    ShowQueue,
    /// ファイルからインポート
    Import,
    /// 抽出を依頼
    Extract,
    /// 終了
    Quit,
}

const MENU: &[(BrowseAction, &str)] = &[
    (BrowseAction::Search, "エンティティを検索"),
    (BrowseAction::Refine, "期間・書式を変更"),
    (BrowseAction::Pick, "検索結果からキューを編集"),
    (BrowseAction::ShowQueue, "キューを表示"),
    (BrowseAction::Import, "ファイルからインポート"),
    (BrowseAction::Extract, "抽出を依頼"),
    (BrowseAction::Quit, "終了"),
];

fn prompt_err(e: dialoguer::Error) -> EdgarError {
    EdgarError::Prompt(e.to_string())
}

pub async fn run_browse(session: &Session) -> Result<()> {
    let poller = session.start_poller();

    let outcome = browse_loop(session).await;

    poller.abort();
    outcome
}

async fn browse_loop(session: &Session) -> Result<()> {
    loop {
        print_alerts(session.store());
        session.store().clear_alerts(AlertArea::Search);

        let busy = if session.store().job_busy() { " (抽出処理中)" } else { "" };
        let labels: Vec<&str> = MENU.iter().map(|(_, label)| *label).collect();
        let choice = Select::new()
            .with_prompt(format!("操作を選択{}", busy))
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        match MENU[choice].0 {
            BrowseAction::Search => search_entity(session).await?,
            BrowseAction::Refine => refine_criteria(session).await?,
            BrowseAction::Pick => pick_filings(session)?,
            BrowseAction::ShowQueue => print_queue(session.store()),
            BrowseAction::Import => import_from_file(session).await?,
            BrowseAction::Extract => extract(session).await?,
            BrowseAction::Quit => return Ok(()),
        }
    }
}

async fn search_entity(session: &Session) -> Result<()> {
    let query: String = Input::new()
        .with_prompt("エンティティ名/CIK")
        .interact_text()
        .map_err(prompt_err)?;

    let suggester = session.suggester();
    suggester.input(query);
    suggester.settled().await;

    let results = suggester.snapshot().results;
    if results.is_empty() {
        print_entities(&results);
        return Ok(());
    }

    let Some(entity) = select_entity(&results)? else {
        return Ok(());
    };
    println!("→ {} ({})", entity.name, entity.cik);

    let forms = session.forms();
    forms.select_entity(Some(entity.cik.clone()));
    forms.settled().await;
    pick_filings(session)
}

fn select_entity(results: &[EntityResult]) -> Result<Option<EntityResult>> {
    let mut items: Vec<String> = results
        .iter()
        .map(|e| format!("{}  {}", e.cik, e.name))
        .collect();
    items.push("（戻る）".to_string());

    let choice = Select::new()
        .with_prompt("エンティティを選択")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    Ok(results.get(choice).cloned())
}

async fn refine_criteria(session: &Session) -> Result<()> {
    let forms = session.forms();
    let current = forms.criteria();

    let start: String = Input::new()
        .with_prompt("開始日")
        .default(current.start.to_string())
        .interact_text()
        .map_err(prompt_err)?;
    let end: String = Input::new()
        .with_prompt("終了日")
        .default(current.end.to_string())
        .interact_text()
        .map_err(prompt_err)?;
    let form_types: String = Input::new()
        .with_prompt("書式（カンマ区切り）")
        .default(current.forms.join(","))
        .interact_text()
        .map_err(prompt_err)?;

    match (parse_date(&start), parse_date(&end)) {
        (Ok(start), Ok(end)) => forms.set_dates(start, end),
        (Err(e), _) | (_, Err(e)) => {
            session.store().add_alert(AlertArea::Search, e.to_string());
            return Ok(());
        }
    }
    forms.set_forms(
        form_types
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
    );
    forms.settled().await;

    pick_filings(session)
}

/// 検索結果のチェック状態をキューに反映
fn pick_filings(session: &Session) -> Result<()> {
    let store = session.store();
    let results = store.results();
    if results.is_empty() {
        println!("検索結果がありません");
        return Ok(());
    }

    let items: Vec<String> = results.iter().map(filing_row).collect();
    let checked: Vec<bool> = results.iter().map(|f| store.is_queued(f.key())).collect();

    let selected = MultiSelect::new()
        .with_prompt("キューに入れる書類（Spaceで切替・Enterで確定）")
        .items(&items)
        .defaults(&checked)
        .interact()
        .map_err(prompt_err)?;

    for (idx, filing) in results.iter().enumerate() {
        let wanted = selected.contains(&idx);
        if wanted != store.is_queued(filing.key()) {
            store.toggle_queue(filing);
        }
    }

    println!("キュー: {}件", store.queue_len());
    Ok(())
}

async fn import_from_file(session: &Session) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("インポートファイル (.txt)")
        .interact_text()
        .map_err(prompt_err)?;

    let report = session.import_file(&PathBuf::from(path.trim())).await?;
    println!(
        "✔ {}行を取り込み、{}件をキューに追加（問題 {}件）",
        report.lines_imported,
        report.filings_added,
        report.issues.len()
    );
    Ok(())
}

async fn extract(session: &Session) -> Result<()> {
    if session.store().queue_len() == 0 {
        println!("キューが空です");
        return Ok(());
    }

    let default_dir = session.config().output_dir()?;
    let output: String = Input::new()
        .with_prompt("出力フォルダ")
        .default(default_dir.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    let perform_ner = Confirm::new()
        .with_prompt("固有表現抽出(NER)を実行しますか？")
        .default(session.config().perform_ner)
        .interact()
        .map_err(prompt_err)?;

    if let Some(submit) = session.bulk_extract(Some(PathBuf::from(output.trim())), perform_ner)? {
        let _ = submit.await;
    }

    let poller = session.poller();
    if let Some(state) = watch_job(&poller, session.config().poll_interval(), 5).await {
        println!("ジョブ状態: {}", state.state);
    }
    Ok(())
}
