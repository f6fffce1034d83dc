use anyhow::Context;
use clap::Parser;
use edgar_common::{normalize_cik, parse_date};
use edgar_desk::{browse, cli, config, display, monitor, session};
use cli::{Cli, Commands};
use config::Config;
use session::Session;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load().context("設定の読み込みに失敗")?;

    // 接続不要のコマンド
    if let Commands::Config { set_backend, set_output, show } = &cli.command {
        if let Some(addr) = set_backend {
            config.set_backend_addr(addr.clone())?;
            println!("✔ バックエンドのアドレスを設定しました");
        }
        if let Some(dir) = set_output {
            config.set_output_dir(dir.clone())?;
            println!("✔ 出力フォルダを設定しました");
        }
        if *show {
            println!("設定: {}", Config::config_path()?.display());
            println!("  アドレス: {}", config.backend_addr().as_deref().unwrap_or("未設定"));
            println!(
                "  実行ファイル: {}",
                config
                    .backend_executable
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "未設定".into())
            );
            println!("  ポーリング間隔: {}ms", config.poll_interval_ms);
            println!("  最小検索文字数: {}", config.min_query_chars);
            println!("  書式: {}", config.default_forms.join(", "));
            println!("  出力フォルダ: {}", config.output_dir()?.display());
            println!("  NER: {}", if config.perform_ner { "有効" } else { "無効" });
        }
        return Ok(());
    }

    let mut session = Session::new(config);
    if let Some(executable) = &cli.launch {
        session.launch(executable).await?;
    } else if let Some(addr) = &cli.backend {
        session.connect_addr(addr).await?;
    } else {
        session.connect().await?;
    }

    let outcome = run(&session, cli.command).await;
    display::print_alerts(session.store());
    session.shutdown().await?;
    outcome
}

async fn run(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Search { query } => {
            let suggester = session.suggester();
            suggester.input(query);
            suggester.settled().await;
            display::print_entities(&suggester.snapshot().results);
        }

        Commands::Forms { cik, start, end, forms, json } => {
            let lookup = session.forms();
            let criteria = lookup.criteria();
            let start = match start {
                Some(text) => parse_date(&text)?,
                None => criteria.start,
            };
            let end = match end {
                Some(text) => parse_date(&text)?,
                None => criteria.end,
            };

            if !forms.is_empty() {
                lookup.set_forms(forms);
            }
            lookup.set_dates(start, end);
            lookup.select_entity(Some(normalize_cik(&cik)?));
            lookup.settled().await;

            let results = session.store().results();
            if json {
                println!("{}", serde_json::to_string_pretty(results.as_slice())?);
            } else {
                display::print_filings(&results);
            }
        }

        Commands::Import { file, forms } => {
            import(session, &file, forms).await?;
            display::print_queue(session.store());
        }

        Commands::Extract { file, output, ner, forms, no_wait } => {
            println!("📥 edgar-desk - 一括抽出\n");

            println!("[1/3] インポート中...");
            import(session, &file, forms).await?;
            display::print_queue(session.store());

            println!("\n[2/3] 抽出を依頼中...");
            let ner = ner || session.config().perform_ner;
            let Some(submit) = session.bulk_extract(output, ner)? else {
                return Ok(());
            };
            submit.await.context("抽出依頼タスクが異常終了しました")?;

            if no_wait {
                println!("✔ 依頼しました");
                return Ok(());
            }

            println!("[3/3] 処理を監視中...");
            let poller = session.poller();
            match monitor::watch_job(&poller, session.config().poll_interval(), 5).await {
                Some(state) => println!("\n✅ ジョブ状態: {}", state.state),
                None => println!("\nジョブ状態を取得できませんでした"),
            }
        }

        Commands::Status { watch } => {
            let poller = session.poller();
            let state = if watch {
                monitor::watch_job(&poller, session.config().poll_interval(), 0).await
            } else {
                poller.poll_once().await
            };
            if let Some(state) = state {
                println!("ジョブ状態: {}", state.state);
                if let Some(error) = state.error {
                    println!("  エラー: {}", error);
                }
            }
        }

        Commands::Browse => {
            println!("🔎 edgar-desk - 対話モード\n");
            browse::run_browse(session).await?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn import(session: &Session, file: &std::path::Path, forms: Vec<String>) -> anyhow::Result<()> {
    if !forms.is_empty() {
        session.forms().set_forms(forms);
        session.forms().settled().await;
    }

    let report = session.import_file(file).await?;
    println!(
        "✔ {}行を取り込み、{}件をキューに追加",
        report.lines_imported, report.filings_added
    );
    for issue in &report.issues {
        println!("  - {}", issue);
    }
    Ok(())
}
