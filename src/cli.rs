use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edgar-desk")]
#[command(about = "SEC EDGAR提出書類の検索・キュー管理・抽出依頼ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// バックエンドのアドレス (host:port)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// バックエンド実行ファイル（起動してポート通知を待つ）
    #[arg(long, global = true)]
    pub launch: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// エンティティ名/CIKで候補を検索
    Search {
        /// 検索文字列（2文字以上）
        #[arg(required = true)]
        query: String,
    },

    /// CIKと期間から提出書類を一覧
    Forms {
        /// CIK（数字のみ・CIK付きどちらでも可）
        #[arg(required = true)]
        cik: String,

        /// 開始日（デフォルト: 2001-01-01）
        #[arg(short, long)]
        start: Option<String>,

        /// 終了日（デフォルト: 今日）
        #[arg(short, long)]
        end: Option<String>,

        /// 書式（複数指定可、デフォルト: 設定値）
        #[arg(short = 'f', long = "form")]
        forms: Vec<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// インポートファイル（CIK START END）を読み込んでキューを表示
    Import {
        /// インポートファイル (.txt)
        #[arg(required = true)]
        file: PathBuf,

        /// 書式（複数指定可）
        #[arg(short = 'f', long = "form")]
        forms: Vec<String>,
    },

    /// インポートしたキューを一括抽出して完了まで監視
    Extract {
        /// インポートファイル (.txt)
        #[arg(required = true)]
        file: PathBuf,

        /// 出力フォルダ（デフォルト: 設定値→デスクトップ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 固有表現抽出(NER)を実行
        #[arg(long)]
        ner: bool,

        /// 書式（複数指定可）
        #[arg(short = 'f', long = "form")]
        forms: Vec<String>,

        /// 投入だけして監視しない
        #[arg(long)]
        no_wait: bool,
    },

    /// バックエンドのジョブ状態を表示
    Status {
        /// 作業中の間は監視を続ける
        #[arg(short, long)]
        watch: bool,
    },

    /// 対話的に検索してキューを組み立て、抽出を依頼
    Browse,

    /// 設定を表示/編集
    Config {
        /// バックエンドのアドレスを設定
        #[arg(long)]
        set_backend: Option<String>,

        /// 出力フォルダを設定
        #[arg(long)]
        set_output: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
