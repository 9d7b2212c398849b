//! # out ステップ
//!
//! CI パイプラインの put ステップとして、ビルド結果をメールで通知する。
//!
//! ## 役割
//!
//! ```text
//! ┌──────────────┐  stdin: JSON   ┌──────────────┐   SMTP   ┌──────────────┐
//! │  CI ランナー  │──────────────→│     out      │────────→│ SMTP サーバー │
//! │              │←──────────────│              │         └──────────────┘
//! └──────────────┘ stdout: JSON   └──────────────┘
//!                                        ↑
//!                              ビルドソース（件名・本文ファイル）
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `BUILD_ID` ほか 5 つ | No | ファイル内の `${BUILD_ID}` 等に埋め込まれる値 |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,mailstep=debug`） |
//!
//! ## 起動方法
//!
//! ```bash
//! echo '{"source": {...}, "params": {...}}' | out /tmp/build/sources
//! ```

use std::{io::Read, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use mailstep_domain::clock::SystemClock;
use mailstep_infra::transmitter::SmtpMailTransmitter;
use mailstep_out::{
    OutUseCase,
    config::{OutConfig, STEP_VERSION},
    report::Report,
};
use mailstep_shared::observability::init_tracing;
use tracing::Instrument as _;

/// ビルド結果をメールで通知する put ステップ
#[derive(Debug, Parser)]
#[command(name = "out", version)]
struct Cli {
    /// ビルドソースのルートディレクトリ
    source_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 設定読み込み（ビルドトークンはここで一度だけ読み取る）
    let config = OutConfig::from_env();

    // トレーシング初期化
    init_tracing(config.log_format);

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("標準入力の読み込みに失敗しました")?;

    let usecase = OutUseCase::new(
        Arc::new(SmtpMailTransmitter::new()),
        Arc::new(SystemClock),
        config.build_tokens,
    );

    let span = tracing::info_span!("out", version = STEP_VERSION);
    let result = usecase
        .execute(cli.source_root.as_deref(), STEP_VERSION, &input)
        .instrument(span)
        .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "ステップが失敗しました");
    }

    Ok(Report::from_result(&result).emit())
}
