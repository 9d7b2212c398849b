//! # ログ出力
//!
//! ステップのログはすべて **stderr** に書く。stdout は CI ランナーが読み取る
//! 出力レコード（JSON）専用で、ログを 1 行でも混ぜると出力が壊れる。
//!
//! | 変数 | 値 | 既定 |
//! |------|----|------|
//! | `LOG_FORMAT` | `json` / `pretty`（大文字小文字は区別しない） | `pretty` |
//! | `RUST_LOG` | `EnvFilter` の書式 | [`DEFAULT_LOG_FILTER`] |

use std::str::FromStr;

use thiserror::Error;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,mailstep=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON
    Json,
    /// ビルドログでそのまま読める形式
    #[default]
    Pretty,
}

/// `LOG_FORMAT` に解釈できない値が指定された
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown LOG_FORMAT {0:?}, expected \"json\" or \"pretty\"")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "" => Ok(Self::Pretty),
            _ => Err(UnknownLogFormat(s.to_string())),
        }
    }
}

impl LogFormat {
    /// `LOG_FORMAT` から読み取る
    ///
    /// トレーシング初期化前に呼ばれるため、不正な値の警告は stderr に直接書いて
    /// [`Pretty`](LogFormat::Pretty) で続行する。
    pub fn from_env() -> Self {
        let Ok(value) = std::env::var("LOG_FORMAT") else {
            return Self::default();
        };
        value.parse().unwrap_or_else(|e: UnknownLogFormat| {
            eprintln!("WARNING: {e}, falling back to pretty");
            Self::Pretty
        })
    }
}

/// `RUST_LOG` があればそれを、なければ [`DEFAULT_LOG_FILTER`] を使うフィルタ
#[cfg(feature = "observability")]
fn env_filter(rust_log: Option<&str>) -> tracing_subscriber::EnvFilter {
    rust_log
        .and_then(|directives| tracing_subscriber::EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// グローバル subscriber を登録する
///
/// `tracing_error::ErrorLayer` も登録し、インフラ層エラーの SpanTrace を有効にする。
#[cfg(feature = "observability")]
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let rust_log = std::env::var("RUST_LOG").ok();

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(rust_log.as_deref()))
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();
}
