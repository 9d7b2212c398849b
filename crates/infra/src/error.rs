//! # インフラ層エラー定義
//!
//! ファイル読み込みや SMTP 通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `std::io::Error`、lettre のエラーをラップ
//! - **ドメインエラーとの分離**: 入力検証エラーはドメイン層、I/O 由来はこちら
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（FileRead, Smtp 等）

use std::{fmt, path::PathBuf};

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
///
/// ## パターンマッチ
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::FileRead { path, .. } => { /* 読み込み失敗 */ }
///     _ => { /* 送信失敗 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 参照先ファイルの読み込み失敗
    #[error("failed to read {}: {source}", .path.display())]
    FileRead {
        /// 解決後のパス
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// メールアドレスとして解釈できない
    #[error("invalid address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source:  lettre::address::AddressError,
    },

    /// ポート番号として解釈できない
    #[error("invalid SMTP port {0:?}")]
    InvalidPort(String),

    /// エンベロープを構築できない（宛先なし等）
    #[error("invalid envelope: {0}")]
    Envelope(#[source] lettre::error::Error),

    /// 接続先ホストに対する TLS 設定を構築できない
    #[error("failed to configure TLS for {host:?}: {source}")]
    Tls {
        host:   String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    /// SMTP の接続・認証・送信エラー
    #[error("SMTP error: {0}")]
    Smtp(#[source] lettre::transport::smtp::Error),

    /// テスト用の送信で注入する失敗
    #[cfg(any(test, feature = "test-utils"))]
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    // ===== Convenience constructors =====

    fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    /// ファイル読み込みエラーを生成する
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(InfraErrorKind::FileRead {
            path: path.into(),
            source,
        })
    }

    /// アドレス解釈エラーを生成する
    pub fn invalid_address(
        address: impl Into<String>,
        source: lettre::address::AddressError,
    ) -> Self {
        Self::new(InfraErrorKind::InvalidAddress {
            address: address.into(),
            source,
        })
    }

    /// ポート番号解釈エラーを生成する
    pub fn invalid_port(port: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::InvalidPort(port.into()))
    }

    /// TLS 設定エラーを生成する
    pub fn tls(host: impl Into<String>, source: lettre::transport::smtp::Error) -> Self {
        Self::new(InfraErrorKind::Tls {
            host: host.into(),
            source,
        })
    }

    /// 予期しないエラーを生成する
    #[cfg(any(test, feature = "test-utils"))]
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Unexpected(msg.into()))
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<lettre::transport::smtp::Error> for InfraError {
    fn from(source: lettre::transport::smtp::Error) -> Self {
        Self::new(InfraErrorKind::Smtp(source))
    }
}

impl From<lettre::error::Error> for InfraError {
    fn from(source: lettre::error::Error) -> Self {
        Self::new(InfraErrorKind::Envelope(source))
    }
}
