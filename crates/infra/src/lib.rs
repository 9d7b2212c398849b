//! # mailstep インフラ層
//!
//! 外部リソース（ファイルシステム、SMTP サーバー）とのやり取りを担当する。
//!
//! ## 設計方針
//!
//! - **ドメイン層の型を受け取る**: 検証済みの値だけを扱い、入力検証は行わない
//! - **エラーは [`InfraError`] に集約**: 呼び出し経路（SpanTrace）付きで返す
//! - **送信は trait 越し**: ユースケースは [`transmitter::MailTransmitter`] にのみ依存する
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー
//! - [`source_reader`] - ビルドソースの読み込みとトークン置換
//! - [`transmitter`] - SMTP 送信
//! - `mock` - テスト用モック（`test-utils` feature）

pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod source_reader;
pub mod transmitter;

pub use error::{InfraError, InfraErrorKind};
pub use source_reader::SourceReader;
