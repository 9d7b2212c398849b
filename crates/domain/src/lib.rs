//! # mailstep ドメイン層
//!
//! メール通知ステップの中核となるモデルを定義する。
//!
//! ## 設計方針
//!
//! - **I/O を持たない**: ファイル読み込みや SMTP 通信はインフラ層が担当し、
//!   このクレートは値の検証・組み立て・シリアライズのみを扱う
//! - **検証済みの型**: JSON 入力は [`config::OutInput`] として受け取り、
//!   検証を通過した値だけが [`config::OutRequest`] になる
//! - **注入可能な環境**: ビルド情報（環境変数）は [`build_tokens::BuildTokens`]
//!   として一度だけ読み取り、以降は不変の値として扱う
//!
//! ## 依存関係の方向
//!
//! ```text
//! out → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`build_tokens`] - `${BUILD_ID}` などのプレースホルダ置換
//! - [`clock`] - 出力レコードのタイムスタンプ用時刻プロバイダ
//! - [`config`] - ステップ入力（JSON）と検証
//! - [`error`] - 入力検証エラー
//! - [`message`] - メッセージ本文の組み立てと宛先リスト
//! - [`output`] - ステップの出力レコード
//!
//! ## 使用例
//!
//! ```rust
//! use mailstep_domain::config::OutInput;
//!
//! let input = OutInput::from_slice(br#"{"source": {"smtp": {}}}"#).unwrap();
//! let error = input.validate().unwrap_err();
//!
//! assert_eq!(error.field(), "source.smtp.host");
//! ```

pub mod build_tokens;
pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod output;

pub use error::ValidationError;
