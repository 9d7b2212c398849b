//! # out ステップ ライブラリ
//!
//! `out` バイナリのユースケースと報告処理を公開する。
//! 統合テストから内部モジュールを利用できるようにする。

pub mod config;
pub mod error;
pub mod report;
pub mod usecase;

pub use error::OutError;
pub use usecase::{OutUseCase, StepOutcome};
