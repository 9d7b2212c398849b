//! # メール送信
//!
//! 組み立て済みのメッセージを SMTP サーバーへ送るインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailTransmitter` trait で送信手段を抽象化
//! - **2 つの実装**: SMTP（本番）、Mock（テスト用、`test-utils` feature）
//! - **認証方式は呼び出しごと**: 匿名 / PLAIN 認証は [`SmtpAuth`] で毎回指定する

mod smtp;

use async_trait::async_trait;
use mailstep_domain::{
    config::{SmtpAuth, SmtpServer},
    message::OutgoingMail,
};
pub use smtp::SmtpMailTransmitter;

use crate::error::InfraError;

/// メール送信トレイト
#[async_trait]
pub trait MailTransmitter: Send + Sync {
    /// `server` に接続し、`auth` の方式で `mail` を送信する
    async fn transmit(
        &self,
        server: &SmtpServer,
        auth: &SmtpAuth,
        mail: &OutgoingMail,
    ) -> Result<(), InfraError>;
}
