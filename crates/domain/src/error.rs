//! # 入力検証エラー
//!
//! ステップ入力の必須フィールド欠落を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **1 フィールド 1 バリアント**: どのフィールドが欠けていたかを型で表す
//! - **メッセージ互換**: `#[error(...)]` の文言は利用者がログで検索する前提で固定する
//! - **fail-fast**: 検証は最初の違反で止まるため、エラーは常に 1 つだけ
//!
//! ## 検証順序
//!
//! | 順序 | バリアント | フィールド |
//! |------|-----------|-----------|
//! | 1 | `MissingSmtpHost` | `source.smtp.host` |
//! | 2 | `MissingSmtpPort` | `source.smtp.port` |
//! | 3 | `MissingFrom` | `source.from` |
//! | 4 | `MissingRecipients` | `source.to` / `params.to` |
//! | 5 | `MissingSubject` | `params.subject` |
//! | 6 | `MissingSmtpUsername` | `source.smtp.username`（匿名でない場合のみ） |
//! | 7 | `MissingSmtpPassword` | `source.smtp.password`（匿名でない場合のみ） |

use thiserror::Error;

/// 必須フィールドの欠落
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(r#"missing required field "source.smtp.host""#)]
    MissingSmtpHost,

    #[error(r#"missing required field "source.smtp.port""#)]
    MissingSmtpPort,

    #[error(r#"missing required field "source.from""#)]
    MissingFrom,

    /// 静的な宛先リストと宛先ファイルのどちらも指定されていない
    #[error(r#"missing required field "source.to" or "params.to". Must specify at least one"#)]
    MissingRecipients,

    #[error(r#"missing required field "params.subject""#)]
    MissingSubject,

    #[error(
        r#"missing required field "source.smtp.username" if anonymous specify anonymous: true"#
    )]
    MissingSmtpUsername,

    #[error(
        r#"missing required field "source.smtp.password" if anonymous specify anonymous: true"#
    )]
    MissingSmtpPassword,
}

impl ValidationError {
    /// 欠落しているフィールドのパスを返す
    ///
    /// 宛先の欠落は 2 つのフィールドにまたがるため、両方を `" or "` で連結して返す。
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingSmtpHost => "source.smtp.host",
            Self::MissingSmtpPort => "source.smtp.port",
            Self::MissingFrom => "source.from",
            Self::MissingRecipients => "source.to or params.to",
            Self::MissingSubject => "params.subject",
            Self::MissingSmtpUsername => "source.smtp.username",
            Self::MissingSmtpPassword => "source.smtp.password",
        }
    }
}
