//! # out ステップ エラー定義
//!
//! ステップ全体で発生しうるエラーを 1 つの列挙型にまとめる。
//! どのバリアントも表示文字列がそのままビルドログに出るため、
//! 原因（欠落フィールド名、SMTP エラー）を含める。

use mailstep_domain::ValidationError;
use mailstep_infra::InfraError;
use thiserror::Error;

/// out ステップで発生するエラー
#[derive(Debug, Error)]
pub enum OutError {
    /// ビルドソースのルートが渡されていない
    #[error("expected path to build sources as first argument")]
    MissingArgument,

    /// 標準入力の JSON をデコードできない
    #[error("malformed input: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// 必須フィールドの欠落
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 参照先ファイルを読み込めない
    #[error("{0}")]
    FileRead(#[source] InfraError),

    /// 本文が空で `send_empty_body` が false
    #[error(
        "Message not sent because the message body is empty and send_empty_body parameter was set to false."
    )]
    EmptyBody,

    /// SMTP の接続・認証・送信に失敗
    #[error("failed to send message: {0}")]
    Transmission(#[source] InfraError),

    /// 出力レコードをエンコードできない
    #[error("failed to encode output: {0}")]
    Serialization(#[source] serde_json::Error),
}
