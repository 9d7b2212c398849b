//! # out ユースケース
//!
//! 入力検証 → ファイル読み込み → メッセージ組み立て → 送信 を 1 回だけ順に実行する。
//!
//! ## 状態遷移
//!
//! ```text
//! Validating → Resolving → Assembling → EmptyBodyCheck → Transmitting → Done
//!      │            │            │              │               │
//!      └────────────┴────────────┴──────┐       │               │
//!                                       ↓       ↓               ↓
//!                                    Failed  FailedAfterAssembly  Failed
//! ```
//!
//! `FailedAfterAssembly`（本文が空で送信を拒否）だけは出力レコードを伴う。
//! これを [`StepOutcome::Refused`] として通常の失敗（`Err`）と区別する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信手段と時刻は `Arc<dyn Trait>` で外部から注入
//! - **検証は I/O の前**: 検証に失敗した場合はファイルもネットワークも触らない
//! - **リトライしない**: どの段階の失敗もそのまま呼び出し元へ返す

use std::{path::Path, sync::Arc};

use mailstep_domain::{
    build_tokens::BuildTokens,
    clock::Clock,
    config::{OutInput, OutRequest},
    message::{ResolvedMessage, split_recipient_list, trim_newlines},
    output::OutputRecord,
};
use mailstep_infra::{SourceReader, transmitter::MailTransmitter};

use crate::error::OutError;

/// ステップの実行結果（エラー以外）
#[derive(Debug)]
pub enum StepOutcome {
    /// 送信完了
    Sent {
        /// 出力レコード（JSON）
        output: String,
    },
    /// 本文が空のため送信しなかった
    ///
    /// 出力レコードは確定済みで、送信していれば記録された内容を持つ。
    Refused {
        output: String,
        error:  OutError,
    },
}

impl StepOutcome {
    /// 出力レコード（JSON）
    pub fn output(&self) -> &str {
        match self {
            Self::Sent { output } | Self::Refused { output, .. } => output,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// out ステップのユースケース
pub struct OutUseCase {
    transmitter: Arc<dyn MailTransmitter>,
    clock:       Arc<dyn Clock>,
    tokens:      BuildTokens,
}

impl OutUseCase {
    pub fn new(
        transmitter: Arc<dyn MailTransmitter>,
        clock: Arc<dyn Clock>,
        tokens: BuildTokens,
    ) -> Self {
        Self {
            transmitter,
            clock,
            tokens,
        }
    }

    /// ステップを実行する
    ///
    /// # 引数
    ///
    /// - `source_root`: ビルドソースのルート（`None` または空なら `MissingArgument`）
    /// - `version`: 出力レコードの `version` メタデータに記録する値
    /// - `input`: ステップ入力の JSON
    pub async fn execute(
        &self,
        source_root: Option<&Path>,
        version: &str,
        input: &[u8],
    ) -> Result<StepOutcome, OutError> {
        let source_root = source_root
            .filter(|root| !root.as_os_str().is_empty())
            .ok_or(OutError::MissingArgument)?;

        // Validating
        let request = OutInput::from_slice(input)
            .map_err(OutError::MalformedInput)?
            .validate()
            .inspect_err(|e| tracing::warn!(field = e.field(), "入力検証に失敗しました"))?;
        tracing::info!(
            smtp_host = %request.server.host,
            anonymous = request.auth.is_anonymous(),
            "入力を検証しました"
        );

        // Resolving
        let reader = SourceReader::new(source_root, self.tokens.clone());
        let message = resolve_message(&reader, &request)?;
        tracing::info!(
            subject = %message.subject,
            recipients = message.recipients.len(),
            body_bytes = message.body.len(),
            "メッセージの内容を読み込みました"
        );

        // Assembling
        let output = OutputRecord::new(
            self.clock.now(),
            &request.server.host,
            &message.subject,
            version,
        )
        .to_json()
        .map_err(OutError::Serialization)?;
        let mail = message.assemble(&request.from);

        // EmptyBodyCheck
        if !request.send_empty_body && message.has_empty_body() {
            tracing::warn!("本文が空のため送信しません");
            return Ok(StepOutcome::Refused {
                output,
                error: OutError::EmptyBody,
            });
        }

        // Transmitting
        self.transmitter
            .transmit(&request.server, &request.auth, &mail)
            .await
            .map_err(OutError::Transmission)?;
        tracing::info!(
            server = %request.server.address(),
            recipients = mail.recipients.len(),
            "メールを送信しました"
        );

        Ok(StepOutcome::Sent { output })
    }
}

/// 参照先ファイルを読み込み、送信内容を確定する
fn resolve_message(
    reader: &SourceReader,
    request: &OutRequest,
) -> Result<ResolvedMessage, OutError> {
    let read = |path: &Path| reader.read(path).map_err(OutError::FileRead);
    let sources = &request.sources;

    let subject = trim_newlines(&read(sources.subject.as_path())?).to_string();

    let headers = match &sources.headers {
        Some(path) => Some(trim_newlines(&read(path.as_path())?).to_string()),
        None => None,
    };

    let body = match &sources.body {
        Some(path) => read(path.as_path())?,
        None => String::new(),
    };

    let mut recipients = request.static_to.clone();
    if let Some(path) = &sources.recipients {
        recipients.extend(split_recipient_list(&read(path.as_path())?));
    }

    Ok(ResolvedMessage {
        subject,
        headers,
        body,
        recipients,
    })
}
