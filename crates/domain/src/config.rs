//! # ステップ入力
//!
//! CI ランナーが標準入力に渡す JSON 設定と、その検証を定義する。
//!
//! ## 設計方針
//!
//! - **2 段階の型**: JSON をそのまま写した [`OutInput`] と、検証済みの
//!   [`OutRequest`] を分離する。後続の処理は [`OutRequest`] のみを受け取る
//! - **null は省略と同じ**: どのフィールドも `null` は未指定として扱う
//! - **空文字列は未指定**: 必須チェックは「空でないこと」で判定する
//! - **秘密情報のマスク**: [`SmtpPassword`] は Debug 出力で値を隠す
//!
//! ## 入力例
//!
//! ```json
//! {
//!   "source": {
//!     "smtp": {"host": "smtp.example.com", "port": "587", "username": "ci", "password": "secret"},
//!     "from": "ci@example.com",
//!     "to": ["team@example.com"]
//!   },
//!   "params": {"subject": "email/subject.txt", "body": "email/body.txt"}
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::ValidationError;

/// `null` を既定値として読み込む
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// SMTP パスワード
///
/// # セキュリティ
///
/// Debug 出力ではパスワードの値をマスクする。
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SmtpPassword(String);

impl std::fmt::Debug for SmtpPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SmtpPassword").field(&"[REDACTED]").finish()
    }
}

impl SmtpPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =========================================================================
// JSON 入力
// =========================================================================

/// ステップ入力（JSON のトップレベル）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutInput {
    #[serde(default, deserialize_with = "nullable")]
    pub source: SourceInput,
    #[serde(default, deserialize_with = "nullable")]
    pub params: ParamsInput,
}

/// `source` セクション（リソース定義側の設定）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceInput {
    #[serde(default, deserialize_with = "nullable")]
    pub smtp: SmtpInput,
    #[serde(default, deserialize_with = "nullable")]
    pub from: String,
    /// 静的な宛先リスト
    #[serde(default, deserialize_with = "nullable")]
    pub to:   Vec<String>,
}

/// `source.smtp` セクション
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpInput {
    #[serde(default, deserialize_with = "nullable")]
    pub host:      String,
    /// ポート番号（文字列で受け取る）
    #[serde(default, deserialize_with = "nullable")]
    pub port:      String,
    #[serde(default, deserialize_with = "nullable")]
    pub username:  String,
    #[serde(default, deserialize_with = "nullable")]
    pub password:  SmtpPassword,
    /// 省略時は false（認証あり）
    #[serde(default, deserialize_with = "nullable")]
    pub anonymous: bool,
}

/// `params` セクション（put ステップ側の設定）
///
/// パスはビルドソースのルートからの相対パス、または絶対パス。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamsInput {
    #[serde(default, deserialize_with = "nullable")]
    pub subject:         String,
    #[serde(default, deserialize_with = "nullable")]
    pub headers:         String,
    #[serde(default, deserialize_with = "nullable")]
    pub body:            String,
    /// カンマ区切りの宛先を含むファイルのパス
    #[serde(default, deserialize_with = "nullable")]
    pub to:              String,
    #[serde(default, deserialize_with = "nullable")]
    pub send_empty_body: bool,
}

impl OutInput {
    /// JSON バイト列をデコードする
    ///
    /// 構造が一致しない場合（型違い、壊れた JSON）は `serde_json::Error` を返す。
    /// 必須フィールドの欠落はここではエラーにせず、[`validate`](Self::validate) で検出する。
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// 必須フィールドを検証し、検証済みリクエストに変換する
    ///
    /// 検証は以下の順で行い、最初の違反でエラーを返す:
    ///
    /// 1. `source.smtp.host`
    /// 2. `source.smtp.port`
    /// 3. `source.from`
    /// 4. `source.to` または `params.to` のいずれか
    /// 5. `params.subject`
    /// 6. 匿名でない場合のみ `source.smtp.username`、`source.smtp.password`
    pub fn validate(self) -> Result<OutRequest, ValidationError> {
        let Self { source, params } = self;
        let SourceInput { smtp, from, to } = source;

        if smtp.host.is_empty() {
            return Err(ValidationError::MissingSmtpHost);
        }
        if smtp.port.is_empty() {
            return Err(ValidationError::MissingSmtpPort);
        }
        if from.is_empty() {
            return Err(ValidationError::MissingFrom);
        }
        if to.is_empty() && params.to.is_empty() {
            return Err(ValidationError::MissingRecipients);
        }
        if params.subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }

        let auth = if smtp.anonymous {
            SmtpAuth::Anonymous
        } else {
            if smtp.username.is_empty() {
                return Err(ValidationError::MissingSmtpUsername);
            }
            if smtp.password.is_empty() {
                return Err(ValidationError::MissingSmtpPassword);
            }
            SmtpAuth::Plain {
                username: smtp.username,
                password: smtp.password,
            }
        };

        Ok(OutRequest {
            server: SmtpServer {
                host: smtp.host,
                port: smtp.port,
            },
            auth,
            from,
            static_to: to,
            sources: MessageSources {
                subject:    PathBuf::from(params.subject),
                headers:    non_empty_path(params.headers),
                body:       non_empty_path(params.body),
                recipients: non_empty_path(params.to),
            },
            send_empty_body: params.send_empty_body,
        })
    }
}

fn non_empty_path(value: String) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

// =========================================================================
// 検証済みリクエスト
// =========================================================================

/// 接続先 SMTP サーバー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpServer {
    pub host: String,
    /// ポート番号（数値への変換は送信時に行う）
    pub port: String,
}

impl SmtpServer {
    /// `host:port` 形式のアドレス
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SMTP 認証方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpAuth {
    /// 認証なしで送信する
    Anonymous,
    /// PLAIN 認証（接続先ホストに対してのみ資格情報を提示する）
    Plain {
        username: String,
        password: SmtpPassword,
    },
}

impl SmtpAuth {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// メッセージを構成するファイルのパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSources {
    pub subject:    PathBuf,
    pub headers:    Option<PathBuf>,
    pub body:       Option<PathBuf>,
    /// カンマ区切りの宛先ファイル
    pub recipients: Option<PathBuf>,
}

/// 検証済みのステップ入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutRequest {
    pub server:          SmtpServer,
    pub auth:            SmtpAuth,
    pub from:            String,
    /// `source.to` の宛先（順序を保持）
    pub static_to:       Vec<String>,
    pub sources:         MessageSources,
    pub send_empty_body: bool,
}
