//! # メッセージ
//!
//! 読み込み・置換済みのファイル内容から、SMTP で送る生のメッセージを組み立てる。
//!
//! ## 組み立て順序
//!
//! ```text
//! To: a@example.com, b@example.com
//! From: ci@example.com
//! X-Custom: value            ← ヘッダーファイルが空でない場合のみ
//! Subject: Build 42 passed
//!                            ← 空行
//! 本文...
//! ```
//!
//! エンコードやエスケープは行わない（プレーンテキスト前提）。
//! 行末は `\n` で、SMTP 上の `\r\n` への変換は送信側が行う。

/// 前後の改行文字（`\n`）を取り除く
///
/// 件名とヘッダーに適用する。空白やタブは残す。
pub fn trim_newlines(text: &str) -> &str {
    text.trim_matches('\n')
}

/// カンマ区切りの宛先リストを分解する
///
/// 各要素の前後の空白を取り除き、ファイル内の順序を保つ。
/// 内容が空の場合は空のリストを返す。
pub fn split_recipient_list(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split(',')
        .map(|address| address.trim().to_string())
        .collect()
}

/// 送信内容が確定したメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    /// 件名（前後の改行を除去済み）
    pub subject:    String,
    /// 追加ヘッダー（前後の改行を除去済み）
    pub headers:    Option<String>,
    /// 本文（加工しない）
    pub body:       String,
    /// 宛先（`source.to` → 宛先ファイルの順）
    pub recipients: Vec<String>,
}

impl ResolvedMessage {
    pub fn has_empty_body(&self) -> bool {
        self.body.is_empty()
    }

    /// 生のメッセージを組み立てる
    pub fn assemble(&self, from: &str) -> OutgoingMail {
        let mut raw = String::new();
        raw.push_str(&format!("To: {}\n", self.recipients.join(", ")));
        raw.push_str(&format!("From: {from}\n"));
        if let Some(headers) = self.headers.as_deref().filter(|h| !h.is_empty()) {
            raw.push_str(headers);
            raw.push('\n');
        }
        raw.push_str(&format!("Subject: {}\n", self.subject));
        raw.push('\n');
        raw.push_str(&self.body);

        OutgoingMail {
            from:       from.to_string(),
            recipients: self.recipients.clone(),
            raw:        raw.into_bytes(),
        }
    }
}

/// 送信可能な状態のメール（エンベロープ + 生データ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// エンベロープの送信元
    pub from:       String,
    /// エンベロープの宛先
    pub recipients: Vec<String>,
    /// ヘッダーと本文
    pub raw:        Vec<u8>,
}

impl OutgoingMail {
    /// 生データを文字列として返す（ログ・テスト用）
    pub fn raw_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}
