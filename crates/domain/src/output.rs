//! # 出力レコード
//!
//! ステップ完了時に標準出力へ書き出す JSON。CI ランナーはこれを
//! リソースのバージョンとメタデータとして記録する。
//!
//! ```json
//! {
//!   "version": {"time": "2026-10-19T09:00:00Z"},
//!   "metadata": [
//!     {"name": "smtp_host", "value": "smtp.example.com"},
//!     {"name": "subject", "value": "Build 42 passed"},
//!     {"name": "version", "value": "0.1.0"}
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 出力レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub version:  OutputVersion,
    /// `smtp_host` → `subject` → `version` の順
    pub metadata: Vec<MetadataItem>,
}

/// リソースバージョン（送信時刻で一意になる）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputVersion {
    /// UTC、RFC 3339 でシリアライズされる
    pub time: DateTime<Utc>,
}

/// メタデータの名前と値の組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub name:  String,
    pub value: String,
}

impl MetadataItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name:  name.into(),
            value: value.into(),
        }
    }
}

impl OutputRecord {
    pub fn new(
        time: DateTime<Utc>,
        smtp_host: impl Into<String>,
        subject: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            version:  OutputVersion { time },
            metadata: vec![
                MetadataItem::new("smtp_host", smtp_host),
                MetadataItem::new("subject", subject),
                MetadataItem::new("version", version),
            ],
        }
    }

    /// 名前でメタデータの値を引く
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value.as_str())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
