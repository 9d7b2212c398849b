//! テスト共通フィクスチャ
//!
//! ビルドソースの一時ディレクトリ、モック送信、固定時刻を組み立てるヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::{fs, path::Path, sync::Arc};

use chrono::{DateTime, TimeZone, Utc};
use mailstep_domain::{build_tokens::BuildTokens, clock::FixedClock};
use mailstep_infra::mock::MockMailTransmitter;
use mailstep_out::OutUseCase;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const VERSION: &str = "1.2.3";

/// 出力レコードに記録される固定時刻
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

/// ビルドソースのルート（一時ディレクトリ）
pub struct BuildSources {
    dir: TempDir,
}

impl BuildSources {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// ルートからの相対パスでファイルを作成する
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// テスト対象とモックの組
pub struct Setup {
    pub sut:         OutUseCase,
    pub transmitter: MockMailTransmitter,
}

pub fn setup_with(transmitter: MockMailTransmitter, tokens: BuildTokens) -> Setup {
    let sut = OutUseCase::new(
        Arc::new(transmitter.clone()),
        Arc::new(FixedClock::new(fixed_time())),
        tokens,
    );
    Setup { sut, transmitter }
}

pub fn setup() -> Setup {
    setup_with(MockMailTransmitter::new(), BuildTokens::empty())
}

/// `BUILD_ID` だけを設定したトークン表
pub fn build_id(value: &str) -> BuildTokens {
    let value = value.to_string();
    BuildTokens::from_lookup(move |name| (name == "BUILD_ID").then(|| value.clone()))
}

/// 認証ありの最小構成の入力
pub fn authenticated_input() -> Value {
    json!({
        "source": {
            "smtp": {
                "host": "smtp.example.com",
                "port": "587",
                "username": "ci-bot",
                "password": "s3cret"
            },
            "from": "ci@example.com",
            "to": ["team@example.com"]
        },
        "params": {
            "subject": "email/subject.txt",
            "body": "email/body.txt"
        }
    })
}

pub fn bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}
