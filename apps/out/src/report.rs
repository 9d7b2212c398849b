//! # 実行結果の報告
//!
//! ユースケースの結果を、CI ランナーとの取り決め（stdout / stderr / 終了コード）に変換する。
//!
//! | 結果 | stdout | stderr | 終了コード |
//! |------|--------|--------|-----------|
//! | 送信完了 | 出力レコード | なし | 0 |
//! | 本文が空で送信拒否 | 出力レコード | エラー | 1 |
//! | その他の失敗 | なし | エラー | 1 |

use std::process::ExitCode;

use crate::{error::OutError, usecase::StepOutcome};

/// プロセスとして報告する内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub stdout:  Option<String>,
    pub stderr:  Option<String>,
    pub success: bool,
}

impl Report {
    pub fn from_result(result: &Result<StepOutcome, OutError>) -> Self {
        match result {
            Ok(StepOutcome::Sent { output }) => Self {
                stdout:  Some(output.clone()),
                stderr:  None,
                success: true,
            },
            Ok(StepOutcome::Refused { output, error }) => Self {
                stdout:  Some(output.clone()),
                stderr:  Some(error.to_string()),
                success: false,
            },
            Err(error) => Self {
                stdout:  None,
                stderr:  Some(error.to_string()),
                success: false,
            },
        }
    }

    /// stdout / stderr に書き出し、終了コードを返す
    pub fn emit(&self) -> ExitCode {
        if let Some(stdout) = &self.stdout {
            println!("{stdout}");
        }
        if let Some(stderr) = &self.stderr {
            eprintln!("error: {stderr}");
        }
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
