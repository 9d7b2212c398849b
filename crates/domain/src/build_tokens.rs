//! # ビルドトークン
//!
//! ファイル内容に埋め込まれた `${BUILD_ID}` などのプレースホルダを、
//! CI ランナーが渡す環境変数の値で置換する。
//!
//! ## 設計方針
//!
//! - **一度だけ読み取る**: 環境変数は起動時に [`BuildTokens::from_env`] で
//!   スナップショットし、以降は不変の値として扱う
//! - **注入可能**: テストでは [`BuildTokens::from_lookup`] で任意の値を渡す
//! - **固定順序**: 置換は [`BUILD_TOKENS`] の順に行うため、結果は決定的
//!
//! ## 対応トークン
//!
//! | プレースホルダ | 環境変数 |
//! |---------------|---------|
//! | `${BUILD_ID}` | `BUILD_ID` |
//! | `${BUILD_NAME}` | `BUILD_NAME` |
//! | `${BUILD_JOB_NAME}` | `BUILD_JOB_NAME` |
//! | `${BUILD_PIPELINE_NAME}` | `BUILD_PIPELINE_NAME` |
//! | `${ATC_EXTERNAL_URL}` | `ATC_EXTERNAL_URL` |
//! | `${BUILD_TEAM_NAME}` | `BUILD_TEAM_NAME` |

/// 置換対象の (環境変数名, プレースホルダ) の組
pub const BUILD_TOKENS: [(&str, &str); 6] = [
    ("BUILD_ID", "${BUILD_ID}"),
    ("BUILD_NAME", "${BUILD_NAME}"),
    ("BUILD_JOB_NAME", "${BUILD_JOB_NAME}"),
    ("BUILD_PIPELINE_NAME", "${BUILD_PIPELINE_NAME}"),
    ("ATC_EXTERNAL_URL", "${ATC_EXTERNAL_URL}"),
    ("BUILD_TEAM_NAME", "${BUILD_TEAM_NAME}"),
];

/// プレースホルダと置換値の対応表
///
/// 未設定の環境変数は空文字列として扱う（エラーにはしない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTokens {
    values: Vec<(&'static str, String)>,
}

impl BuildTokens {
    /// 任意の検索関数から対応表を作る
    ///
    /// `lookup` には環境変数名（例: `"BUILD_ID"`）が渡される。
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let values = BUILD_TOKENS
            .iter()
            .map(|(name, placeholder)| (*placeholder, lookup(name).unwrap_or_default()))
            .collect();

        Self { values }
    }

    /// プロセスの環境変数から対応表を作る
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// すべての値が空の対応表を作る
    pub fn empty() -> Self {
        Self::from_lookup(|_| None)
    }

    /// テキスト中のすべてのプレースホルダを置換する
    ///
    /// プレースホルダ以外の文字列には一切手を加えない。
    pub fn substitute(&self, text: &str) -> String {
        self.values
            .iter()
            .fold(text.to_string(), |acc, (placeholder, value)| {
                acc.replace(placeholder, value)
            })
    }
}

impl Default for BuildTokens {
    fn default() -> Self {
        Self::empty()
    }
}
