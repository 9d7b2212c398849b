//! # out ステップ設定
//!
//! 環境変数からプロセス全体の設定を読み込む。
//! ステップ入力（SMTP サーバー等）は標準入力の JSON で受け取るため、ここには含めない。

use mailstep_domain::build_tokens::BuildTokens;
use mailstep_shared::observability::LogFormat;

/// 出力レコードの `version` メタデータに記録する値
pub const STEP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// out ステップの設定
#[derive(Debug, Clone)]
pub struct OutConfig {
    /// ログ出力形式（`LOG_FORMAT`）
    pub log_format:   LogFormat,
    /// ビルドトークン（`BUILD_ID` 等、起動時に一度だけ読み取る）
    pub build_tokens: BuildTokens,
}

impl OutConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self {
            log_format:   LogFormat::from_env(),
            build_tokens: BuildTokens::from_env(),
        }
    }
}
