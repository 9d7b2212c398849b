//! # ビルドソース読み込み
//!
//! `params` に指定されたパスをビルドソースのルート基準で解決し、
//! 内容を読み込んでビルドトークンを置換する。
//!
//! ## 設計方針
//!
//! - **相対パスはルート基準**: 絶対パスはそのまま、相対パスはルートに連結する
//! - **読み込み失敗は致命的**: 呼び出し側で回復はせず、そのまま返す
//! - **非 UTF-8 は置換文字で読む**: 文字コードの不一致で送信を止めない

use std::path::{Path, PathBuf};

use mailstep_domain::build_tokens::BuildTokens;

use crate::error::InfraError;

/// ビルドソースのルートとトークン表を保持するリーダー
#[derive(Debug, Clone)]
pub struct SourceReader {
    root:   PathBuf,
    tokens: BuildTokens,
}

impl SourceReader {
    pub fn new(root: impl Into<PathBuf>, tokens: BuildTokens) -> Self {
        Self {
            root: root.into(),
            tokens,
        }
    }

    /// 絶対パスに解決する
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// ファイルを読み込み、ビルドトークンを置換した内容を返す
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn read(&self, path: &Path) -> Result<String, InfraError> {
        let resolved = self.resolve(path);
        let bytes =
            std::fs::read(&resolved).map_err(|e| InfraError::file_read(resolved.clone(), e))?;
        let content = String::from_utf8_lossy(&bytes);

        tracing::debug!(
            resolved = %resolved.display(),
            bytes = bytes.len(),
            "ソースファイルを読み込みました"
        );

        Ok(self.tokens.substitute(&content))
    }
}
