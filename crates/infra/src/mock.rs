//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリの送信モック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailstep-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mailstep_domain::{
    config::{SmtpAuth, SmtpServer},
    message::OutgoingMail,
};

use crate::{error::InfraError, transmitter::MailTransmitter};

/// 記録された送信 1 回分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransmission {
    pub server: SmtpServer,
    pub auth:   SmtpAuth,
    pub mail:   OutgoingMail,
}

// ===== MockMailTransmitter =====

/// 送信内容を記録するだけのモック
///
/// `failing` で作成した場合は記録したうえでエラーを返す。
#[derive(Clone, Default)]
pub struct MockMailTransmitter {
    transmissions: Arc<Mutex<Vec<RecordedTransmission>>>,
    failure:       Option<String>,
}

impl MockMailTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に送信失敗を返すモックを作成する
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            transmissions: Arc::default(),
            failure:       Some(message.into()),
        }
    }

    /// 記録された送信を返す
    pub fn transmissions(&self) -> Vec<RecordedTransmission> {
        self.transmissions.lock().unwrap().clone()
    }

    pub fn transmission_count(&self) -> usize {
        self.transmissions.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransmitter for MockMailTransmitter {
    async fn transmit(
        &self,
        server: &SmtpServer,
        auth: &SmtpAuth,
        mail: &OutgoingMail,
    ) -> Result<(), InfraError> {
        self.transmissions
            .lock()
            .unwrap()
            .push(RecordedTransmission {
                server: server.clone(),
                auth:   auth.clone(),
                mail:   mail.clone(),
            });

        match &self.failure {
            Some(message) => Err(InfraError::unexpected(message.clone())),
            None => Ok(()),
        }
    }
}
