//! SMTP 送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用して生のメッセージを送信する。
//! サーバーが STARTTLS を提示すれば昇格する。ローカルホスト以外へ認証する場合は
//! STARTTLS を必須とし、平文のまま認証情報を送らない。

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
};
use mailstep_domain::{
    config::{SmtpAuth, SmtpServer},
    message::OutgoingMail,
};

use super::MailTransmitter;
use crate::error::InfraError;

/// SMTP 送信
///
/// 匿名モードでは AUTH を一切行わない。
/// 認証モードでは接続先ホストに対して PLAIN 認証のみを使う。
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailTransmitter;

impl SmtpMailTransmitter {
    pub fn new() -> Self {
        Self
    }
}

/// ポート番号を解釈する
fn parse_port(port: &str) -> Result<u16, InfraError> {
    port.parse().map_err(|_| InfraError::invalid_port(port))
}

fn parse_address(address: &str) -> Result<Address, InfraError> {
    address
        .parse()
        .map_err(|e| InfraError::invalid_address(address, e))
}

/// 送信元と宛先からエンベロープを作る
fn build_envelope(mail: &OutgoingMail) -> Result<Envelope, InfraError> {
    let from = parse_address(&mail.from)?;
    let to = mail
        .recipients
        .iter()
        .map(|recipient| parse_address(recipient))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Envelope::new(Some(from), to)?)
}

/// 単独の `\n` を `\r\n` に変換する（既存の `\r\n` はそのまま）
fn to_crlf(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 16);
    let mut previous = None;
    for &byte in raw {
        if byte == b'\n' && previous != Some(b'\r') {
            out.push(b'\r');
        }
        out.push(byte);
        previous = Some(byte);
    }
    out
}

/// STARTTLS の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsMode {
    /// サーバーが STARTTLS を提示した場合だけ昇格する
    Opportunistic,
    /// STARTTLS で昇格できなければ送信しない
    Required,
}

fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// 認証情報を平文で送ってよいのはローカルホストだけ
fn tls_mode(server: &SmtpServer, auth: &SmtpAuth) -> TlsMode {
    match auth {
        SmtpAuth::Plain { .. } if !is_local_host(&server.host) => TlsMode::Required,
        _ => TlsMode::Opportunistic,
    }
}

fn build_transport(
    server: &SmtpServer,
    auth: &SmtpAuth,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, InfraError> {
    let port = parse_port(&server.port)?;

    let parameters = TlsParameters::new(server.host.clone())
        .map_err(|e| InfraError::tls(&server.host, e))?;
    let tls = match tls_mode(server, auth) {
        TlsMode::Opportunistic => Tls::Opportunistic(parameters),
        TlsMode::Required => Tls::Required(parameters),
    };

    let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&server.host)
        .port(port)
        .tls(tls);

    let builder = match auth {
        SmtpAuth::Anonymous => builder,
        SmtpAuth::Plain { username, password } => builder
            .credentials(Credentials::new(
                username.clone(),
                password.as_str().to_string(),
            ))
            .authentication(vec![Mechanism::Plain]),
    };

    Ok(builder.build())
}

#[async_trait]
impl MailTransmitter for SmtpMailTransmitter {
    #[tracing::instrument(
        skip_all,
        fields(server = %server.address(), anonymous = auth.is_anonymous(), recipients = mail.recipients.len())
    )]
    async fn transmit(
        &self,
        server: &SmtpServer,
        auth: &SmtpAuth,
        mail: &OutgoingMail,
    ) -> Result<(), InfraError> {
        let envelope = build_envelope(mail)?;
        let transport = build_transport(server, auth)?;

        let response = transport.send_raw(&envelope, &to_crlf(&mail.raw)).await?;

        tracing::debug!(
            code = %response.code(),
            "SMTP サーバーがメッセージを受理しました"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mailstep_domain::config::SmtpPassword;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpListener,
    };

    use super::*;
    use crate::error::InfraErrorKind;

    fn mail(recipients: &[&str]) -> OutgoingMail {
        OutgoingMail {
            from:       "ci@example.com".to_string(),
            recipients: recipients.iter().map(|r| (*r).to_string()).collect(),
            raw:        b"To: a@example.com\nSubject: hi\n\nbody\n".to_vec(),
        }
    }

    fn server(port: &str) -> SmtpServer {
        SmtpServer {
            host: "127.0.0.1".to_string(),
            port: port.to_string(),
        }
    }

    fn plain_auth() -> SmtpAuth {
        SmtpAuth::Plain {
            username: "ci-bot".to_string(),
            password: SmtpPassword::new("s3cret"),
        }
    }

    // ===== テスト用 SMTP サーバー =====

    #[derive(Default)]
    struct Received {
        commands: Vec<String>,
        data:     Vec<String>,
    }

    /// 1 接続だけ受け付け、受信したコマンドを記録する SMTP サーバー
    ///
    /// STARTTLS には 220 を返した直後に切断する（TLS ハンドシェイクには応じない）。
    struct FakeSmtpServer {
        port:     u16,
        received: Arc<Mutex<Received>>,
    }

    impl FakeSmtpServer {
        async fn start(extensions: &'static [&'static str]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let received = Arc::new(Mutex::new(Received::default()));
            tokio::spawn(serve(listener, extensions, Arc::clone(&received)));
            Self { port, received }
        }

        fn server(&self) -> SmtpServer {
            server(&self.port.to_string())
        }

        fn commands(&self) -> Vec<String> {
            self.received.lock().unwrap().commands.clone()
        }

        fn data(&self) -> Vec<String> {
            self.received.lock().unwrap().data.clone()
        }
    }

    fn ehlo_reply(extensions: &[&str]) -> String {
        let mut lines = vec!["fake.test"];
        lines.extend_from_slice(extensions);
        let last = lines.len() - 1;
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let separator = if i == last { ' ' } else { '-' };
                format!("250{separator}{line}\r\n")
            })
            .collect()
    }

    async fn serve(
        listener: TcpListener,
        extensions: &'static [&'static str],
        received: Arc<Mutex<Received>>,
    ) {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        if writer.write_all(b"220 fake.test ESMTP\r\n").await.is_err() {
            return;
        }

        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line != "." {
                    received.lock().unwrap().data.push(line);
                    continue;
                }
                in_data = false;
                if writer.write_all(b"250 2.0.0 queued\r\n").await.is_err() {
                    return;
                }
                continue;
            }

            received.lock().unwrap().commands.push(line.clone());
            let verb = line
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            let (reply, close) = match verb.as_str() {
                "EHLO" => (ehlo_reply(extensions), false),
                "STARTTLS" => ("220 2.0.0 Ready to start TLS\r\n".to_string(), true),
                "AUTH" => ("235 2.7.0 Authentication successful\r\n".to_string(), false),
                "DATA" => {
                    in_data = true;
                    ("354 End data with <CR><LF>.<CR><LF>\r\n".to_string(), false)
                }
                "QUIT" => ("221 2.0.0 Bye\r\n".to_string(), true),
                _ => ("250 2.0.0 OK\r\n".to_string(), false),
            };
            if writer.write_all(reply.as_bytes()).await.is_err() || close {
                return;
            }
        }
    }

    fn has_auth(commands: &[String]) -> bool {
        commands.iter().any(|c| c.to_ascii_uppercase().starts_with("AUTH"))
    }

    // ===== 送信（通信内容） =====

    #[tokio::test]
    async fn test_匿名モードではauthを送らずに送信する() {
        let fake = FakeSmtpServer::start(&["AUTH PLAIN LOGIN"]).await;

        SmtpMailTransmitter::new()
            .transmit(&fake.server(), &SmtpAuth::Anonymous, &mail(&["a@example.com"]))
            .await
            .unwrap();

        let commands = fake.commands();
        assert!(!has_auth(&commands), "AUTH を送らないこと: {commands:?}");
        assert!(commands.contains(&"MAIL FROM:<ci@example.com>".to_string()));
        assert!(commands.contains(&"RCPT TO:<a@example.com>".to_string()));
        assert!(commands.contains(&"DATA".to_string()));
        let data = fake.data();
        assert!(data.contains(&"Subject: hi".to_string()), "{data:?}");
        assert!(data.contains(&"body".to_string()), "{data:?}");
    }

    #[tokio::test]
    async fn test_認証モードでは設定した資格情報でauth_plainを送る() {
        let fake = FakeSmtpServer::start(&["AUTH PLAIN LOGIN"]).await;

        SmtpMailTransmitter::new()
            .transmit(&fake.server(), &plain_auth(), &mail(&["a@example.com"]))
            .await
            .unwrap();

        let commands = fake.commands();
        // base64("\0ci-bot\0s3cret")
        let auth = commands
            .iter()
            .position(|c| c == "AUTH PLAIN AGNpLWJvdABzM2NyZXQ=")
            .expect("AUTH PLAIN を送ること");
        let mail_from = commands
            .iter()
            .position(|c| c.starts_with("MAIL FROM:"))
            .expect("MAIL FROM を送ること");
        assert!(auth < mail_from, "認証は送信前に行うこと: {commands:?}");
    }

    #[tokio::test]
    async fn test_starttlsが提示されれば認証前に昇格を試みる() {
        let fake = FakeSmtpServer::start(&["STARTTLS", "AUTH PLAIN"]).await;

        let result = SmtpMailTransmitter::new()
            .transmit(&fake.server(), &plain_auth(), &mail(&["a@example.com"]))
            .await;

        // テスト用サーバーは TLS ハンドシェイクに応じないため送信は失敗する
        assert!(matches!(result.unwrap_err().kind(), InfraErrorKind::Smtp(_)));
        let commands = fake.commands();
        assert_eq!(commands.len(), 2, "{commands:?}");
        assert!(commands[0].starts_with("EHLO"));
        assert_eq!(commands[1], "STARTTLS");
    }

    // ===== TLS の扱い =====

    #[rstest]
    #[case("smtp.example.com", TlsMode::Required)]
    #[case("localhost", TlsMode::Opportunistic)]
    #[case("127.0.0.1", TlsMode::Opportunistic)]
    #[case("::1", TlsMode::Opportunistic)]
    fn test_認証ありはローカルホスト以外でstarttlsを必須にする(
        #[case] host: &str,
        #[case] expected: TlsMode,
    ) {
        let server = SmtpServer {
            host: host.to_string(),
            port: "587".to_string(),
        };

        assert_eq!(tls_mode(&server, &plain_auth()), expected);
    }

    #[test]
    fn test_匿名モードは常に機会的starttlsになる() {
        let server = SmtpServer {
            host: "smtp.example.com".to_string(),
            port: "25".to_string(),
        };

        assert_eq!(tls_mode(&server, &SmtpAuth::Anonymous), TlsMode::Opportunistic);
    }

    #[test]
    fn test_リモートホストへの認証ありトランスポートを構築できる() {
        let server = SmtpServer {
            host: "smtp.example.com".to_string(),
            port: "587".to_string(),
        };

        assert!(build_transport(&server, &plain_auth()).is_ok());
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpMailTransmitter>();
    }

    #[rstest]
    #[case(b"a\nb\n".as_slice(), b"a\r\nb\r\n".as_slice())]
    #[case(b"a\r\nb\r\n".as_slice(), b"a\r\nb\r\n".as_slice())]
    #[case(b"a\r\nb\nc".as_slice(), b"a\r\nb\r\nc".as_slice())]
    #[case(b"\n\n".as_slice(), b"\r\n\r\n".as_slice())]
    #[case(b"".as_slice(), b"".as_slice())]
    fn test_to_crlfは単独の改行だけを変換する(#[case] input: &[u8], #[case] expected: &[u8]) {
        assert_eq!(to_crlf(input), expected.to_vec());
    }

    #[test]
    fn test_エンベロープは送信元と全宛先を持つ() {
        let envelope = build_envelope(&mail(&["a@example.com", "b@example.com"])).unwrap();

        assert_eq!(
            envelope.from().map(ToString::to_string),
            Some("ci@example.com".to_string())
        );
        let to: Vec<String> = envelope.to().iter().map(ToString::to_string).collect();
        assert_eq!(to, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_不正な宛先はアドレスエラーになる() {
        let err = build_envelope(&mail(&["a@example.com", ""])).unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::InvalidAddress { .. }));
    }

    #[test]
    fn test_宛先がないとエンベロープエラーになる() {
        let err = build_envelope(&mail(&[])).unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::Envelope(_)));
    }

    #[rstest]
    #[case("smtp")]
    #[case("")]
    #[case("70000")]
    #[case(" 25")]
    fn test_不正なポートはポートエラーになる(#[case] port: &str) {
        let err = build_transport(&server(port), &SmtpAuth::Anonymous).unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::InvalidPort(_)));
    }

    #[test]
    fn test_認証ありでもトランスポートを構築できる() {
        let auth = SmtpAuth::Plain {
            username: "ci".to_string(),
            password: SmtpPassword::new("secret"),
        };

        assert!(build_transport(&server("587"), &auth).is_ok());
    }

    #[tokio::test]
    async fn test_接続できないサーバーへの送信はsmtpエラーになる() {
        // 一度バインドして解放したポートには誰も待ち受けていない
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = SmtpMailTransmitter::new()
            .transmit(
                &server(&port.to_string()),
                &SmtpAuth::Anonymous,
                &mail(&["a@example.com"]),
            )
            .await;

        assert!(matches!(result.unwrap_err().kind(), InfraErrorKind::Smtp(_)));
    }
}
