//! Console transport: stdin lines become inbound events for one local chat
//! and replies print to stdout. Meant for running a single bot without a
//! real chat provider; with several bots subscribed, lines land on
//! whichever reader wins.

use {
    apiary_common::{ChatId, UserId},
    async_trait::async_trait,
    secrecy::Secret,
    std::sync::Arc,
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        sync::mpsc,
    },
    tracing::debug,
};

use crate::{
    error::Result,
    event::{InboundEvent, SenderInfo},
    traits::{EVENT_BUFFER, Sender, Subscription, Transport},
};

/// The single chat id the console maps to.
pub const CONSOLE_CHAT_ID: ChatId = 0;
/// The single user id the console maps to.
pub const CONSOLE_USER_ID: UserId = 1;

/// stdin/stdout transport for local runs.
#[derive(Default)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn subscribe(&self, _credential: &Secret<String>) -> Result<Subscription> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(read_stdin(tx));
        Ok(Subscription { events: rx, sender: Arc::new(ConsoleSender) })
    }
}

async fn read_stdin(tx: mpsc::Sender<InboundEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let sender = SenderInfo {
                    user_id: CONSOLE_USER_ID,
                    username: Some("console".to_owned()),
                    display_name: None,
                };
                let event = InboundEvent::from_text(CONSOLE_CHAT_ID, sender, line);
                if tx.send(event).await.is_err() {
                    debug!("console subscription dropped, stopping stdin reader");
                    return;
                }
            },
            Ok(None) => {
                debug!("stdin closed, stopping console reader");
                return;
            },
            Err(e) => {
                debug!(error = %e, "stdin read failed, stopping console reader");
                return;
            },
        }
    }
}

struct ConsoleSender;

#[async_trait]
impl Sender for ConsoleSender {
    async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }

    async fn ack_interaction(&self, interaction_id: &str, text: &str) -> Result<()> {
        println!("[{interaction_id}] {text}");
        Ok(())
    }
}
