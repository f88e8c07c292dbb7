//! Lifecycle of live bot sessions.
//!
//! One registry instance owns every session in the process. Sessions are
//! keyed by bot id; each holds a cancellation token and an event loop task
//! that exclusively owns its transport subscription. The registry lock is
//! a plain `std::sync` lock scoped to map edits and is never held across
//! any await.

use {
    apiary_common::{AccountId, BotId},
    apiary_store::BotConfig,
    apiary_transport::Subscription,
    secrecy::ExposeSecret,
    std::{
        collections::HashMap,
        sync::{Arc, RwLock},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    Capabilities,
    conversation::Conversations,
    error::{Error, Result},
    pipeline::Pipeline,
};

/// Read-only snapshot of one registered session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub bot_id: BotId,
    pub account_id: AccountId,
    pub username: Option<String>,
}

/// Map entry owning the session's cancellation signal.
struct SessionEntry {
    info: SessionInfo,
    cancel: CancellationToken,
}

pub struct SessionRegistry {
    caps: Capabilities,
    conversations: Arc<Conversations>,
    sessions: RwLock<HashMap<BotId, SessionEntry>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(caps: Capabilities) -> Self {
        let conversations = Arc::new(Conversations::new(Arc::clone(&caps.store)));
        Self { caps, conversations, sessions: RwLock::new(HashMap::new()) }
    }

    /// Start a session for one bot: validate the config, open the
    /// transport subscription, register the session, spawn its loop.
    ///
    /// The subscription is opened outside the registry lock, so a
    /// concurrent start for the same bot is re-checked at insert time;
    /// the loser's fresh subscription is dropped and thereby released.
    pub async fn start_session(&self, config: BotConfig) -> Result<()> {
        let bot_id = config.id;
        if config.token.expose_secret().is_empty() {
            return Err(Error::config_invalid(bot_id, "transport credential is required"));
        }
        if self.contains(bot_id) {
            return Err(Error::AlreadyRunning { bot_id });
        }

        let subscription = self
            .caps
            .transport
            .subscribe(&config.token)
            .await
            .map_err(|source| Error::SubscribeFailed { bot_id, source })?;

        let info = SessionInfo {
            bot_id,
            account_id: config.account_id,
            username: config.username.clone(),
        };
        let cancel = CancellationToken::new();
        let pipeline = Pipeline::new(
            &self.caps,
            Arc::clone(&self.conversations),
            Arc::clone(&subscription.sender),
            config,
        );

        {
            let mut sessions = write_lock(&self.sessions);
            if sessions.contains_key(&bot_id) {
                return Err(Error::AlreadyRunning { bot_id });
            }
            sessions.insert(bot_id, SessionEntry { info, cancel: cancel.clone() });
        }

        tokio::spawn(run_session(bot_id, subscription, pipeline, cancel));
        info!(bot_id = %bot_id, "session started");
        Ok(())
    }

    /// Stop one session. Unknown ids are a no-op.
    pub fn stop_session(&self, bot_id: BotId) {
        let mut sessions = write_lock(&self.sessions);
        match sessions.remove(&bot_id) {
            Some(entry) => {
                entry.cancel.cancel();
                info!(bot_id = %bot_id, "session stopped");
            },
            None => debug!(bot_id = %bot_id, "stop requested for unknown bot"),
        }
    }

    /// Cancel every session and clear the registry. Idempotent; safe to
    /// call from several shutdown paths at once.
    pub fn stop_all(&self) {
        let drained: Vec<SessionEntry> = {
            let mut sessions = write_lock(&self.sessions);
            sessions.drain().map(|(_, entry)| entry).collect()
        };
        if drained.is_empty() {
            return;
        }
        for entry in &drained {
            entry.cancel.cancel();
        }
        info!(count = drained.len(), "all sessions stopped");
    }

    /// Number of live sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        read_lock(&self.sessions).len()
    }

    /// Snapshot of one session, if registered.
    #[must_use]
    pub fn get(&self, bot_id: BotId) -> Option<SessionInfo> {
        read_lock(&self.sessions).get(&bot_id).map(|entry| entry.info.clone())
    }

    #[must_use]
    pub fn contains(&self, bot_id: BotId) -> bool {
        read_lock(&self.sessions).contains_key(&bot_id)
    }

    /// The process-wide conversation accessor behind this registry.
    #[must_use]
    pub fn conversations(&self) -> Arc<Conversations> {
        Arc::clone(&self.conversations)
    }
}

/// Per-session event loop. Exclusively owns the subscription; observes
/// cancellation between events and releases the subscription on exit by
/// dropping the receiver. The select is biased so a pending stop is seen
/// before any queued event; events left in the buffer are never consumed
/// after cancellation.
async fn run_session(
    bot_id: BotId,
    subscription: Subscription,
    pipeline: Pipeline,
    cancel: CancellationToken,
) {
    let mut events = subscription.events;
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(bot_id = %bot_id, "session loop cancelled");
                break;
            }
            next = events.recv() => match next {
                Some(event) => {
                    if let Err(e) = pipeline.handle_event(event).await {
                        error!(bot_id = %bot_id, error = %e, "event handling failed");
                    }
                },
                None => {
                    warn!(bot_id = %bot_id, "transport stream closed");
                    break;
                },
            }
        }
    }
}

fn read_lock<'a>(
    lock: &'a RwLock<HashMap<BotId, SessionEntry>>,
) -> std::sync::RwLockReadGuard<'a, HashMap<BotId, SessionEntry>> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<'a>(
    lock: &'a RwLock<HashMap<BotId, SessionEntry>>,
) -> std::sync::RwLockWriteGuard<'a, HashMap<BotId, SessionEntry>> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        apiary_queue::MemoryJobQueue,
        apiary_responder::EchoResponder,
        apiary_store::MemoryStore,
        apiary_transport::MemoryTransport,
        secrecy::Secret,
        uuid::Uuid,
    };

    fn registry() -> (Arc<MemoryTransport>, SessionRegistry) {
        let transport = Arc::new(MemoryTransport::new());
        let caps = Capabilities {
            transport: transport.clone(),
            store: Arc::new(MemoryStore::new()),
            responder: Arc::new(EchoResponder),
            queue: Arc::new(MemoryJobQueue::new()),
        };
        (transport, SessionRegistry::new(caps))
    }

    fn config(token: &str) -> BotConfig {
        BotConfig {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            token: Secret::new(token.to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn start_registers_and_subscribes() {
        let (transport, registry) = registry();
        let cfg = config("tok-1");
        let bot_id = cfg.id;

        registry.start_session(cfg).await.unwrap();

        assert_eq!(registry.count(), 1);
        assert!(transport.is_subscribed("tok-1"));
        let info = registry.get(bot_id).unwrap();
        assert_eq!(info.bot_id, bot_id);
    }

    #[tokio::test]
    async fn empty_token_is_rejected_before_subscribing() {
        let (transport, registry) = registry();

        let err = registry.start_session(config("")).await.err().unwrap();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
        assert_eq!(registry.count(), 0);
        assert!(!transport.is_subscribed(""));
    }

    #[tokio::test]
    async fn double_start_is_already_running() {
        let (_transport, registry) = registry();
        let cfg = config("tok-1");
        let bot_id = cfg.id;

        registry.start_session(cfg.clone()).await.unwrap();
        let err = registry.start_session(cfg).await.err().unwrap();

        assert!(matches!(err, Error::AlreadyRunning { bot_id: b } if b == bot_id));
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test]
    async fn stop_of_unknown_bot_is_a_noop() {
        let (_transport, registry) = registry();
        registry.stop_session(Uuid::new_v4());
        assert_eq!(registry.count(), 0);
    }

    #[tokio::test]
    async fn stop_removes_exactly_the_target() {
        let (_transport, registry) = registry();
        let first = config("tok-1");
        let second = config("tok-2");
        let first_id = first.id;

        registry.start_session(first).await.unwrap();
        registry.start_session(second).await.unwrap();
        registry.stop_session(first_id);

        assert_eq!(registry.count(), 1);
        assert!(registry.get(first_id).is_none());
    }

    #[tokio::test]
    async fn stop_all_clears_the_registry_and_is_idempotent() {
        let (_transport, registry) = registry();
        registry.start_session(config("tok-1")).await.unwrap();
        registry.start_session(config("tok-2")).await.unwrap();
        registry.start_session(config("tok-3")).await.unwrap();

        registry.stop_all();
        assert_eq!(registry.count(), 0);
        registry.stop_all();
        assert_eq!(registry.count(), 0);
    }
}
