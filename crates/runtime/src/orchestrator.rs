//! Boot-time and shutdown entry points for the host process.

use {
    apiary_common::BotId,
    apiary_store::{BotConfig, Store},
    std::sync::Arc,
    tracing::{info, warn},
};

use crate::{
    Capabilities,
    error::Result,
    registry::{SessionInfo, SessionRegistry},
};

/// Counts from a bulk start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartSummary {
    pub started: usize,
    pub failed: usize,
}

/// The process surface: load bots, run their sessions, shut down.
pub struct Orchestrator {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn Store>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(caps: Capabilities) -> Self {
        let store = Arc::clone(&caps.store);
        Self { registry: Arc::new(SessionRegistry::new(caps)), store }
    }

    /// Load every active bot from the store and start it. Per-bot failures
    /// are logged and counted; only the initial listing is fatal.
    pub async fn start_all_active(&self) -> Result<StartSummary> {
        let configs = self.store.list_active_bots().await?;
        info!(count = configs.len(), "active bots loaded");
        Ok(self.start_all(configs).await)
    }

    /// Start each config in turn, continuing past individual failures.
    pub async fn start_all(&self, configs: Vec<BotConfig>) -> StartSummary {
        let mut summary = StartSummary::default();
        for config in configs {
            let label = config.username.clone().unwrap_or_else(|| config.id.to_string());
            match self.registry.start_session(config).await {
                Ok(()) => {
                    info!(bot = %label, "bot started");
                    summary.started += 1;
                },
                Err(e) => {
                    warn!(bot = %label, error = %e, "bot failed to start");
                    summary.failed += 1;
                },
            }
        }
        summary
    }

    /// Start one bot.
    pub async fn start(&self, config: BotConfig) -> Result<()> {
        self.registry.start_session(config).await
    }

    /// Stop one bot. Unknown ids are a no-op.
    pub fn stop(&self, bot_id: BotId) {
        self.registry.stop_session(bot_id);
    }

    /// Stop every session. Safe to call more than once.
    pub fn shutdown(&self) {
        self.registry.stop_all();
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.registry.count()
    }

    #[must_use]
    pub fn session(&self, bot_id: BotId) -> Option<SessionInfo> {
        self.registry.get(bot_id)
    }

    /// Direct registry access for hosts that manage sessions themselves.
    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }
}
