use {apiary_common::BotId, thiserror::Error};

pub type Result<T> = std::result::Result<T, Error>;

/// Session and pipeline failures. None of these are fatal to the process;
/// the registry and the orchestrator decide per bot what to do. Responder
/// failures have no variant here: the pipeline recovers them into an
/// apology reply, so they never leave `handle_event`.
#[derive(Debug, Error)]
pub enum Error {
    /// A session for this bot is already registered.
    #[error("bot {bot_id} is already running")]
    AlreadyRunning { bot_id: BotId },

    /// The bot's configuration cannot produce a working session.
    #[error("invalid config for bot {bot_id}: {reason}")]
    ConfigInvalid { bot_id: BotId, reason: String },

    /// Opening the transport subscription failed.
    #[error("subscription failed for bot {bot_id}: {source}")]
    SubscribeFailed {
        bot_id: BotId,
        #[source]
        source: apiary_transport::Error,
    },

    /// An outbound send failed after the session was up.
    #[error(transparent)]
    Transport(#[from] apiary_transport::Error),

    /// A store operation the pipeline awaits directly failed.
    #[error(transparent)]
    Store(#[from] apiary_store::Error),
}

impl Error {
    #[must_use]
    pub fn config_invalid(bot_id: BotId, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid { bot_id, reason: reason.into() }
    }
}
