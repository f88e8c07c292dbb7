use {apiary_common::ChatId, thiserror::Error};

pub type Result<T> = std::result::Result<T, Error>;

/// Transport failures, as seen by the runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider refused the credential or the subscription.
    #[error("subscription rejected: {message}")]
    SubscribeRejected { message: String },

    /// The addressed chat does not exist or is no longer reachable.
    #[error("unknown chat: {chat_id}")]
    UnknownChat { chat_id: ChatId },

    /// The link to the provider is gone.
    #[error("transport closed")]
    Closed,

    /// Any other provider-side failure.
    #[error("transport request failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn subscribe_rejected(message: impl Into<String>) -> Self {
        Self::SubscribeRejected { message: message.into() }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::External { context: context.into(), source: Box::new(source) }
    }
}
