use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The backend produced nothing usable.
    #[error("empty response from backend")]
    EmptyResponse,

    /// The backend is not reachable or refused the request.
    #[error("responder unavailable: {message}")]
    Unavailable { message: String },

    /// The backend call itself failed.
    #[error("responder backend failed: {context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    #[must_use]
    pub fn backend(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend { context: context.into(), source: Box::new(source) }
    }
}
