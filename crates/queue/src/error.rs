use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The cron expression cannot be parsed in either 5- or 7-field form.
    #[error("invalid cron expression {expr:?}: {source}")]
    InvalidCron {
        expr: String,
        #[source]
        source: cron::error::Error,
    },

    /// A delivered task carried a kind nobody registered.
    #[error("unknown task kind: {kind}")]
    UnknownKind { kind: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The queue backend rejected the task.
    #[error("queue backend failed: {context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_cron(expr: impl Into<String>, source: cron::error::Error) -> Self {
        Self::InvalidCron { expr: expr.into(), source }
    }

    #[must_use]
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    #[must_use]
    pub fn backend(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend { context: context.into(), source: Box::new(source) }
    }
}
