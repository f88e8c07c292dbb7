//! Generated-reply capability.
//!
//! The runtime builds the prompt pieces and hands them over; which model
//! (if any) answers is the host's wiring decision. [`EchoResponder`] is the
//! stand-in used by tests and local runs.

pub mod error;

pub use error::{Error, Result};

use async_trait::async_trait;

#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce a reply to one user message.
    ///
    /// `retrieval_context` carries knowledge-base snippets once retrieval
    /// is wired up; the runtime currently always passes an empty string.
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        retrieval_context: &str,
    ) -> Result<String>;
}

/// Placeholder responder that mirrors the user text back.
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_text: &str,
        _retrieval_context: &str,
    ) -> Result<String> {
        if user_text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(format!("Echo: {user_text}"))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_mirrors_the_input() {
        let reply = EchoResponder.generate("prompt", "hello", "").await.unwrap();
        assert_eq!(reply, "Echo: hello");
    }

    #[tokio::test]
    async fn echo_rejects_blank_input() {
        let err = EchoResponder.generate("prompt", "   ", "").await.err().unwrap();
        assert!(matches!(err, Error::EmptyResponse));
    }
}
