//! Per-tenant bot configuration.

use {
    apiary_common::{AccountId, BotId},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

/// Configuration of one bot. Immutable while its session runs; edits take
/// effect on the next session start.
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub id: BotId,
    pub account_id: AccountId,
    /// Public handle, used in log lines only.
    #[serde(default)]
    pub username: Option<String>,
    /// Transport credential issued by the chat provider.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
    /// Whether free text gets a generated reply.
    #[serde(default)]
    pub ai_enabled: bool,
    /// Model hint for the host's responder wiring. The runtime never reads
    /// it.
    #[serde(default)]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    /// Disabled bots are skipped by active listings.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            account_id: Uuid::nil(),
            username: None,
            token: Secret::new(String::new()),
            ai_enabled: false,
            ai_model: None,
            system_prompt: None,
            welcome_message: None,
            help_text: None,
            enabled: true,
        }
    }
}

// Manual Debug so the token cannot leak into logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("id", &self.id)
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("ai_enabled", &self.ai_enabled)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_token() {
        let config = BotConfig {
            token: Secret::new("123456:secret-token".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn deserialize_fills_defaults() {
        let json = format!(
            r#"{{"id":"{}","account_id":"{}","token":"t"}}"#,
            Uuid::nil(),
            Uuid::nil()
        );
        let config: BotConfig = serde_json::from_str(&json).unwrap();
        assert!(config.enabled);
        assert!(!config.ai_enabled);
        assert_eq!(config.token.expose_secret(), "t");
    }
}
