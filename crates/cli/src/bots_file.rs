//! TOML definitions for the bots this host runs.
//!
//! ```toml
//! [[bots]]
//! name = "support"
//! token = "123456:abcdef"
//! ai_enabled = true
//! system_prompt = "You answer support questions for Acme."
//!
//! [[bots.workflows]]
//! name = "Greeting flow"
//! trigger = { kind = "command", command = "/start" }
//! steps = [{ kind = "message", label = "Send intro" }]
//! ```
//!
//! Ids may be omitted; missing bot and account ids are minted at load time.

use {
    anyhow::{Context, bail},
    apiary_store::{BotConfig, MemoryStore},
    apiary_workflows::{Trigger, WorkflowRule, WorkflowStep},
    secrecy::Secret,
    serde::Deserialize,
    std::{fs, path::Path},
    uuid::Uuid,
};

#[derive(Debug, Deserialize)]
pub struct BotsFile {
    #[serde(default)]
    pub bots: Vec<BotEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BotEntry {
    pub name: Option<String>,
    pub token: String,
    pub id: Option<Uuid>,
    pub account: Option<Uuid>,
    #[serde(default)]
    pub ai_enabled: bool,
    pub ai_model: Option<String>,
    pub system_prompt: Option<String>,
    pub welcome_message: Option<String>,
    pub help_text: Option<String>,
    #[serde(default)]
    pub workflows: Vec<WorkflowEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowEntry {
    pub name: String,
    pub description: Option<String>,
    pub trigger: Trigger,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

/// Read and validate the definitions file.
pub fn load(path: &Path) -> anyhow::Result<BotsFile> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file = parse(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(file)
}

fn parse(raw: &str) -> anyhow::Result<BotsFile> {
    let file: BotsFile = toml::from_str(raw)?;
    if file.bots.is_empty() {
        bail!("no [[bots]] entries");
    }
    for bot in &file.bots {
        validate(bot)?;
    }
    Ok(file)
}

fn validate(bot: &BotEntry) -> anyhow::Result<()> {
    let label = bot.name.as_deref().unwrap_or("<unnamed>");
    if bot.token.trim().is_empty() {
        bail!("bot {label:?} has an empty token");
    }
    for workflow in &bot.workflows {
        workflow
            .trigger
            .validate()
            .with_context(|| format!("workflow {:?} of bot {label:?}", workflow.name))?;
    }
    Ok(())
}

/// Load the file and seed the store with its bots and workflow rules.
/// Returns the number of bots seeded.
pub fn seed_store(path: &Path, store: &MemoryStore) -> anyhow::Result<usize> {
    let file = load(path)?;
    let count = file.bots.len();
    for entry in file.bots {
        let bot_id = entry.id.unwrap_or_else(Uuid::new_v4);
        store.add_bot(BotConfig {
            id: bot_id,
            account_id: entry.account.unwrap_or_else(Uuid::new_v4),
            username: entry.name,
            token: Secret::new(entry.token),
            ai_enabled: entry.ai_enabled,
            ai_model: entry.ai_model,
            system_prompt: entry.system_prompt,
            welcome_message: entry.welcome_message,
            help_text: entry.help_text,
            enabled: true,
        });
        for workflow in entry.workflows {
            store.add_workflow(bot_id, WorkflowRule {
                id: Uuid::new_v4(),
                name: workflow.name,
                description: workflow.description,
                trigger: workflow.trigger,
                steps: workflow.steps,
            });
        }
    }
    Ok(count)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [[bots]]
        name = "support"
        token = "123456:abcdef"
        ai_enabled = true
        welcome_message = "Welcome!"

        [[bots.workflows]]
        name = "Greeting flow"
        trigger = { kind = "command", command = "/start" }
        steps = [{ kind = "message", label = "Send intro" }]

        [[bots]]
        name = "orders"
        token = "654321:fedcba"

        [[bots.workflows]]
        name = "Order intake"
        trigger = { kind = "message", pattern = "order" }
    "#;

    #[test]
    fn sample_file_parses() {
        let file = parse(SAMPLE).unwrap();
        assert_eq!(file.bots.len(), 2);
        assert!(file.bots[0].ai_enabled);
        assert_eq!(file.bots[0].workflows.len(), 1);
        assert!(matches!(
            file.bots[1].workflows[0].trigger,
            Trigger::Message { .. }
        ));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(parse("").is_err());
    }

    #[test]
    fn blank_token_is_rejected() {
        let raw = r#"
            [[bots]]
            name = "broken"
            token = "  "
        "#;
        let err = parse(raw).err().unwrap();
        assert!(err.to_string().contains("empty token"));
    }

    #[test]
    fn broken_trigger_pattern_is_rejected() {
        let raw = r#"
            [[bots]]
            name = "support"
            token = "123456:abcdef"

            [[bots.workflows]]
            name = "Bad rule"
            trigger = { kind = "message", pattern = "order(" }
        "#;
        let err = parse(raw).err().unwrap();
        assert!(format!("{err:#}").contains("Bad rule"));
    }

    #[tokio::test]
    async fn seeding_mints_missing_ids() {
        use apiary_store::Store as _;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bots.toml");
        fs::write(&path, SAMPLE).unwrap();

        let store = MemoryStore::new();
        assert_eq!(seed_store(&path, &store).unwrap(), 2);

        let bots = store.list_active_bots().await.unwrap();
        assert_eq!(bots.len(), 2);
        assert!(bots.iter().all(|b| !b.id.is_nil()));
        assert_ne!(bots[0].account_id, bots[1].account_id);
        assert_eq!(store.list_active_workflows(bots[0].id).await.unwrap().len(), 1);
    }
}
