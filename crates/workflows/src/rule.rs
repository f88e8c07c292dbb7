//! The rule model: triggers, steps, and the rendered description.

use {
    apiary_common::WorkflowId,
    serde::{Deserialize, Serialize},
};

use crate::{
    error::{Error, Result},
    trigger,
};

/// What fires a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Trigger {
    /// Fires on exact command-token equality, e.g. `/start`.
    Command { command: String },
    /// Fires when the case-insensitive regex matches anywhere in the text.
    /// A plain word therefore behaves as a substring match.
    Message { pattern: String },
}

impl Trigger {
    /// Check that the trigger is well-formed. Hosts call this when loading
    /// rules so a bad pattern is rejected up front instead of silently
    /// never matching.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Command { command } => {
                if command.trim().is_empty() {
                    return Err(Error::EmptyCommand);
                }
                Ok(())
            },
            Self::Message { pattern } => trigger::compile_pattern(pattern)
                .map(|_| ())
                .map_err(|source| Error::InvalidPattern { pattern: pattern.clone(), source }),
        }
    }
}

/// One step of a rule's configured chain. Steps are rendered into the
/// description, never executed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Step type tag, e.g. `message`, `delay`, `webhook`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A rule attached to one bot. Read-only at runtime; rules are edited
/// wherever the store is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRule {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub trigger: Trigger,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowRule {
    /// Render the text sent to the chat when this rule fires.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("Workflow: {}\n", self.name);
        if let Some(description) = &self.description {
            out.push_str(description);
            out.push('\n');
        }
        out.push_str("\nSteps:\n");
        if self.steps.is_empty() {
            out.push_str("(no steps configured)\n");
            return out;
        }
        for (index, step) in self.steps.iter().enumerate() {
            let label = step.label.as_deref().unwrap_or("");
            out.push_str(&format!("{}. [{}] {}\n", index + 1, step.kind, label));
        }
        out.push_str(&format!("\nTotal steps: {}\n", self.steps.len()));
        out
    }
}
