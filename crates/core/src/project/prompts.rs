//! Prompt set model

use serde::{Deserialize, Serialize};

/// A named, ordered list of prompt messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    pub name: String,
    pub messages: Vec<PromptMessage>,
}

impl PromptSet {
    /// Messages carrying the given role, in order
    pub fn messages_for(&self, role: MessageRole) -> Vec<&PromptMessage> {
        self.messages.iter().filter(|m| m.role == role).collect()
    }

    /// The concatenated system prompt, if any system messages exist
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// One message in a prompt set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Message roles accepted in prompt sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}
