//! Chat turns as supplied by the caller, and their conversion into model messages.

use crate::llm::{LlmMessage, LlmRole};
use serde::{Deserialize, Serialize};

/// Author of a turn. Anything other than `user`/`assistant` lands in `Unknown`:
/// it still counts toward conversation length but is never sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    #[serde(other)]
    Unknown,
}

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Converts turns into model messages. Unknown roles are dropped.
pub fn to_llm_messages(turns: &[ChatTurn]) -> Vec<LlmMessage> {
    turns
        .iter()
        .filter_map(|t| {
            let role = match t.role {
                Role::User => LlmRole::User,
                Role::Assistant => LlmRole::Assistant,
                Role::Unknown => return None,
            };
            Some(LlmMessage::new(role, t.content.clone()))
        })
        .collect()
}

/// `[system instruction, ...formatted turns]`, the shape of every model call.
pub fn with_system(instruction: &str, turns: &[ChatTurn]) -> Vec<LlmMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(LlmMessage::system(instruction));
    messages.extend(to_llm_messages(turns));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_deserialize_and_are_dropped() {
        let turns: Vec<ChatTurn> = serde_json::from_str(
            r#"[{"role":"user","content":"hi"},{"role":"tool","content":"x"},{"role":"assistant","content":"hello"}]"#,
        )
        .unwrap();
        assert_eq!(turns[1].role, Role::Unknown);

        let formatted = to_llm_messages(&turns);
        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0].role, LlmRole::User);
        assert_eq!(formatted[1].role, LlmRole::Assistant);
        assert_eq!(formatted[1].content, "hello");
    }

    #[test]
    fn system_instruction_comes_first() {
        let messages = with_system("be brief", &[ChatTurn::user("hi")]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, LlmRole::System);
        assert_eq!(messages[0].content, "be brief");
    }
}
