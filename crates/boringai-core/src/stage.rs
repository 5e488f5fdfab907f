//! Conversation stage classifier: message count plus keywords in the latest turn.

use crate::turn::ChatTurn;
use serde::{Deserialize, Serialize};

/// Dialogue mode governing which instruction prefix is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Consultation,
    Recommendation,
    Qualification,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Consultation => "consultation",
            Stage::Recommendation => "recommendation",
            Stage::Qualification => "qualification",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing and scheduling signals. Checked before solution keywords.
const QUALIFICATION_KEYWORDS: &[&str] = &["cost", "price", "budget", "timeline"];

const RECOMMENDATION_KEYWORDS: &[&str] = &["solution", "recommend", "what should", "how can"];

/// Conversations this short are always in consultation.
const OPENING_TURNS: usize = 2;

/// Maps the conversation to a stage. First matching rule wins.
pub fn classify(messages: &[ChatTurn]) -> Stage {
    if messages.len() <= OPENING_TURNS {
        return Stage::Consultation;
    }
    let latest = messages
        .last()
        .map(|t| t.content.to_lowercase())
        .unwrap_or_default();

    if QUALIFICATION_KEYWORDS.iter().any(|k| latest.contains(k)) {
        Stage::Qualification
    } else if RECOMMENDATION_KEYWORDS.iter().any(|k| latest.contains(k)) {
        Stage::Recommendation
    } else {
        Stage::Consultation
    }
}
