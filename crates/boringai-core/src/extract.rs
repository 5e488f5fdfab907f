//! Business metadata extraction: challenge snippets and industry / company-size hints.
//! Both scans read only user turns and use plain substring matching.

use crate::turn::ChatTurn;
use serde::{Deserialize, Serialize};

const CHALLENGE_KEYWORDS: &[&str] = &[
    "problem",
    "challenge",
    "difficult",
    "manual",
    "time consuming",
];

const MAX_CHALLENGES: usize = 3;
const CHALLENGE_SNIPPET_CHARS: usize = 100;

/// Order matters: within one message the first listed industry wins.
const INDUSTRIES: &[&str] = &[
    "healthcare",
    "finance",
    "retail",
    "manufacturing",
    "saas",
    "ecommerce",
];

const SMALL_COMPANY_HINTS: &[&str] = &["startup", "small business"];
const LARGE_COMPANY_HINTS: &[&str] = &["enterprise", "large company"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Small,
    Large,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,
}

/// First 100 characters of up to three user turns that mention a challenge keyword.
/// Earliest matches are kept.
pub fn extract_challenges(messages: &[ChatTurn]) -> Vec<String> {
    messages
        .iter()
        .filter(|t| t.is_user())
        .filter(|t| {
            let lower = t.content.to_lowercase();
            CHALLENGE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(MAX_CHALLENGES)
        .map(|t| t.content.chars().take(CHALLENGE_SNIPPET_CHARS).collect())
        .collect()
}

/// Industry: first user message naming one wins for the whole conversation.
/// Company size: last user message with a size hint wins.
pub fn extract_business_context(messages: &[ChatTurn]) -> BusinessContext {
    let mut context = BusinessContext::default();

    for turn in messages.iter().filter(|t| t.is_user()) {
        let lower = turn.content.to_lowercase();

        if context.industry.is_none() {
            context.industry = INDUSTRIES
                .iter()
                .find(|i| lower.contains(**i))
                .map(|i| i.to_string());
        }

        if SMALL_COMPANY_HINTS.iter().any(|h| lower.contains(h)) {
            context.company_size = Some(CompanySize::Small);
        } else if LARGE_COMPANY_HINTS.iter().any(|h| lower.contains(h)) {
            context.company_size = Some(CompanySize::Large);
        }
    }

    context
}
