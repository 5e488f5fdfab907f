//! Conversation orchestrator: classify → stage handler → final reply.
//!
//! State is built fresh per call and dropped with the outcome; the caller resends
//! the full history each turn.

use crate::config::ConsultantConfig;
use crate::handlers::{handler_for, BusinessAnalysis};
use crate::llm::{complete_within, LanguageModel, LlmError};
use crate::persona;
use crate::stage::{classify, Stage};
use crate::turn::{with_system, ChatTurn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const FALLBACK_RESPONSE: &str = "I apologize, but I'm experiencing some technical difficulties. Could you please rephrase your question? I'm here to help you identify automation opportunities for your business.";

const INITIAL_CONFIDENCE: f64 = 0.5;
const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Per-request conversation record.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub messages: Vec<ChatTurn>,
    /// Caller-supplied, passed through untouched.
    pub user_context: serde_json::Map<String, serde_json::Value>,
    pub current_stage: Stage,
    pub business_analysis: BusinessAnalysis,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
}

impl ConversationState {
    pub fn new(
        messages: Vec<ChatTurn>,
        user_context: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            messages,
            user_context,
            current_stage: Stage::Consultation,
            business_analysis: BusinessAnalysis::default(),
            recommendations: Vec::new(),
            confidence_score: INITIAL_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultationOutcome {
    pub response: String,
    pub stage: Stage,
    pub suggested_actions: Vec<String>,
    pub confidence_score: f64,
    pub business_analysis: BusinessAnalysis,
}

impl ConsultationOutcome {
    pub fn fallback() -> Self {
        Self {
            response: FALLBACK_RESPONSE.to_string(),
            stage: Stage::Consultation,
            suggested_actions: Vec::new(),
            confidence_score: FALLBACK_CONFIDENCE,
            business_analysis: BusinessAnalysis::default(),
        }
    }
}

/// Process-wide consultant. Cheap to share behind an `Arc`.
pub struct BoringConsultant {
    model: Arc<dyn LanguageModel>,
    llm_timeout: Duration,
}

impl BoringConsultant {
    pub fn new(model: Arc<dyn LanguageModel>, llm_timeout: Duration) -> Self {
        Self { model, llm_timeout }
    }

    pub fn from_config(model: Arc<dyn LanguageModel>, config: &ConsultantConfig) -> Self {
        Self::new(model, config.llm_timeout)
    }

    /// Runs one turn. Never fails: any error after routing yields [`ConsultationOutcome::fallback`].
    pub async fn process_message(
        &self,
        message: &str,
        history: Vec<ChatTurn>,
        user_context: serde_json::Map<String, serde_json::Value>,
    ) -> ConsultationOutcome {
        let mut messages = history;
        messages.push(ChatTurn::user(message));
        let state = ConversationState::new(messages, user_context);

        match self.run(state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(target: "boringai::consultant", "Error processing message: {}", e);
                ConsultationOutcome::fallback()
            }
        }
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConsultationOutcome, LlmError> {
        state.current_stage = classify(&state.messages);
        tracing::info!(
            target: "boringai::consultant",
            stage = %state.current_stage,
            turns = state.messages.len(),
            "conversation routed"
        );

        handler_for(state.current_stage)
            .handle(self.model.as_ref(), self.llm_timeout, &mut state)
            .await;

        let instruction = persona::reply_instruction(state.current_stage);
        let messages = with_system(&instruction, &state.messages);
        let response = complete_within(self.model.as_ref(), &messages, self.llm_timeout).await?;

        Ok(ConsultationOutcome {
            response,
            stage: state.current_stage,
            suggested_actions: state.recommendations,
            confidence_score: state.confidence_score,
            business_analysis: state.business_analysis,
        })
    }
}
