//! Stage handlers: consultation, recommendation, qualification.
//!
//! Every handler sends `[persona + stage guidance, ...history]` to the model and, on
//! success, stamps its payload and confidence onto the state. A failed call is logged
//! and only lowers confidence; handlers never fail the request.
//!
//! The handler's own reply is not shown to the user. [`BoringConsultant`] makes a
//! second call for the visible text, so each turn costs two model calls.
//!
//! [`BoringConsultant`]: crate::consultant::BoringConsultant

use crate::consultant::ConversationState;
use crate::extract::{extract_business_context, extract_challenges, BusinessContext};
use crate::llm::{complete_within, LanguageModel};
use crate::persona;
use crate::stage::Stage;
use crate::turn::with_system;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Suggested next steps set by a successful recommendation stage.
pub const RECOMMENDED_ACTIONS: &[&str] = &["Process automation assessment", "Custom solution design"];

/// Analysis written by the active handler. Absent fields are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_challenges: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_context: Option<BusinessContext>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub qualification_stage: bool,
}

#[async_trait]
pub trait StageHandler: Send + Sync {
    fn stage(&self) -> Stage;

    fn success_confidence(&self) -> f64;

    fn failure_confidence(&self) -> f64;

    /// Writes this stage's payload after a successful model call.
    fn record(&self, state: &mut ConversationState);

    fn instruction(&self) -> String {
        persona::stage_instruction(self.stage())
    }

    async fn handle(
        &self,
        model: &dyn LanguageModel,
        limit: Duration,
        state: &mut ConversationState,
    ) {
        let messages = with_system(&self.instruction(), &state.messages);
        match complete_within(model, &messages, limit).await {
            Ok(reply) => {
                tracing::debug!(
                    target: "boringai::handlers",
                    stage = %self.stage(),
                    reply_chars = reply.chars().count(),
                    "stage reply discarded"
                );
                self.record(state);
                state.confidence_score = self.success_confidence();
            }
            Err(e) => {
                tracing::error!(
                    target: "boringai::handlers",
                    "Error in {} stage: {}",
                    self.stage(),
                    e
                );
                state.confidence_score = self.failure_confidence();
            }
        }
    }
}

/// Gathers requirements; records challenges and business context.
pub struct BusinessConsultation;

impl StageHandler for BusinessConsultation {
    fn stage(&self) -> Stage {
        Stage::Consultation
    }

    fn success_confidence(&self) -> f64 {
        0.8
    }

    fn failure_confidence(&self) -> f64 {
        0.3
    }

    fn record(&self, state: &mut ConversationState) {
        state.business_analysis = BusinessAnalysis {
            stage: Some(Stage::Consultation),
            identified_challenges: Some(extract_challenges(&state.messages)),
            business_context: Some(extract_business_context(&state.messages)),
            qualification_stage: false,
        };
    }
}

/// Proposes automation work; records the fixed suggested actions.
pub struct SolutionRecommendation;

impl StageHandler for SolutionRecommendation {
    fn stage(&self) -> Stage {
        Stage::Recommendation
    }

    fn success_confidence(&self) -> f64 {
        0.9
    }

    fn failure_confidence(&self) -> f64 {
        0.4
    }

    fn record(&self, state: &mut ConversationState) {
        state.recommendations = RECOMMENDED_ACTIONS.iter().map(|a| a.to_string()).collect();
    }
}

/// Pricing / timeline interest; flags the analysis as qualification.
pub struct QualificationAssessment;

impl StageHandler for QualificationAssessment {
    fn stage(&self) -> Stage {
        Stage::Qualification
    }

    fn success_confidence(&self) -> f64 {
        0.85
    }

    fn failure_confidence(&self) -> f64 {
        0.3
    }

    fn record(&self, state: &mut ConversationState) {
        state.business_analysis.qualification_stage = true;
    }
}

pub fn handler_for(stage: Stage) -> &'static dyn StageHandler {
    match stage {
        Stage::Consultation => &BusinessConsultation,
        Stage::Recommendation => &SolutionRecommendation,
        Stage::Qualification => &QualificationAssessment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CompanySize;
    use crate::llm::scripted::ScriptedModel;
    use crate::llm::{LlmError, LlmRole};
    use crate::turn::ChatTurn;

    const LIMIT: Duration = Duration::from_secs(1);

    fn state(turns: Vec<ChatTurn>) -> ConversationState {
        ConversationState::new(turns, serde_json::Map::new())
    }

    #[tokio::test]
    async fn consultation_records_analysis() {
        let model = ScriptedModel::new(vec![Ok("ignored".into())]);
        let mut s = state(vec![ChatTurn::user(
            "Our healthcare startup has a manual billing problem",
        )]);

        handler_for(Stage::Consultation).handle(&model, LIMIT, &mut s).await;

        assert_eq!(s.confidence_score, 0.8);
        assert_eq!(s.business_analysis.stage, Some(Stage::Consultation));
        assert_eq!(
            s.business_analysis.identified_challenges.as_deref(),
            Some(&["Our healthcare startup has a manual billing problem".to_string()][..])
        );
        let context = s.business_analysis.business_context.clone().unwrap();
        assert_eq!(context.industry.as_deref(), Some("healthcare"));
        assert_eq!(context.company_size, Some(CompanySize::Small));
        assert!(s.recommendations.is_empty());

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, LlmRole::System);
        assert!(calls[0][0].content.contains("CURRENT CONVERSATION STAGE: Business Consultation"));
    }

    #[tokio::test]
    async fn recommendation_sets_actions() {
        let model = ScriptedModel::new(vec![Ok("ignored".into())]);
        let mut s = state(vec![ChatTurn::user("What should we automate?")]);

        handler_for(Stage::Recommendation).handle(&model, LIMIT, &mut s).await;

        assert_eq!(s.confidence_score, 0.9);
        assert_eq!(
            s.recommendations,
            vec!["Process automation assessment", "Custom solution design"]
        );
        assert_eq!(s.business_analysis, BusinessAnalysis::default());
    }

    #[tokio::test]
    async fn qualification_flags_analysis() {
        let model = ScriptedModel::new(vec![Ok("ignored".into())]);
        let mut s = state(vec![ChatTurn::user("What's the price?")]);

        handler_for(Stage::Qualification).handle(&model, LIMIT, &mut s).await;

        assert_eq!(s.confidence_score, 0.85);
        assert!(s.business_analysis.qualification_stage);
        assert_eq!(
            serde_json::to_value(&s.business_analysis).unwrap(),
            serde_json::json!({ "qualification_stage": true })
        );
    }

    #[tokio::test]
    async fn failures_lower_confidence_and_leave_state_alone() {
        for (stage, expected) in [
            (Stage::Consultation, 0.3),
            (Stage::Recommendation, 0.4),
            (Stage::Qualification, 0.3),
        ] {
            let model = ScriptedModel::new(vec![Err(LlmError::Api {
                status: 503,
                body: "overloaded".into(),
            })]);
            let mut s = state(vec![ChatTurn::user("A difficult problem in retail")]);

            handler_for(stage).handle(&model, LIMIT, &mut s).await;

            assert_eq!(s.confidence_score, expected, "{stage}");
            assert_eq!(s.business_analysis, BusinessAnalysis::default());
            assert!(s.recommendations.is_empty());
        }
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let model = ScriptedModel::stalled(Duration::from_secs(5));
        let mut s = state(vec![ChatTurn::user("hello")]);

        handler_for(Stage::Recommendation)
            .handle(&model, Duration::from_millis(20), &mut s)
            .await;

        assert_eq!(s.confidence_score, 0.4);
    }
}
