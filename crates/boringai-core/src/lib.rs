//! BoringAI: Consultation core library.
//! Stage routing, business metadata extraction, and the language-model seam behind `/chat`.

pub mod config;
pub mod consultant;
pub mod extract;
pub mod handlers;
pub mod llm;
pub mod persona;
pub mod stage;
pub mod turn;

pub use config::{ConfigError, ConsultantConfig};
pub use consultant::{BoringConsultant, ConsultationOutcome, ConversationState, FALLBACK_RESPONSE};
pub use extract::{extract_business_context, extract_challenges, BusinessContext, CompanySize};
pub use handlers::{
    handler_for, BusinessAnalysis, BusinessConsultation, QualificationAssessment,
    SolutionRecommendation, StageHandler, RECOMMENDED_ACTIONS,
};
pub use llm::{complete_within, LanguageModel, LlmError, LlmMessage, LlmRole, OpenAiChat};
pub use stage::{classify, Stage};
pub use turn::{to_llm_messages, with_system, ChatTurn, Role};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
