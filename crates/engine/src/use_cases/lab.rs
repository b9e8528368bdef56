//! Lab use cases.
//!
//! - Generating a batch of new creatures through the LLM
//! - Recommending a companion from the current batch for a personality

use std::sync::Arc;

use serde::Serialize;

use pokearena_domain::{
    BatchSize, CharacterRecord, ElementType, GeneratedBatch, LookupError, SessionState,
    ValidationError,
};

use crate::infrastructure::ports::{LlmError, LlmPort};
use crate::prompt_templates::{build_generation_prompt, build_recommendation_prompt};
use crate::use_cases::response_parser::{
    extract_choice, strip_json_fence, strip_special_tokens, ExtractionError,
};

pub const GENERATION_TEMPERATURE: f32 = 0.9;
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.2;

/// Container for lab use cases.
pub struct LabUseCases {
    pub generate_batch: Arc<GenerateBatch>,
    pub recommend_companion: Arc<RecommendCompanion>,
}

impl LabUseCases {
    pub fn new(generate_batch: Arc<GenerateBatch>, recommend_companion: Arc<RecommendCompanion>) -> Self {
        Self {
            generate_batch,
            recommend_companion,
        }
    }
}

// =============================================================================
// Batch Generation
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Service(#[from] LlmError),
    #[error("Generated payload rejected: {0}")]
    Payload(#[from] ValidationError),
    #[error("Generated batch contains no creatures")]
    EmptyBatch,
}

pub struct GenerateBatch {
    llm: Arc<dyn LlmPort>,
}

impl GenerateBatch {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// Generate a fresh batch and make it the session's current one.
    ///
    /// A count different from `size` is accepted with a warning. On success the
    /// previous batch and companion are discarded.
    pub async fn execute(
        &self,
        session: &mut SessionState,
        size: BatchSize,
        dominant_type: Option<ElementType>,
    ) -> Result<GeneratedBatch, GenerationError> {
        let request = build_generation_prompt(size, dominant_type)
            .into_request()
            .with_temperature(GENERATION_TEMPERATURE)
            .with_json_response();

        tracing::debug!(
            size = size.get(),
            dominant_type = dominant_type.map(|t| t.label()),
            "Requesting creature batch"
        );

        let response = self.llm.generate(request).await.map_err(|e| {
            tracing::error!(error = %e, "Batch generation failed");
            GenerationError::Service(e)
        })?;

        let cleaned = strip_special_tokens(&response.content);
        let batch = GeneratedBatch::ingest(strip_json_fence(&cleaned)).map_err(|e| {
            tracing::warn!(error = %e, "Generated payload rejected");
            GenerationError::Payload(e)
        })?;

        if batch.is_empty() {
            return Err(GenerationError::EmptyBatch);
        }

        if batch.len() != usize::from(size.get()) {
            tracing::warn!(
                requested = size.get(),
                received = batch.len(),
                "Generated batch size differs from the request"
            );
        }

        tracing::info!(count = batch.len(), columns = ?batch.columns(), "Batch generated");

        session.replace_batch(batch.clone());
        Ok(batch)
    }
}

// =============================================================================
// Companion Recommendation
// =============================================================================

/// Chosen companion with its identity card (pretty-printed record).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionReport {
    pub choice: String,
    pub record: CharacterRecord,
    pub identity_card: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("Describe your personality first")]
    EmptyDescription,
    #[error("Generate a batch before asking for a companion")]
    NoBatch,
    #[error(transparent)]
    Service(#[from] LlmError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub struct RecommendCompanion {
    llm: Arc<dyn LlmPort>,
}

impl RecommendCompanion {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// Recommend a companion for `description`, which is sent to the model
    /// exactly as typed.
    pub async fn execute(
        &self,
        session: &mut SessionState,
        description: &str,
    ) -> Result<CompanionReport, RecommendationError> {
        if description.trim().is_empty() {
            return Err(RecommendationError::EmptyDescription);
        }

        let batch = session
            .batch()
            .filter(|batch| !batch.is_empty())
            .ok_or(RecommendationError::NoBatch)?;

        let request = build_recommendation_prompt(batch, description)
            .into_request()
            .with_temperature(RECOMMENDATION_TEMPERATURE)
            .with_json_response();

        tracing::debug!(candidates = batch.len(), "Requesting companion recommendation");

        let response = self.llm.generate(request).await.map_err(|e| {
            tracing::error!(error = %e, "Companion recommendation failed");
            RecommendationError::Service(e)
        })?;

        let choice = extract_choice(&response.content)?;
        let selection = session.select_companion(&choice).map_err(|e| {
            tracing::warn!(choice = %choice, error = %e, "Recommended companion not in batch");
            RecommendationError::Lookup(e)
        })?;

        tracing::info!(companion = %selection.name, "Companion selected");

        Ok(CompanionReport {
            choice: selection.name.clone(),
            record: selection.record.clone(),
            identity_card: selection.record.to_pretty_json(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort, ResponseFormat};

    const BATCH_REPLY: &str = r#"{"pokemon":[
        {"Nom":"Aquashock","Type":"Eau","Personnalite":"Calme"},
        {"Nom":"Flamgeist","Type":"Feu","Personnalite":"Fougueux"},
        {"Nom":"Terragon","Type":"Sol","Personnalite":"Têtu"}
    ]}"#;

    fn mock_replying(content: &'static str) -> Arc<MockLlmPort> {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .times(1)
            .returning(move |_| Ok(LlmResponse::text(content)));
        Arc::new(llm)
    }

    fn session_with_batch() -> SessionState {
        let mut session = SessionState::new();
        session.replace_batch(GeneratedBatch::ingest(BATCH_REPLY).unwrap());
        session
    }

    #[tokio::test]
    async fn test_generate_replaces_batch() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| {
                request.response_format == ResponseFormat::JsonObject
                    && request.temperature == Some(GENERATION_TEMPERATURE)
                    && request
                        .system_prompt
                        .as_deref()
                        .is_some_and(|s| s.contains("exactement 3"))
            })
            .times(1)
            .returning(|_| Ok(LlmResponse::text(BATCH_REPLY)));

        let mut session = session_with_batch();
        session.select_companion("Aquashock").unwrap();

        let batch = GenerateBatch::new(Arc::new(llm))
            .execute(&mut session, BatchSize::default(), Some(ElementType::Eau))
            .await
            .unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.name_column(), Some("nom"));
        assert_eq!(session.batch(), Some(&batch));
        assert!(session.companion().is_none());
    }

    #[tokio::test]
    async fn test_generate_accepts_fenced_reply_and_size_mismatch() {
        let llm = mock_replying("```json\n{\"pokemon\":[{\"Nom\":\"Solo\",\"Type\":\"Vol\"}]}\n```");
        let mut session = SessionState::new();

        let batch = GenerateBatch::new(llm)
            .execute(&mut session, BatchSize::new(5).unwrap(), None)
            .await
            .unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(session.batch().map(GeneratedBatch::len), Some(1));
    }

    #[tokio::test]
    async fn test_generate_bad_payload_keeps_session() {
        let llm = mock_replying(r#"{"a":[],"b":[]}"#);
        let mut session = session_with_batch();
        let before = session.clone();

        let result = GenerateBatch::new(llm)
            .execute(&mut session, BatchSize::default(), None)
            .await;

        assert!(matches!(
            result,
            Err(GenerationError::Payload(ValidationError::AmbiguousPayload { .. }))
        ));
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn test_generate_empty_batch() {
        let llm = mock_replying(r#"{"pokemon":[]}"#);
        let mut session = SessionState::new();

        let result = GenerateBatch::new(llm)
            .execute(&mut session, BatchSize::default(), None)
            .await;
        assert!(matches!(result, Err(GenerationError::EmptyBatch)));
        assert!(session.batch().is_none());
    }

    #[tokio::test]
    async fn test_recommend_selects_companion() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| {
                request.temperature == Some(RECOMMENDATION_TEMPERATURE)
                    && request.messages[0]
                        .content
                        .ends_with("dresseur :\n  Je suis calme et patient.  ")
            })
            .times(1)
            .returning(|_| Ok(LlmResponse::text(r#"{"choix": "aquashock"}"#)));

        let mut session = session_with_batch();
        let report = RecommendCompanion::new(Arc::new(llm))
            .execute(&mut session, "  Je suis calme et patient.  ")
            .await
            .unwrap();

        assert_eq!(report.choice, "Aquashock");
        assert!(report.identity_card.contains("\"personnalite\": \"Calme\""));
        assert_eq!(
            session.companion().map(|c| c.name.as_str()),
            Some("Aquashock")
        );
    }

    #[tokio::test]
    async fn test_recommend_requires_description_and_batch() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().never();
        let recommend = RecommendCompanion::new(Arc::new(llm));

        let mut session = session_with_batch();
        assert!(matches!(
            recommend.execute(&mut session, "   ").await,
            Err(RecommendationError::EmptyDescription)
        ));

        let mut empty = SessionState::new();
        assert!(matches!(
            recommend.execute(&mut empty, "Joyeux").await,
            Err(RecommendationError::NoBatch)
        ));
    }

    #[tokio::test]
    async fn test_recommend_unknown_name_keeps_selection() {
        let llm = mock_replying(r#"{"choix": "Ghostname"}"#);
        let mut session = session_with_batch();
        session.select_companion("Terragon").unwrap();

        let result = RecommendCompanion::new(llm)
            .execute(&mut session, "Mystérieux")
            .await;

        assert!(matches!(
            result,
            Err(RecommendationError::Lookup(LookupError::NotFound(_)))
        ));
        assert_eq!(
            session.companion().map(|c| c.name.as_str()),
            Some("Terragon")
        );
    }

    #[tokio::test]
    async fn test_recommend_malformed_reply() {
        let llm = mock_replying("Je choisis Aquashock !");
        let mut session = session_with_batch();

        let result = RecommendCompanion::new(llm)
            .execute(&mut session, "Joyeux")
            .await;
        assert!(matches!(
            result,
            Err(RecommendationError::Extraction(
                ExtractionError::MalformedResponse(_)
            ))
        ));
        assert!(session.companion().is_none());
    }
}
