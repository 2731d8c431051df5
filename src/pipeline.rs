//! Orchestration of one question/answer turn.
//!
//! The turn walks a fixed state machine: classify, then either stop with a
//! fixed reply (unknown intent, nothing to filter on, zero matches) or fetch
//! and normalize context and hand it to the synthesizer. [`Pipeline::answer`]
//! drives the whole machine inline; callers that perform retrieval
//! themselves use [`Pipeline::classify_turn`] to get a
//! [`Turn::NeedsContext`] signal and [`Pipeline::complete_with_context`] to
//! finish, walking the same transitions either way.

use std::sync::Arc;

use crate::config::REGULATION_LINK;
use crate::error::AskError;
use crate::llm::{Classifier, Synthesizer};
use crate::models::{
    AnswerContext, AskResponse, ContextPayload, DocumentRecord, Intent, IntentKind,
};
use crate::search::dispatch::{dispatch, targets, Retrieved};
use crate::store::{CollectionKind, DocumentStore};

/// Fixed reply when the query is a greeting the classifier could not map
/// to a document question.
const GREETING_REPLY: &str = "¡Hola! Soy el asistente de normativa. Puedo buscar circulares, \
     instrucciones y el reglamento. ¿En qué puedo ayudarte?";

/// Fixed reply for queries with no usable intent.
const CANNOT_HELP_REPLY: &str = "Lo siento, no he entendido la consulta. Prueba a preguntar por \
     una circular, una instrucción o un artículo del reglamento.";

/// Fixed reply when retrieval matches nothing; the synthesizer is skipped.
const NO_MATCHES_REPLY: &str =
    "No se han encontrado documentos que coincidan con la consulta.";

const GREETING_TOKENS: &[&str] = &[
    "hola",
    "buenas",
    "buenos días",
    "buenos dias",
    "saludos",
    "hello",
    "hi",
    "hey",
];

const MAX_QUERY_CHARS: usize = 500;

/// Result of the classification phase: either a terminal reply produced
/// without touching the store, or a request for retrieval context.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    Complete(AskResponse),
    NeedsContext { intent: Intent },
}

pub struct Pipeline {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn DocumentStore>,
    synthesizer: Arc<dyn Synthesizer>,
    max_context_records: usize,
}

impl Pipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn DocumentStore>,
        synthesizer: Arc<dyn Synthesizer>,
        max_context_records: usize,
    ) -> Self {
        Self {
            classifier,
            store,
            synthesizer,
            max_context_records,
        }
    }

    /// Run a full turn inline: classify, fetch, synthesize.
    pub async fn answer(&self, query: &str) -> Result<AskResponse, AskError> {
        match self.classify_turn(query).await? {
            Turn::Complete(reply) => Ok(reply),
            Turn::NeedsContext { intent } => {
                let retrieved = self.fetch_context(&intent).await?;
                self.complete_with_context(query, &intent, retrieved).await
            }
        }
    }

    /// Classification phase. Validates the query, obtains the intent
    /// (degrading classifier failures to an unknown intent) and decides
    /// whether the turn can finish without store access.
    pub async fn classify_turn(&self, query: &str) -> Result<Turn, AskError> {
        let query = validate_query(query)?;

        let intent = match self.classifier.classify(query).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!("intent classification unavailable, degrading: {e:#}");
                Intent::unknown()
            }
        };
        tracing::debug!(?intent, "classified query");

        if let Some(answer) = short_circuit_reply(query, &intent) {
            return Ok(Turn::Complete(AskResponse {
                results: Vec::new(),
                answer: answer.to_string(),
            }));
        }

        Ok(Turn::NeedsContext { intent })
    }

    /// Retrieval phase: dispatch across collections and normalize.
    pub async fn fetch_context(&self, intent: &Intent) -> Result<Retrieved, AskError> {
        Ok(dispatch(self.store.as_ref(), intent).await?)
    }

    /// Synthesis phase. Applies the zero-result short-circuit, assembles
    /// the answer context and invokes the synthesizer.
    pub async fn complete_with_context(
        &self,
        query: &str,
        intent: &Intent,
        retrieved: Retrieved,
    ) -> Result<AskResponse, AskError> {
        match retrieved {
            Retrieved::Records(records) if records.is_empty() => Ok(AskResponse {
                results: Vec::new(),
                answer: NO_MATCHES_REPLY.to_string(),
            }),
            Retrieved::Records(mut records) => {
                backfill_regulation_links(&mut records);
                let context = self.records_context(query, intent, &records);
                let answer = self.synthesize(&context).await?;
                Ok(AskResponse { results: records, answer })
            }
            Retrieved::Count(count) => {
                let context = count_context(query, intent, count);
                let answer = self.synthesize(&context).await?;
                Ok(AskResponse {
                    results: Vec::new(),
                    answer,
                })
            }
        }
    }

    async fn synthesize(&self, context: &AnswerContext) -> Result<String, AskError> {
        self.synthesizer.synthesize(context).await.map_err(|e| {
            tracing::error!("answer synthesis failed: {e:#}");
            AskError::Upstream(e.to_string())
        })
    }

    fn records_context(
        &self,
        query: &str,
        intent: &Intent,
        records: &[DocumentRecord],
    ) -> AnswerContext {
        let shown: Vec<DocumentRecord> =
            records.iter().take(self.max_context_records).cloned().collect();
        let regulation_relevant = records
            .iter()
            .any(|r| matches!(r, DocumentRecord::RegulationSection(_)));

        AnswerContext {
            query: query.to_string(),
            intent_kind: intent.kind,
            document_type: intent.document_type,
            results_count: records.len(),
            payload: ContextPayload::Records(shown),
            regulation_link: regulation_relevant.then_some(REGULATION_LINK),
        }
    }
}

fn count_context(query: &str, intent: &Intent, count: u64) -> AnswerContext {
    let counts_regulation = targets(intent.document_type)
        .iter()
        .any(|&c| c == CollectionKind::Regulation);

    AnswerContext {
        query: query.to_string(),
        intent_kind: intent.kind,
        document_type: intent.document_type,
        results_count: count as usize,
        payload: ContextPayload::Count(count),
        regulation_link: counts_regulation.then_some(REGULATION_LINK),
    }
}

fn validate_query(query: &str) -> Result<&str, AskError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(AskError::Validation("query must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(AskError::Validation(format!(
            "query exceeds {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Terminal replies that need no store access: unknown intent, or an
/// information search with nothing to filter on. Count and latest intents
/// are dispatchable without keywords, so they pass through.
fn short_circuit_reply(query: &str, intent: &Intent) -> Option<&'static str> {
    let unusable = intent.kind == IntentKind::Unknown
        || (intent.kind == IntentKind::SearchInfo && !intent.has_filters());
    if !unusable {
        return None;
    }
    if is_greeting(query) {
        Some(GREETING_REPLY)
    } else {
        Some(CANNOT_HELP_REPLY)
    }
}

fn is_greeting(query: &str) -> bool {
    let lowered = query.to_lowercase();
    GREETING_TOKENS.iter().any(|token| {
        if token.contains(' ') {
            lowered.contains(token)
        } else {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *token)
        }
    })
}

/// Regulation sections always point at the canonical consolidated text
/// when the store carries no per-section link.
fn backfill_regulation_links(records: &mut [DocumentRecord]) {
    for record in records {
        if let DocumentRecord::RegulationSection(section) = record {
            if section.link.is_none() {
                section.link = Some(REGULATION_LINK.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentType, RegulationSection, SubType};

    #[test]
    fn test_validate_query_bounds() {
        assert!(validate_query("   ").is_err());
        assert!(validate_query("").is_err());
        assert!(validate_query(&"a".repeat(501)).is_err());
        assert_eq!(validate_query("  hola  ").unwrap(), "hola");
        assert!(validate_query(&"a".repeat(500)).is_ok());
    }

    #[test]
    fn test_is_greeting_tokens() {
        assert!(is_greeting("hola"));
        assert!(is_greeting("¡Hola! ¿Qué tal?"));
        assert!(is_greeting("Buenos días"));
        assert!(is_greeting("hey there"));
        assert!(!is_greeting("cuántos artículos tiene el reglamento"));
        // "hi" must match as a word, not inside one
        assert!(!is_greeting("archivo"));
        assert!(!is_greeting("china"));
    }

    #[test]
    fn test_short_circuit_unknown_intent() {
        let intent = Intent::unknown();
        assert_eq!(short_circuit_reply("hola", &intent), Some(GREETING_REPLY));
        assert_eq!(
            short_circuit_reply("qué es esto", &intent),
            Some(CANNOT_HELP_REPLY)
        );
    }

    #[test]
    fn test_short_circuit_search_without_filters() {
        let intent = Intent {
            kind: IntentKind::SearchInfo,
            document_type: DocumentType::Notice,
            keywords: Vec::new(),
            year: None,
            sub_type: None,
        };
        assert!(short_circuit_reply("busca circulares", &intent).is_some());
    }

    #[test]
    fn test_no_short_circuit_with_filters() {
        let intent = Intent {
            kind: IntentKind::SearchInfo,
            document_type: DocumentType::Notice,
            keywords: vec!["caja".into()],
            year: None,
            sub_type: None,
        };
        assert!(short_circuit_reply("circulares de caja", &intent).is_none());
    }

    #[test]
    fn test_count_and_latest_pass_without_keywords() {
        let count = Intent {
            kind: IntentKind::CountItems,
            document_type: DocumentType::Regulation,
            keywords: Vec::new(),
            year: None,
            sub_type: None,
        };
        assert!(short_circuit_reply("cuántos artículos", &count).is_none());

        let latest = Intent {
            kind: IntentKind::SearchLatest,
            document_type: DocumentType::Instruction,
            keywords: Vec::new(),
            year: None,
            sub_type: Some(SubType::Internal),
        };
        assert!(short_circuit_reply("última instrucción interna", &latest).is_none());
    }

    #[test]
    fn test_backfill_regulation_links() {
        let mut records = vec![DocumentRecord::RegulationSection(RegulationSection {
            id: "r1".into(),
            title: None,
            summary: None,
            keywords: Vec::new(),
            articles: Vec::new(),
            link: None,
        })];
        backfill_regulation_links(&mut records);
        assert_eq!(records[0].link(), Some(REGULATION_LINK));
    }

    #[test]
    fn test_count_context_flags_regulation_link() {
        let intent = Intent {
            kind: IntentKind::CountItems,
            document_type: DocumentType::Regulation,
            keywords: Vec::new(),
            year: None,
            sub_type: None,
        };
        let ctx = count_context("cuántos artículos", &intent, 87);
        assert_eq!(ctx.regulation_link, Some(REGULATION_LINK));
        assert_eq!(ctx.payload, ContextPayload::Count(87));

        let intent = Intent {
            kind: IntentKind::CountItems,
            document_type: DocumentType::Notice,
            keywords: Vec::new(),
            year: None,
            sub_type: None,
        };
        let ctx = count_context("cuántas circulares", &intent, 12);
        assert_eq!(ctx.regulation_link, None);
    }
}
