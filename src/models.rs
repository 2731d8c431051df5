use serde::{Deserialize, Serialize};

/// What the user wants done, as extracted by the intent classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    SearchInfo,
    CountItems,
    SearchLatest,
    /// Catch-all for classifier output we do not recognize.
    #[serde(other)]
    Unknown,
}

/// Which collection(s) a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[serde(alias = "circular")]
    Notice,
    #[serde(alias = "instruccion")]
    Instruction,
    #[serde(alias = "reglamento")]
    Regulation,
    #[default]
    #[serde(other)]
    All,
}

/// Internal/external scope of an instruction. Only meaningful for
/// `search_latest` over instructions. The classifier may label these in
/// Spanish, so the aliases accept both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubType {
    #[serde(alias = "interno", alias = "interna")]
    Internal,
    #[serde(alias = "externo", alias = "externa")]
    External,
    #[serde(alias = "ambas", alias = "ambos")]
    Both,
}

/// Structured interpretation of a free-text query. Produced once by the
/// classifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "intent")]
    pub kind: IntentKind,
    #[serde(rename = "documentType", default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "subType", default)]
    pub sub_type: Option<SubType>,
}

impl Intent {
    /// The fallback intent used when classification fails or returns
    /// something unusable.
    pub fn unknown() -> Self {
        Self {
            kind: IntentKind::Unknown,
            document_type: DocumentType::All,
            keywords: Vec::new(),
            year: None,
            sub_type: None,
        }
    }

    /// Whether the intent carries anything to filter on.
    pub fn has_filters(&self) -> bool {
        !self.keywords.is_empty() || self.year.is_some()
    }
}

// ─── Document records ────────────────────────────────────

/// A normalized document as it leaves the core: unique by `id`, no null
/// fields, dates rendered as ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentRecord {
    Notice(Notice),
    Instruction(Instruction),
    RegulationSection(RegulationSection),
}

impl DocumentRecord {
    pub fn id(&self) -> &str {
        match self {
            Self::Notice(n) => &n.id,
            Self::Instruction(i) => &i.id,
            Self::RegulationSection(s) => &s.id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Notice(n) => n.topic.as_deref(),
            Self::Instruction(i) => i.title.as_deref(),
            Self::RegulationSection(s) => s.title.as_deref(),
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Notice(n) => n.summary.as_deref(),
            Self::Instruction(i) => i.summary.as_deref(),
            Self::RegulationSection(s) => s.summary.as_deref(),
        }
    }

    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Notice(n) => n.link.as_deref(),
            Self::Instruction(i) => i.link.as_deref(),
            Self::RegulationSection(s) => s.link.as_deref(),
        }
    }
}

/// A short administrative circular, identified by a "number/year" code
/// such as "06/20".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    /// Normative type label, e.g. "Circular"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm_type: Option<String>,
    /// "NN/YY" identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// ISO-8601 string after normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<AffectedEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// An entity affected by a notice (registered, modified, removed...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_kind: Option<String>,
}

/// An operational directive whose title encodes scope and sequence,
/// e.g. "I141 - Procedimiento de altas".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A titled subdivision of the regulation, holding ordered articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationSection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articles: Vec<Article>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Stringified for uniform rendering even when stored as a number
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

// ─── Answer context ──────────────────────────────────────

/// Either the records to ground the answer in, or a scalar count for
/// `count_items` intents.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextPayload {
    Records(Vec<DocumentRecord>),
    Count(u64),
}

/// Everything the synthesizer needs to produce prose: the pruned context
/// plus the intent metadata its formatting rules key on.
#[derive(Debug, Clone)]
pub struct AnswerContext {
    pub query: String,
    pub intent_kind: IntentKind,
    pub document_type: DocumentType,
    /// True total, which may exceed the records serialized into `payload`
    pub results_count: usize,
    pub payload: ContextPayload,
    /// Canonical regulation link, present when regulation content is in scope
    pub regulation_link: Option<&'static str>,
}

// ─── HTTP types ──────────────────────────────────────────

/// Ask request
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

/// Ask response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub results: Vec<DocumentRecord>,
    pub answer: String,
}
