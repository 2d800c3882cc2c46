use serde::{Deserialize, Deserializer, Serialize};

/// Number of source snippets requested when the caller does not say.
pub const DEFAULT_TOP_K: u32 = 10;

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

/// Body of `POST /ask` on the backend. Field names follow the backend's
/// snake_case contract.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
    pub top_k: u32,
}

/// JSON body accepted by `POST /Chat/AskApi`.
#[derive(Debug, Deserialize)]
pub struct AskApiRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default = "default_top_k", alias = "topK")]
    pub top_k: u32,
}

/// Form body posted by the chat page.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// One retrieved snippet backing an answer. Smaller distance means closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default)]
    pub distance: f64,
}

/// Answer envelope exchanged with the backend and returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Absent from the reply reads as `false`.
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<SourceInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponse {
    /// Envelope for a failed exchange: no sources, a user-facing answer and a
    /// diagnostic in `error`.
    pub fn failure(answer: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            answer: answer.into(),
            sources: Vec::new(),
            error: Some(error.into()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// True when the question has nothing but whitespace.
pub fn is_blank(question: &str) -> bool {
    question.trim().is_empty()
}
