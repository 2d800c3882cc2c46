use crate::error::AppError;
use crate::models::chat::is_blank;
use crate::models::{AskApiRequest, AskForm, ChatResponse, SourceInfo, DEFAULT_TOP_K};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    response::IntoResponse,
    Form, Json,
};
use serde::Serialize;

/// Shown on the page when the form is submitted without a question.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// Returned by the JSON API for a missing or blank question.
pub const EMPTY_QUESTION_API_ERROR: &str = "Question must not be empty";

/// The chat page and its view model.
#[derive(Template, Default)]
#[template(path = "chat/index.html")]
pub struct ChatTemplate {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceInfo>,
    pub has_error: bool,
    pub error_message: Option<String>,
}

impl ChatTemplate {
    fn empty_question() -> Self {
        Self {
            has_error: true,
            error_message: Some(EMPTY_QUESTION_MESSAGE.to_string()),
            ..Default::default()
        }
    }

    fn answered(question: String, response: ChatResponse) -> Self {
        Self {
            question,
            answer: response.answer,
            sources: response.sources,
            has_error: !response.success,
            error_message: response.error,
        }
    }

    pub fn error_text(&self) -> &str {
        self.error_message.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
}

pub async fn index() -> impl IntoResponse {
    ChatTemplate::default()
}

/// Form post from the chat page. A missing or unreadable body is treated as
/// an empty question so the page is always rendered.
pub async fn ask(
    State(state): State<AppState>,
    form: Result<Form<AskForm>, FormRejection>,
) -> impl IntoResponse {
    let form = match form {
        Ok(Form(form)) if !is_blank(&form.question) => form,
        Ok(_) => return ChatTemplate::empty_question(),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable chat form");
            return ChatTemplate::empty_question();
        }
    };

    let response = state.backend.ask(&form.question, DEFAULT_TOP_K).await;
    ChatTemplate::answered(form.question, response)
}

/// JSON endpoint used by the page script. Relays the backend envelope as is.
pub async fn ask_api(
    State(state): State<AppState>,
    payload: Result<Json<AskApiRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;

    let question = match request.question.as_deref() {
        Some(question) if !is_blank(question) => question,
        _ => return Err(AppError::BadRequest(anyhow::anyhow!(EMPTY_QUESTION_API_ERROR))),
    };

    Ok(Json(state.backend.ask(question, request.top_k).await))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: state.backend.check_health().await,
    })
}
