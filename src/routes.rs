use std::path::PathBuf;
use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::error::SubmitError;
use crate::messages::{Message, MessageBoard, Submission};
use crate::news::snapshot::read_snapshot;
use crate::view::{paginate, ArticleView};

pub struct AppState {
    pub snapshot_path: PathBuf,
    pub page_size: usize,
    pub refresh_interval_secs: u64,
    pub board: MessageBoard,
}

// Template structs
#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsTemplate {
    pub articles: Vec<ArticleView>,
    pub error: Option<String>,
    pub query: String,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub last_updated: String,
    pub refresh_secs: u64,
}

#[derive(Template)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub messages: Vec<Message>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "message_posted.html")]
pub struct MessagePostedTemplate {
    pub message: Message,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

/// Full application router, including static snapshot files under `/data`.
pub fn app(state: Arc<AppState>) -> Router {
    let data_dir = state
        .snapshot_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    Router::new()
        .route("/", get(index))
        .route("/messages", get(messages).post(post_message))
        .route("/health", get(health))
        .nest_service("/data", ServeDir::new(data_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub q: String,
}

impl NewsQuery {
    /// Requested page; anything that is not a number means the first page.
    pub fn page_number(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

// Route handlers
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> impl IntoResponse {
    let mut template = NewsTemplate {
        articles: Vec::new(),
        error: None,
        query: query.q.clone(),
        page: 1,
        total_pages: 1,
        total_matches: 0,
        has_prev: false,
        has_next: false,
        last_updated: String::new(),
        refresh_secs: state.refresh_interval_secs,
    };

    match read_snapshot(&state.snapshot_path).await {
        Ok(snapshot) => {
            let page = paginate(&snapshot.articles, &query.q, query.page_number(), state.page_size);
            template.has_prev = page.has_prev();
            template.has_next = page.has_next();
            template.page = page.number;
            template.total_pages = page.total_pages;
            template.total_matches = page.total_matches;
            template.articles = page.articles;
            template.last_updated = snapshot
                .last_updated
                .to_rfc3339_opts(SecondsFormat::Secs, true);
        }
        Err(e) => {
            warn!(path = %state.snapshot_path.display(), "Failed to load snapshot: {}", e);
            template.error = Some("News is unavailable right now. Please try again later.".to_string());
        }
    }

    HtmlTemplate(template)
}

pub async fn messages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let template = match state.board.messages_for(today).await {
        Ok(messages) => MessagesTemplate {
            messages,
            error: None,
        },
        Err(e) => {
            warn!("Failed to load messages: {}", e);
            MessagesTemplate {
                messages: Vec::new(),
                error: Some("Messages could not be loaded.".to_string()),
            }
        }
    };
    HtmlTemplate(template)
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<Submission>,
) -> Result<Response, AppError> {
    match state.board.submit(&submission, Utc::now()).await {
        Ok(message) => Ok(HtmlTemplate(MessagePostedTemplate { message }).into_response()),
        Err(SubmitError::Invalid(reason)) => Ok((StatusCode::BAD_REQUEST, reason).into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
