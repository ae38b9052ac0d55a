use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nr_core::{Article, ArticleRef, FeedbackEntry, FeedbackStore};
use nr_engine::corpus::ALL_CATEGORIES;
use nr_engine::Evaluation;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message }
    }
}

impl From<nr_core::Error> for ApiError {
    fn from(e: nr_core::Error) -> Self {
        error!("Request failed: {}", e);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Json<Vec<Article>> {
    let session = state.snapshot().await;
    let category = query.category.as_deref().unwrap_or(ALL_CATEGORIES);
    Json(session.filter_by_category(category).into_iter().cloned().collect())
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.snapshot().await.categories())
}

pub async fn similar_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> Json<Vec<ArticleRef>> {
    Json(state.snapshot().await.content_recommendations(&query.title))
}

pub async fn user_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
) -> Json<Vec<ArticleRef>> {
    Json(state.snapshot().await.collaborative_recommendations(user_id))
}

pub async fn record_feedback(
    State(state): State<Arc<AppState>>,
    Json(entry): Json<FeedbackEntry>,
) -> Result<StatusCode, ApiError> {
    let session = state.snapshot().await;
    if session.article(entry.article_id).is_none() {
        return Err(ApiError::bad_request(format!(
            "Unknown article id {} (corpus has {} articles)",
            entry.article_id,
            session.corpus().len()
        )));
    }

    info!("📝 User {} {} article {}", entry.user_id, entry.feedback, entry.article_id);
    state.feedback.append(entry).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn evaluation(State(state): State<Arc<AppState>>) -> Json<Evaluation> {
    Json(state.snapshot().await.evaluate())
}

/// Retrain on the current corpus. Recorded feedback becomes the rating
/// source when there is any.
pub async fn rebuild(State(state): State<Arc<AppState>>) -> Result<Json<Evaluation>, ApiError> {
    let current = state.snapshot().await;
    let ratings = nr_storage::feedback_ratings(state.feedback.as_ref()).await?;
    let ratings = if ratings.is_empty() { None } else { Some(ratings) };

    info!("🔄 Rebuilding models for {} articles", current.corpus().len());
    let session = crate::build_session(current.corpus().to_vec(), ratings, current.config()).await?;
    let evaluation = session.evaluate();
    state.replace(session).await;
    Ok(Json(evaluation))
}
