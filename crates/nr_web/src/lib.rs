use axum::{
    routing::{get, post},
    Router,
};
use nr_core::{Article, RatingSource, Result, StaticRatings};
use nr_engine::{EngineConfig, RandomRatings, Session};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/recommendations/similar", get(handlers::similar_articles))
        .route("/api/recommendations/users/:id", get(handlers::user_recommendations))
        .route("/api/feedback", post(handlers::record_feedback))
        .route("/api/evaluation", get(handlers::evaluation))
        .route("/api/rebuild", post(handlers::rebuild))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}

/// Build a session off the async runtime. Ratings come from `ratings` when
/// given, random draws otherwise. If the configured build budget runs out the
/// result is an empty session.
pub async fn build_session(
    corpus: Vec<Article>,
    ratings: Option<StaticRatings>,
    config: &EngineConfig,
) -> Result<Session> {
    let build_config = config.clone();
    let budget = config.build_timeout_secs.map(Duration::from_secs);
    let built = build_within(budget, move |cancelled| {
        let mut source: Box<dyn RatingSource> = match ratings {
            Some(ratings) => Box::new(ratings),
            None => Box::new(RandomRatings::new(
                build_config.rating_samples,
                build_config.max_user_id,
                build_config.seed,
            )),
        };
        Session::build_cancellable(corpus, source.as_mut(), &build_config, cancelled)
    })
    .await?;

    Ok(built.unwrap_or_else(|| Session::empty(config)))
}

/// Run `build` on the blocking pool. Past `budget` the build is told to
/// stop and `None` is returned without waiting for it.
async fn build_within<F>(budget: Option<Duration>, build: F) -> Result<Option<Session>>
where
    F: FnOnce(&AtomicBool) -> Result<Session> + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    let task = tokio::task::spawn_blocking(move || build(&flag));

    let joined = match budget {
        Some(budget) => match tokio::time::timeout(budget, task).await {
            Ok(joined) => joined,
            Err(_) => {
                cancelled.store(true, Ordering::Relaxed);
                warn!("⏱️ Model build exceeded {:?}, cancelling it", budget);
                return Ok(None);
            }
        },
        None => task.await,
    };

    joined.map_err(|e| nr_core::Error::External(e.into()))?.map(Some)
}

pub mod prelude {
    pub use crate::{build_session, create_app, AppState};
    pub use nr_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use nr_core::{ArticleRef, FeedbackLabel, FeedbackStore, RawArticle, Rating};
    use nr_engine::SvdParams;
    use nr_storage::MemoryFeedbackStore;
    use tower::ServiceExt;

    fn corpus() -> Vec<Article> {
        let stories = [
            ("Fed raises rates", "central bank raises interest rates", "Business"),
            ("Rates outlook", "analysts expect interest rates to stay high", "Business"),
            ("Cup final", "football cup final ends in penalties", "Sports"),
        ];
        nr_engine::build_corpus(
            stories
                .iter()
                .map(|(title, summary, category)| RawArticle {
                    title: title.to_string(),
                    link: format!("https://news.test/{}", title.len()),
                    summary: summary.to_string(),
                    category: category.to_string(),
                    image: None,
                    published: None,
                })
                .collect(),
        )
    }

    async fn app() -> (Router, Arc<MemoryFeedbackStore>) {
        let config = EngineConfig {
            seed: Some(3),
            test_fraction: 0.0,
            ..EngineConfig::default()
        };
        let ratings = StaticRatings::new(vec![Rating::new(7, 0, 5), Rating::new(8, 1, 4)]);
        let session = build_session(corpus(), Some(ratings), &config).await.unwrap();
        let feedback = Arc::new(MemoryFeedbackStore::new());
        let state = Arc::new(AppState::new(session, feedback.clone()));
        (create_app(state), feedback)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_similar_articles_endpoint() {
        let (app, _) = app().await;
        let (status, body) =
            get_json(app, "/api/recommendations/similar?title=fed%20raises%20rates").await;
        assert_eq!(status, StatusCode::OK);
        let recs: Vec<ArticleRef> = serde_json::from_value(body).unwrap();
        assert_eq!(recs[0].title, "Rates outlook");
    }

    #[tokio::test]
    async fn test_user_recommendations_endpoint() {
        let (app, _) = app().await;
        let (_, body) = get_json(app.clone(), "/api/recommendations/users/7").await;
        let recs: Vec<ArticleRef> = serde_json::from_value(body).unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.id != 0));

        let (status, body) = get_json(app, "/api/recommendations/users/99").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_articles_filtered_by_category() {
        let (app, _) = app().await;
        let (_, body) = get_json(app.clone(), "/api/articles?category=Sports").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        let (_, body) = get_json(app, "/api/articles").await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_feedback_endpoint() {
        let (app, feedback) = app().await;
        let post = |body: &'static str| {
            Request::builder()
                .method("POST")
                .uri("/api/feedback")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(post(r#"{"user_id": 7, "article_id": 2, "feedback": "Liked"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(post(r#"{"user_id": 7, "article_id": 30, "feedback": "Liked"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let entries = feedback.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].feedback, FeedbackLabel::Liked);
    }

    #[tokio::test]
    async fn test_rebuild_trains_on_feedback() {
        let (app, feedback) = app().await;
        feedback
            .append(nr_core::FeedbackEntry::new(42, 1, FeedbackLabel::Liked))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rebuild")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // User 42 only exists in the feedback-trained session.
        let (_, body) = get_json(app, "/api/recommendations/users/42").await;
        let recs: Vec<ArticleRef> = serde_json::from_value(body).unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.id != 1));
    }

    #[tokio::test]
    async fn test_build_over_budget_serves_empty_session() {
        let config = EngineConfig {
            seed: Some(3),
            build_timeout_secs: Some(1),
            svd: SvdParams {
                n_epochs: 10_000_000,
                ..SvdParams::default()
            },
            ..EngineConfig::default()
        };
        let session = build_session(corpus(), None, &config).await.unwrap();
        assert!(session.corpus().is_empty());
        assert!(session.collaborative_recommendations(1).is_empty());
    }

    #[tokio::test]
    async fn test_build_within_budget_keeps_corpus() {
        let config = EngineConfig {
            seed: Some(3),
            build_timeout_secs: Some(60),
            ..EngineConfig::default()
        };
        let session = build_session(corpus(), None, &config).await.unwrap();
        assert_eq!(session.corpus().len(), 3);
    }

    #[tokio::test]
    async fn test_overdue_build_is_told_to_stop() {
        let (tx, rx) = std::sync::mpsc::channel();
        let built = build_within(Some(Duration::from_millis(20)), move |cancelled| {
            while !cancelled.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(5));
            }
            let _ = tx.send(());
            Err(nr_core::Error::Cancelled)
        })
        .await
        .unwrap();

        assert!(built.is_none());
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
}
