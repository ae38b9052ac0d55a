use nr_core::FeedbackStore;
use nr_engine::Session;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct AppState {
    pub session: RwLock<Arc<Session>>,
    pub feedback: Arc<dyn FeedbackStore>,
}

impl AppState {
    pub fn new(session: Session, feedback: Arc<dyn FeedbackStore>) -> Self {
        Self {
            session: RwLock::new(Arc::new(session)),
            feedback,
        }
    }

    /// The current snapshot. Requests keep using it even if a rebuild swaps
    /// in a new one meanwhile.
    pub async fn snapshot(&self) -> Arc<Session> {
        self.session.read().await.clone()
    }

    pub async fn replace(&self, session: Session) {
        *self.session.write().await = Arc::new(session);
    }
}
