#[macro_use]
extern crate lazy_static;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod collab;
pub mod config;
pub mod content;
pub mod corpus;
pub mod session;
pub mod text;

pub use collab::{
    collaborative_recommendations, evaluate, Evaluation, RandomRatings, RatingStore, SvdModel,
};
pub use config::{EngineConfig, SvdParams};
pub use content::{content_recommendations, ContentIndex, TitleResolver};
pub use corpus::build_corpus;
pub use session::{build_models, Session, SessionContext};
pub use text::normalize;

/// Seeded generator when `seed` is set, entropy-seeded otherwise.
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub mod prelude {
    pub use super::{build_corpus, build_models, EngineConfig, Session, SessionContext};
    pub use nr_core::{Article, ArticleRef, Error, RawArticle, Rating, RatingSource, Result};
}
