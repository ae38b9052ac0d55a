use clap::Parser;
use nr_core::{ArticleRef, FeedbackEntry, FeedbackLabel, FeedbackStore, Result};
use nr_engine::{build_corpus, EngineConfig, Session};
use nr_storage::feedback_ratings;
use nr_web::{build_session, create_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Content and collaborative news recommendations",
    long_about = None
)]
pub struct Cli {
    /// JSON file with the fetched articles
    #[arg(long, default_value = "articles.json")]
    corpus: PathBuf,
    /// TOML engine configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for rating draws and training; overrides the config file
    #[arg(long)]
    seed: Option<u64>,
    /// CSV feedback file. Recorded feedback replaces random ratings when present.
    #[arg(long)]
    feedback: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Articles similar in content to the one matching a title
    Similar {
        title: String,
    },
    /// Articles a user is predicted to like
    User {
        user_id: u32,
    },
    /// Record feedback for an article
    Feedback {
        user_id: u32,
        article_id: usize,
        /// liked, disliked or viewed
        label: FeedbackLabel,
    },
    /// List the corpus categories
    Categories,
    /// Accuracy of the collaborative model on held-out ratings
    Evaluate,
    /// Serve the recommendation API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    Ok(config.with_seed(cli.seed))
}

async fn load_session(
    cli: &Cli,
    config: &EngineConfig,
    feedback: &dyn FeedbackStore,
) -> Result<Session> {
    let corpus = build_corpus(nr_storage::load_corpus(&cli.corpus)?);

    let ratings = if cli.feedback.is_some() && !feedback.entries().await?.is_empty() {
        info!("⭐ Training on recorded feedback");
        Some(feedback_ratings(feedback).await?)
    } else {
        None
    };

    info!("🧠 Building models for {} articles", corpus.len());
    build_session(corpus, ratings, config).await
}

fn print_recommendations(recs: &[ArticleRef], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(recs)?);
        return Ok(());
    }
    if recs.is_empty() {
        println!("No recommendations.");
    }
    for (rank, rec) in recs.iter().enumerate() {
        println!("{}. {} [{:.3}]", rank + 1, rec.title, rec.score);
        println!("   {}", rec.link);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let feedback = nr_storage::create_store(cli.feedback.as_deref())?;
    let session = load_session(&cli, &config, feedback.as_ref()).await?;

    match &cli.command {
        Commands::Similar { title } => {
            print_recommendations(&session.content_recommendations(title), cli.json)?;
        }
        Commands::User { user_id } => {
            print_recommendations(&session.collaborative_recommendations(*user_id), cli.json)?;
        }
        Commands::Feedback { user_id, article_id, label } => {
            let Some(article) = session.article(*article_id) else {
                anyhow::bail!(
                    "Article {} is not in the corpus ({} articles)",
                    article_id,
                    session.corpus().len()
                );
            };
            feedback.append(FeedbackEntry::new(*user_id, *article_id, *label)).await?;
            feedback.flush().await?;
            info!("📝 Recorded {} for '{}' by user {}", label, article.title, user_id);
        }
        Commands::Categories => {
            for category in session.categories() {
                println!("{}", category);
            }
        }
        Commands::Evaluate => {
            let evaluation = session.evaluate();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                match (evaluation.rmse, evaluation.mae) {
                    (Some(rmse), Some(mae)) => {
                        println!("Held-out ratings: {}", evaluation.count);
                        println!("RMSE: {:.4}", rmse);
                        println!("MAE:  {:.4}", mae);
                    }
                    _ => println!("No held-out ratings to evaluate."),
                }
            }
        }
        Commands::Serve { addr } => {
            let state = Arc::new(AppState::new(session, feedback.clone()));
            let listener = tokio::net::TcpListener::bind(*addr).await?;
            info!("🌐 Serving recommendations on http://{}", addr);
            nr_web::serve(listener, create_app(state)).await?;
        }
    }

    feedback.flush().await?;
    Ok(())
}
