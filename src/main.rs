use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use article_api::auth::{Argon2Verifier, JwtTokenService};
use article_api::config::{load_env_file, AppConfig};
use article_api::database::{
    self, ArticleGateway, MemoryArticleGateway, MemoryUserGateway, PgArticleGateway, PgUserGateway, UserGateway,
};
use article_api::error::ResponseTranslator;
use article_api::services::AuthService;
use article_api::{router, serve, AppState};

#[derive(Parser, Debug)]
#[command(name = "article-api")]
#[command(about = "User accounts and articles over HTTP with bearer token auth", long_about = None)]
#[command(version)]
struct Args {
    /// Env file loaded before reading configuration
    #[arg(long, env = "CONFIG_PATH", default_value = ".env")]
    config: PathBuf,

    /// Override SERVER_PORT
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Keep users and articles in process memory instead of Postgres
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Before logging init so RUST_LOG may come from the file
    let loaded = load_env_file(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if loaded {
        tracing::info!("Loaded environment from {}", args.config.display());
    }

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting article-api in {:?} mode", config.environment);

    let (users, articles): (Arc<dyn UserGateway>, Arc<dyn ArticleGateway>) = if args.in_memory {
        tracing::warn!("Running with in-memory storage; data is lost on exit");
        (Arc::new(MemoryUserGateway::new()), Arc::new(MemoryArticleGateway::new()))
    } else {
        let pool = database::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        (Arc::new(PgUserGateway::new(pool.clone())), Arc::new(PgArticleGateway::new(pool)))
    };

    let tokens = JwtTokenService::new(
        &config.security.api_secret,
        chrono::Duration::hours(config.security.token_ttl_hours),
    );
    let auth = AuthService::new(users, Arc::new(Argon2Verifier), Arc::new(tokens));
    let translator = ResponseTranslator::new(config.security.expose_error_details);
    let state = AppState::new(auth, articles, translator);

    let app = router(state, &config.security);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    serve(listener, app).await?;
    Ok(())
}
