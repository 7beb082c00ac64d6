use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_api::auth::SupabaseAuth;
use resume_api::config::{Config, StoreBackend};
use resume_api::db::create_pool;
use resume_api::llm_client::LlmClient;
use resume_api::routes::build_router;
use resume_api::state::AppState;
use resume_api::store::{MemoryResumeRepository, PgResumeRepository, ResumeRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first, so a missing variable fails before anything starts
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_api={},tower_http=info", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let resumes: Arc<dyn ResumeRepository> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            Arc::new(PgResumeRepository::new(create_pool(url).await?))
        }
        StoreBackend::Memory => {
            info!("Using the in-memory resume store; documents are lost on restart");
            Arc::new(MemoryResumeRepository::new())
        }
    };

    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let llm = LlmClient::new(&config.groq_api_url, &config.groq_api_key, &config.groq_model)?;
    info!("LLM client initialized (model: {})", llm.model());

    let auth = SupabaseAuth::new(&config.supabase_url, &config.supabase_anon_key)?;

    let cors = build_cors(&config.frontend_url)?;

    let state = AppState {
        resumes,
        auth: Arc::new(auth),
        s3,
        llm,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Only the frontend origin may call the API, with credentials.
fn build_cors(frontend_url: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = frontend_url
        .parse()
        .with_context(|| format!("FRONTEND_URL is not a valid origin: {frontend_url}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// S3-compatible storage: MinIO locally, AWS or Supabase storage in production.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resume-api-static",
    );

    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
