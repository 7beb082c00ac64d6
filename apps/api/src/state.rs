use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::auth::AuthVerifier;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::store::ResumeRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory for tests and `STORE_BACKEND=memory`.
    pub resumes: Arc<dyn ResumeRepository>,
    pub auth: Arc<dyn AuthVerifier>,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
}
