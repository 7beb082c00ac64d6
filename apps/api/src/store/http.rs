use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::models::resume::{ResumeDocument, ResumePatch};
use crate::store::{DocumentStore, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`DocumentStore`] over this service's REST API, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Backend(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn resume_url(&self, id: Uuid) -> String {
        format!("{}/api/resumes/{id}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn send_for_document(&self, request: RequestBuilder) -> Result<ResumeDocument, StoreError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Backend(format!("Malformed resume payload: {e}")))
    }
}

async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            StoreError::Validation(message)
        }
        _ => StoreError::Backend(format!("{status}: {message}")),
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self, id: Uuid) -> Result<ResumeDocument, StoreError> {
        self.send_for_document(self.client.get(self.resume_url(id)))
            .await
    }

    async fn update(&self, id: Uuid, patch: &ResumePatch) -> Result<ResumeDocument, StoreError> {
        self.send_for_document(self.client.patch(self.resume_url(id)).json(patch))
            .await
    }

    async fn create(&self, title: &str) -> Result<ResumeDocument, StoreError> {
        let url = format!("{}/api/resumes", self.base_url);
        self.send_for_document(self.client.post(url).json(&json!({ "title": title })))
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.send(self.client.delete(self.resume_url(id))).await?;
        Ok(())
    }

    async fn set_public(&self, id: Uuid, desired: bool) -> Result<ResumeDocument, StoreError> {
        let url = format!("{}/visibility", self.resume_url(id));
        self.send_for_document(self.client.put(url).json(&json!({ "is_public": desired })))
            .await
    }
}
