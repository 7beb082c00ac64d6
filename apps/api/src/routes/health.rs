use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET / and GET /health
pub async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "resume-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};

    use crate::routes::build_router;
    use crate::store::MemoryResumeRepository;
    use crate::test_support::{send, test_state};

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        for uri in ["/", "/health"] {
            let (status, body) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "ok");
            assert_eq!(body["service"], "resume-api");
            assert!(body["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(test_state(Arc::new(MemoryResumeRepository::new())));
        let (status, _) = send(&app, Method::GET, "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
