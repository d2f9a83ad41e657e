use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, log_send, reputation_check, timeout_check, AppState};
use crate::alerts::{AlertChannel, SlackWebhook};
use crate::check::{ReputationChecker, TimeoutChecker};
use crate::provider::{HttpProvider, SendLogProvider};
use crate::store::MemoryStore;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Provider API key; checks are disabled until it is set
    pub provider_key: Option<String>,
    /// Provider API base URL
    pub provider_url: Option<String>,
    /// Alert webhook; failing verdicts are only logged without it
    pub slack_url: Option<String>,
    /// Default grace window for timeout checks, minutes
    pub timeout_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            provider_key: None,
            provider_url: None,
            slack_url: None,
            timeout_minutes: 10,
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Delivery log
        .route("/sends", post(log_send))
        // Scheduled checks
        .route("/checks/timeout", post(timeout_check))
        .route("/checks/reputation", post(reputation_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());

    let provider: Option<Arc<dyn SendLogProvider>> =
        match (&config.provider_key, &config.provider_url) {
            (Some(key), Some(url)) => Some(Arc::new(HttpProvider::new(url.clone(), key.clone()))),
            _ => {
                tracing::warn!("Provider key or URL not set; checks will fail until configured");
                None
            }
        };

    let channel: Option<Arc<dyn AlertChannel>> = config
        .slack_url
        .as_ref()
        .map(|url| Arc::new(SlackWebhook::new(url.clone())) as Arc<dyn AlertChannel>);

    let state = Arc::new(AppState {
        timeout: TimeoutChecker::new(
            Arc::clone(&store) as Arc<dyn crate::store::DeliveryStore>,
            provider.clone(),
            channel.clone(),
            config.timeout_minutes,
        ),
        reputation: ReputationChecker::new(store, provider, channel),
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting sendwatch server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Sendwatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Utc};
    use tower::util::ServiceExt;

    use crate::provider::{AccountStatus, ProviderEntry, ProviderError};

    struct IdleProvider;

    #[async_trait]
    impl crate::provider::SendLogProvider for IdleProvider {
        async fn search_sent_in_range(
            &self,
            _to: &str,
            _from: DateTime<Utc>,
            _until: DateTime<Utc>,
        ) -> Result<Vec<ProviderEntry>, ProviderError> {
            Ok(Vec::new())
        }

        async fn account_status(&self) -> Result<AccountStatus, ProviderError> {
            Ok(AccountStatus {
                reputation: 80,
                hourly_quota: 500,
            })
        }
    }

    fn create_test_app(provider: Option<Arc<dyn SendLogProvider>>) -> Router {
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState {
            timeout: TimeoutChecker::new(
                Arc::clone(&store) as Arc<dyn crate::store::DeliveryStore>,
                provider.clone(),
                None,
                10,
            ),
            reputation: ReputationChecker::new(store, provider, None),
        });
        build_router(state)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_log_send() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                "/sends",
                serde_json::json!({"to": "ops@example.com", "region": "eu"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_log_send_rejects_blank_region() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                "/sends",
                serde_json::json!({"to": "ops@example.com", "region": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timeout_check_requires_provider_config() {
        let app = create_test_app(None);

        let response = app
            .oneshot(json_request(
                "/checks/timeout",
                serde_json::json!({"to": "ops@example.com", "region": "eu"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timeout_check_idle_day() {
        let app = create_test_app(Some(Arc::new(IdleProvider)));

        let response = app
            .oneshot(json_request(
                "/checks/timeout",
                serde_json::json!({"to": "ops@example.com", "region": "eu"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reputation_check() {
        let app = create_test_app(Some(Arc::new(IdleProvider)));

        let response = app
            .oneshot(json_request("/checks/reputation", serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
