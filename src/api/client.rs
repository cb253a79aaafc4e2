use crate::core::error::ApiError;
use crate::session::context::SessionContext;
use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the fleet REST backend.
///
/// Every call resolves to `Result<T, ApiError>`; transport and decoding
/// failures are folded into the error type instead of escaping as panics.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, session: Arc<SessionContext>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue one request.
    ///
    /// `fallback` is the per-operation message used when the server gives no
    /// `error` field or the success body cannot be decoded.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.client.request(method.clone(), self.url(path));

        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(method = %method, path = %path, "Sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, "Backend unreachable");
                return Err(ApiError::Unreachable);
            }
        };

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback.to_string());

            warn!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                error = %message,
                "Backend rejected request"
            );

            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, "Failed to read response body");
                return Err(ApiError::Unreachable);
            }
        };

        // Empty success bodies decode as JSON null
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

        serde_json::from_slice(payload).map_err(|e| {
            warn!(method = %method, path = %path, error = %e, "Failed to decode response body");
            ApiError::Malformed {
                message: fallback.to_string(),
            }
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, fallback).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B, fallback: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), fallback).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B, fallback: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), fallback).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::DELETE, path, None, fallback).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{Identity, Role, Session};
    use crate::stores::local_store::LocalStore;
    use crate::test_support::{dead_endpoint, spawn_backend};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn client_for(base_url: &str) -> ApiClient {
        let session = Arc::new(SessionContext::new(Arc::new(LocalStore::in_memory())));
        ApiClient::new(base_url, Duration::from_secs(5), session).unwrap()
    }

    #[tokio::test]
    async fn test_success_payload_is_decoded() {
        let app = Router::new().route("/vehicles", get(|| async { Json(json!([{"vehicle_id": 1}])) }));
        let base = spawn_backend(app).await;

        let body: Value = client_for(&base).get("/vehicles", "Failed to fetch vehicles").await.unwrap();
        assert_eq!(body, json!([{"vehicle_id": 1}]));
    }

    #[tokio::test]
    async fn test_server_error_field_is_used() {
        let app = Router::new().route(
            "/vehicles",
            get(|| async { (StatusCode::BAD_REQUEST, Json(json!({"error": "Missing fields: capacity"}))) }),
        );
        let base = spawn_backend(app).await;

        let err = client_for(&base)
            .get::<Value>("/vehicles", "Failed to fetch vehicles")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Rejected {
                status: 400,
                message: "Missing fields: capacity".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_error_field_uses_default_message() {
        let app = Router::new().route("/users", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base = spawn_backend(app).await;

        let err = client_for(&base).get::<Value>("/users", "Failed to fetch users").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch users");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_undecodable_success_is_malformed() {
        let app = Router::new().route("/users", get(|| async { "<html>oops</html>" }));
        let base = spawn_backend(app).await;

        let err = client_for(&base)
            .get::<Vec<Value>>("/users", "Failed to fetch users")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Malformed {
                message: "Failed to fetch users".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let base = dead_endpoint().await;

        let err = client_for(&base).get::<Value>("/users", "Failed to fetch users").await.unwrap_err();
        assert_eq!(err, ApiError::Unreachable);
        assert_eq!(err.to_string(), crate::core::error::UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let app = Router::new().route(
            "/whoami",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                Json(json!({ "auth": auth }))
            }),
        );
        let base = spawn_backend(app).await;
        let client = client_for(&base);

        let anonymous: Value = client.get("/whoami", "x").await.unwrap();
        assert_eq!(anonymous["auth"], "");

        client
            .session()
            .save(Session {
                token: "jwt".to_string(),
                identity: Identity {
                    user_id: Some(4),
                    admin_id: None,
                    name: "Sara".to_string(),
                    email: None,
                    category_id: Some(1),
                },
                role: Role::User,
            })
            .unwrap();

        let authed: Value = client.get("/whoami", "x").await.unwrap();
        assert_eq!(authed["auth"], "Bearer jwt");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = client_for("http://localhost:5000/");
        assert_eq!(client.url("/gps"), "http://localhost:5000/gps");
    }
}
