//! HTTP boundary for lap uploads
//!
//! Gates run in a fixed order before the body is looked at: method, then
//! bearer token (when configured), then `content-encoding`. Each pipeline
//! outcome maps to exactly one status and a short message; failure detail
//! only goes to the log.

use crate::auth::{bearer_token, TokenVerifier};
use crate::db::Database;
use crate::ingest::{IngestOutcome, Ingestor};
use crate::s3::Storage;
use anyhow::Context;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared state for HTTP handlers
pub struct AppState<S: Storage, D: Database> {
    pub ingestor: Arc<Ingestor<S, D>>,
    /// `None` disables authentication
    pub verifier: Option<Arc<dyn TokenVerifier>>,
    /// Upper bound on the raw request body
    pub max_body_bytes: usize,
}

impl<S: Storage, D: Database> Clone for AppState<S, D> {
    fn clone(&self) -> Self {
        AppState {
            ingestor: self.ingestor.clone(),
            verifier: self.verifier.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

type Reply = (StatusCode, String);

fn reply(status: StatusCode, message: &str) -> Reply {
    (status, message.to_string())
}

pub fn router<S: Storage, D: Database>(state: AppState<S, D>) -> Router {
    Router::new()
        .route("/", any(upload::<S, D>))
        .route("/laps", any(upload::<S, D>))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `listen_addr` and serve until the process is stopped
pub async fn serve<S: Storage, D: Database>(
    listen_addr: &str,
    state: AppState<S, D>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Listening for lap uploads on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

async fn health() -> &'static str {
    "ok"
}

async fn upload<S: Storage, D: Database>(
    State(state): State<AppState<S, D>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Reply {
    if method != Method::POST {
        return reply(StatusCode::FORBIDDEN, "Forbidden, accepting only POST request.");
    }

    let user_id = match &state.verifier {
        Some(verifier) => {
            let authorization = headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());
            let token = match bearer_token(authorization) {
                Ok(token) => token,
                Err(e) => {
                    warn!("Authentication failed: {}", e);
                    return reply(
                        StatusCode::UNAUTHORIZED,
                        "Unauthorized: Authentication required",
                    );
                }
            };
            match verifier.verify(token).await {
                Ok(subject) => Some(subject),
                Err(e) => {
                    warn!("Authentication failed: {}", e);
                    return reply(
                        StatusCode::UNAUTHORIZED,
                        "Unauthorized: Invalid authentication token",
                    );
                }
            }
        }
        None => None,
    };

    let gzip_encoded = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("gzip"));
    if !gzip_encoded {
        return reply(
            StatusCode::BAD_REQUEST,
            "Forbidden, accepting only 'gzip' content.",
        );
    }

    // The body is only read once every gate has passed
    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read lap upload body: {}", e);
            return reply(StatusCode::BAD_REQUEST, "Invalid lap payload.");
        }
    };

    match state.ingestor.ingest(&body, user_id.as_deref()).await {
        IngestOutcome::Recorded(id) => (StatusCode::OK, format!("Lap recorded: {}", id)),
        IngestOutcome::Duplicate => reply(StatusCode::CONFLICT, "We already have this lap."),
        IngestOutcome::Rejected(_) => reply(StatusCode::BAD_REQUEST, "Invalid lap payload."),
        IngestOutcome::Failed(_) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal error while recording lap.",
        ),
    }
}
