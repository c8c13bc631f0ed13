//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates signatures, parses the
//! payload into a typed branch-change event, and spawns the sync engine for
//! it before returning 202 Accepted. GitHub redelivers on failure, so no
//! delivery tracking happens here; the engine is safe to re-run.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::github::GitHubApi;
use crate::sync::handle_branch_change_with_limits;
use crate::types::DeliveryId;
use crate::webhooks::{parse_webhook, verify_signature, ParseError};

use super::AppState;

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when accepting a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// Malformed payload.
    #[error("malformed payload: {0}")]
    Malformed(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::Malformed(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "push", "create")
///   - `X-GitHub-Delivery`: Unique delivery ID
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 202 Accepted: Event accepted (including events the bot ignores)
/// - 400 Bad Request: Missing header or malformed payload
/// - 401 Unauthorized: Invalid signature
pub async fn webhook_handler<C>(
    State(app_state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    C: GitHubApi + Clone + 'static,
{
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    // Signature check comes before any parsing of the body.
    if !verify_signature(&body, &signature_header, app_state.webhook_secret()) {
        warn!(delivery_id = %delivery_id, "Invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let Some(event) = parse_webhook(&event_type, &body)? else {
        debug!(
            delivery_id = %delivery_id,
            event_type = %event_type,
            "Ignoring event with nothing to sync"
        );
        return Ok((StatusCode::ACCEPTED, "Accepted (ignored)"));
    };

    info!(
        delivery_id = %delivery_id,
        repo = %event.repo(),
        branch = event.branch(),
        "Accepted branch change event"
    );

    // One logical task per event; multiple events may run concurrently.
    let client = app_state.client().clone();
    let limits = app_state.limits();
    tokio::spawn(async move {
        handle_branch_change_with_limits(&client, &event, limits).await;
    });

    Ok((StatusCode::ACCEPTED, "Accepted"))
}

fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
