use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    debug_handler,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, post},
};
use lead_core::{RelayConfig, RelayEnvelope, format_notification, parse_submission};
use lead_telemetry::record_outcome;
use time::OffsetDateTime;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::Instrument;

use crate::error::RelayError;
use crate::telegram::MessagingApi;

pub const SEND_MESSAGE_PATH: &str = "/api/send-message";
/// Path the static pages were first published with.
pub const LEGACY_SEND_MESSAGE_PATH: &str = "/api/send-message.php";

const REQUESTS_METRIC: &str = "lead_relay_requests_total";

#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<RelayConfig>,
    pub api: Arc<dyn MessagingApi>,
}

impl RelayState {
    pub fn new(config: RelayConfig, api: Arc<dyn MessagingApi>) -> Self {
        Self {
            config: Arc::new(config),
            api,
        }
    }
}

pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .route(SEND_MESSAGE_PATH, endpoint())
        .route(LEGACY_SEND_MESSAGE_PATH, endpoint())
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

fn endpoint() -> MethodRouter<RelayState> {
    post(send_message)
        .options(preflight)
        .fallback(method_not_allowed)
}

#[debug_handler]
async fn send_message(
    State(state): State<RelayState>,
    body: Bytes,
) -> Result<Json<RelayEnvelope>, RelayError> {
    let span = tracing::info_span!("send_message", body_len = body.len());
    async move {
        let submission = parse_submission(&body).inspect_err(|_| {
            record_outcome(REQUESTS_METRIC, "rejected");
        })?;

        let submitted_at = OffsetDateTime::now_utc().to_offset(state.config.utc_offset);
        let text = format_notification(&submission, submitted_at);

        state
            .api
            .send_message(&state.config, &text)
            .await
            .inspect_err(|_| record_outcome(REQUESTS_METRIC, "failed"))?;

        record_outcome(REQUESTS_METRIC, "delivered");
        tracing::info!("lead relayed to telegram");
        Ok(Json(RelayEnvelope::success()))
    }
    .instrument(span)
    .await
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".into());
    RelayError::Internal(anyhow::anyhow!(detail)).into_response()
}
