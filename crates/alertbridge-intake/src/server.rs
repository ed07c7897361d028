//! HTTP server implementation using axum.

use std::net::SocketAddr;

use alertbridge_core::Rejection;
use alertbridge_executor::ExecutorError;
use alertbridge_telemetry::Metrics;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::IntakeConfig;
use crate::error::{IntakeError, IntakeResult};
use crate::state::{Dispatcher, IntakeState};
use crate::types::{WebhookResponse, ONLINE_MESSAGE};

const REDACTED: &str = "***";

/// Create the axum router.
pub fn create_router(state: IntakeState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(webhook))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    ONLINE_MESSAGE
}

async fn metrics() -> Response {
    match Metrics::gather_text() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Accept an alert.
///
/// The body is parsed as JSON regardless of content type, since alert
/// senders commonly post JSON as `text/plain`.
async fn webhook(State(state): State<IntakeState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Unparseable webhook body");
            return reject(Rejection::BadRequest);
        }
    };

    if state.debug {
        info!(payload = %redact_passphrase(&payload), "Webhook received");
    }

    let alert = match state.validator.validate(&payload) {
        Ok(alert) => alert,
        Err(rejection) => {
            warn!(reason = rejection.message(), "Webhook rejected");
            return reject(rejection);
        }
    };

    let side = alert.strategy.clone();
    let ticker = alert.ticker.clone();

    match &state.dispatcher {
        Dispatcher::Queued(sender) => match sender.enqueue(alert) {
            Ok(()) => {
                Metrics::webhook_request("queued");
                info!(symbol = %ticker, side = %side, depth = sender.depth(), "Alert queued");
                respond(
                    StatusCode::OK,
                    WebhookResponse::success(format!("{side} order queued for {ticker}")),
                )
            }
            Err(e) => {
                Metrics::webhook_request("queue_closed");
                error!(symbol = %ticker, error = %e, "Alert queue is closed");
                respond(
                    StatusCode::SERVICE_UNAVAILABLE,
                    WebhookResponse::error(ExecutorError::QueueClosed.to_string()),
                )
            }
        },
        Dispatcher::Immediate(pipeline) => match pipeline.execute(&alert).await {
            Ok(report) => {
                Metrics::webhook_request("executed");
                info!(
                    symbol = %ticker,
                    side = %side,
                    client_order_id = %report.intent.client_order_id,
                    order_id = %report.ack.id,
                    "Order submitted"
                );
                respond(
                    StatusCode::OK,
                    WebhookResponse::success(format!("{side} order executed for {ticker}")),
                )
            }
            Err(e) => {
                Metrics::webhook_request("failed");
                error!(symbol = %ticker, error = %e, "Order error");
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    WebhookResponse::error(e.to_string()),
                )
            }
        },
    }
}

fn reject(rejection: Rejection) -> Response {
    let label = match rejection {
        Rejection::Unauthorized => "unauthorized",
        Rejection::BadRequest => "bad_request",
    };
    Metrics::webhook_request(label);

    let status = StatusCode::from_u16(rejection.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    respond(status, WebhookResponse::error(rejection.message()))
}

fn respond(status: StatusCode, body: WebhookResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Copy of `payload` with the passphrase value masked.
fn redact_passphrase(payload: &Value) -> Value {
    let mut copy = payload.clone();
    if let Some(passphrase) = copy.get_mut("passphrase") {
        *passphrase = Value::String(REDACTED.to_string());
    }
    copy
}

/// Run the webhook HTTP server until `shutdown` is cancelled.
pub async fn run_server(
    state: IntakeState,
    config: &IntakeConfig,
    shutdown: CancellationToken,
) -> IntakeResult<()> {
    let mode = state.mode();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| IntakeError::Bind { addr, source })?;
    info!(port = config.port, %mode, "Starting webhook server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use alertbridge_broker::MockBrokerage;
    use alertbridge_core::{AlertValidator, FixedClock, PassphrasePolicy};
    use alertbridge_executor::{alert_queue, AlertReceiver, OrderPipeline, OrderRouter, QueueItem};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tower::ServiceExt;

    fn validator() -> AlertValidator {
        AlertValidator::new(PassphrasePolicy::Enforced("T".to_string()))
    }

    fn queued_app() -> (Router, AlertReceiver) {
        let (tx, rx) = alert_queue();
        (create_router(IntakeState::queued(validator(), tx)), rx)
    }

    fn immediate_app(broker: Arc<MockBrokerage>) -> Router {
        // Monday 2026-02-09 10:00 EST
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 9, 15, 0, 0).unwrap());
        let pipeline = Arc::new(OrderPipeline::new(
            OrderRouter::default(),
            broker,
            Arc::new(clock),
        ));
        create_router(IntakeState::immediate(validator(), pipeline))
    }

    async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_text() {
        let (app, _rx) = queued_app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], ONLINE_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_queued_accept() {
        let (app, mut rx) = queued_app();
        let body = json!({"ticker": "AAPL", "strategy": "BUY", "passphrase": "T"}).to_string();
        let (status, json) = post(app, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"code": "success", "message": "buy order queued for AAPL"}));
        match rx.recv().await {
            Some(QueueItem::Alert(alert)) => assert_eq!(alert.strategy, "buy"),
            other => panic!("expected queued alert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_passphrase_is_403() {
        let (app, rx) = queued_app();
        let body = json!({"ticker": "AAPL", "strategy": "buy", "passphrase": "nope"}).to_string();
        let (status, json) = post(app, body).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json, json!({"code": "error", "message": "Invalid passphrase"}));
        assert_eq!(rx.depth(), 0);
    }

    #[tokio::test]
    async fn test_missing_ticker_is_400() {
        let (app, rx) = queued_app();
        let body = json!({"strategy": "sell", "passphrase": "T"}).to_string();
        let (status, json) = post(app, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"code": "error", "message": "Missing required fields"}));
        assert_eq!(rx.depth(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_400() {
        let (app, _rx) = queued_app();
        let (status, json) = post(app, "ticker=AAPL").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_closed_queue_is_503() {
        let (app, rx) = queued_app();
        drop(rx);
        let body = json!({"ticker": "AAPL", "strategy": "buy", "passphrase": "T"}).to_string();
        let (status, json) = post(app, body).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json, json!({"code": "error", "message": "Alert queue is closed"}));
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let broker = Arc::new(MockBrokerage::new());
        let body = json!({"ticker": "AAPL", "strategy": "sell", "passphrase": "T"}).to_string();
        let (status, json) = post(immediate_app(broker.clone()), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "sell order executed for AAPL");
        assert_eq!(broker.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_immediate_failure_is_500_with_error_text() {
        let broker = Arc::new(MockBrokerage::new());
        broker.fail_next_submissions(1);
        let body = json!({"ticker": "AAPL", "strategy": "buy", "passphrase": "T"}).to_string();
        let (status, json) = post(immediate_app(broker), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "error");
        assert!(json["message"].as_str().unwrap().contains("AAPL"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _rx) = queued_app();
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("alertbridge_queue_depth"));
    }

    #[test]
    fn test_redact_passphrase() {
        let redacted = redact_passphrase(&json!({"ticker": "AAPL", "passphrase": "secret"}));
        assert_eq!(redacted["passphrase"], REDACTED);
        assert_eq!(redacted["ticker"], "AAPL");

        let untouched = redact_passphrase(&json!([1, 2]));
        assert_eq!(untouched, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_run_server_stops_on_cancel() {
        let (tx, _rx) = alert_queue();
        let state = IntakeState::queued(validator(), tx);
        // Port 0 lets the OS pick a free port.
        let config = IntakeConfig {
            port: 0,
            ..IntakeConfig::default()
        };
        let shutdown = CancellationToken::new();
        let server = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { run_server(state, &config, shutdown).await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
