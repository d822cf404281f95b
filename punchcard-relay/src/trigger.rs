//! HTTP broadcast trigger endpoint.
//!
//! A small HTTP listener, on its own port, that lets the rest of the
//! platform request a refresh broadcast without holding a WebSocket
//! connection. The card CRUD path POSTs here after every mutation.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use punchcard_core::types::UserId;

use crate::error::{ErrorBody, RelayError};
use crate::state::WsState;

/// Trigger request body.
///
/// The field is named `businessId` by the existing callers but is
/// matched verbatim against registered user ids. Kept for wire
/// compatibility until the callers are fixed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerRequest {
    /// Broadcast scope: absent or `"all"` means every connection.
    #[serde(rename = "businessId", default)]
    pub business_id: Option<String>,
}

/// Trigger success response body.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

/// Builds the trigger router.
pub fn trigger_router(state: Arc<WsState>) -> Router {
    Router::new()
        .route("/broadcast-refresh", post(broadcast_refresh))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /broadcast-refresh` - broadcast a refresh signal.
async fn broadcast_refresh(
    State(state): State<Arc<WsState>>,
    body: Bytes,
) -> Result<Json<TriggerResponse>, RelayError> {
    let request: TriggerRequest = if body.is_empty() {
        TriggerRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| RelayError::BroadcastFailed)?
    };

    let filter = resolve_filter(request.business_id.as_deref());
    info!(
        filter = filter.as_ref().map_or("all", UserId::as_str),
        "Broadcast refresh triggered over HTTP"
    );

    state.broadcaster.broadcast_refresh(filter.as_ref()).await;

    Ok(Json(TriggerResponse {
        success: true,
        message: "Refresh signal broadcast successfully".to_string(),
    }))
}

/// Resolves the broadcast scope from the request field.
fn resolve_filter(business_id: Option<&str>) -> Option<UserId> {
    match business_id {
        None | Some("all") => None,
        Some(id) => Some(UserId::new_unchecked(id)),
    }
}

/// `CorsLayer` answers every `OPTIONS` request itself with 200 before
/// any route handler runs; the trigger contract promises an empty 204.
/// This sits outside the CORS layer and rewrites the status, keeping
/// the CORS headers intact.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::connection::{ConnectionId, Outbound};
    use crate::ws::WsConfig;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use punchcard_core::protocol::ServerMessage;
    use punchcard_core::traits::StaticCardSource;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn test_state() -> Arc<WsState> {
        Arc::new(WsState::new(
            WsConfig::default(),
            Arc::new(StaticCardSource::new()),
        ))
    }

    fn register(state: &Arc<WsState>, user: &str) -> mpsc::Receiver<Outbound> {
        let (tx, rx) = mpsc::channel(8);
        state
            .registry
            .add(ConnectionId::generate(), UserId::new_unchecked(user), tx);
        rx
    }

    async fn post_trigger(state: Arc<WsState>, body: &str) -> (StatusCode, serde_json::Value) {
        let app = trigger_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/broadcast-refresh")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[test]
    fn test_resolve_filter() {
        assert!(resolve_filter(None).is_none());
        assert!(resolve_filter(Some("all")).is_none());
        assert_eq!(
            resolve_filter(Some("u-123")),
            Some(UserId::new_unchecked("u-123"))
        );
    }

    #[tokio::test]
    async fn test_trigger_filtered_reaches_only_matching() {
        let state = test_state();
        let mut rx_match = register(&state, "u-123");
        let mut rx_other = register(&state, "u-456");

        let (status, json) = post_trigger(state, r#"{"businessId":"u-123"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);

        assert!(matches!(
            rx_match.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_trigger_all_reaches_everyone() {
        let state = test_state();
        let mut rx1 = register(&state, "u-1");
        let mut rx2 = register(&state, "u-2");

        let (status, _) = post_trigger(state, r#"{"businessId":"all"}"#).await;
        assert_eq!(status, StatusCode::OK);

        assert!(matches!(
            rx1.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
    }

    #[tokio::test]
    async fn test_trigger_empty_body_is_unfiltered() {
        let state = test_state();
        let mut rx = register(&state, "u-1");

        let (status, json) = post_trigger(state, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Refresh signal broadcast successfully");

        assert!(matches!(
            rx.recv().await.unwrap(),
            Outbound::Msg(ServerMessage::RefreshData)
        ));
    }

    #[tokio::test]
    async fn test_trigger_invalid_body_is_500_error() {
        let state = test_state();
        let (status, json) = post_trigger(state, "{not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to process broadcast request");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = trigger_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let app = trigger_router(test_state());
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("OPTIONS")
                    .uri("/broadcast-refresh")
                    .header("origin", "http://app.local")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
