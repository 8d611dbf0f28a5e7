//! The relay's HTTP surface: a single JSON endpoint taking `action` requests.

use crate::store::RelayStore;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use protocol::{ErrorResponse, RelayError, RelayRequest};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

/// Path of the relay endpoint.
pub const RELAY_PATH: &str = "/api/game";

/// Store shared between the HTTP handler and in-process relays.
pub type SharedStore = Arc<Mutex<RelayStore>>;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Build the relay router. Any origin may call it.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route(RELAY_PATH, post(handle_action))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(store)
}

/// Bind `addr` and serve until the process stops.
pub async fn serve(addr: SocketAddr, store: SharedStore) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Relay running on http://{}{}", listener.local_addr()?, RELAY_PATH);
    axum::serve(listener, router(store)).await?;
    Ok(())
}

async fn handle_action(State(store): State<SharedStore>, body: Bytes) -> Response {
    let request = match RelayRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };
    let action = request.action();
    let reply = store.lock().await.dispatch(request, now_ms());

    match reply {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            debug!("{} failed: {}", action.as_str(), e);
            error_response(e)
        }
    }
}

/// HTTP status for a relay error.
pub fn status_for(err: &RelayError) -> StatusCode {
    match err {
        RelayError::PlayerNotFound | RelayError::RoomNotFound => StatusCode::NOT_FOUND,
        RelayError::UnknownAction(_) | RelayError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        RelayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body text clients match on.
pub fn error_message(err: &RelayError) -> String {
    match err {
        RelayError::UnknownAction(_) => "Unknown action".to_string(),
        RelayError::InvalidPayload(message) | RelayError::Transport(message) => message.clone(),
        other => other.to_string(),
    }
}

fn error_response(err: RelayError) -> Response {
    let body = ErrorResponse {
        error: error_message(&err),
    };
    (status_for(&err), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, header};
    use tower::ServiceExt;

    async fn call(app: Router, body: &'static str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(RELAY_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn app() -> Router {
        router(SharedStore::default())
    }

    #[tokio::test]
    async fn test_ping() {
        let (status, json) = call(app(), r#"{"action":"ping"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let (status, json) = call(app(), "{oops").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid JSON");

        let (status, json) = call(app(), r#"{"action":"fly"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Unknown action");
    }

    #[tokio::test]
    async fn test_missing_entities() {
        let (status, json) = call(app(), r#"{"action":"joinRoom","playerId":"ghost"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Player not found");

        let (status, json) = call(app(), r#"{"action":"getGameState","roomId":"nope"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Room not found");
    }

    #[tokio::test]
    async fn test_create_and_join() {
        let store = SharedStore::default();
        let (status, json) = call(
            router(Arc::clone(&store)),
            r#"{"action":"createPlayer","nickname":"Ann","botCount":4,"botDifficulty":"hard"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Welcome, Ann!");
        assert_eq!(store.lock().await.player_count(), 1);
    }
}
