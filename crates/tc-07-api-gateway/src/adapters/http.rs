//! axum adapter over `ClaimService`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use terra_telemetry::RequestTimer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::domain::{ApiError, GatewayConfig, HealthResponse, TrustedProxyConfig};
use crate::service::ClaimService;
use crate::GatewayError;

/// Client key used when nothing identifies the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimService>,
    pub proxies: Arc<TrustedProxyConfig>,
}

impl AppState {
    fn client_key(&self, headers: &HeaderMap, connect: Option<ConnectInfo<SocketAddr>>) -> String {
        client_key(headers, peer(connect), &self.proxies)
    }
}

pub fn router(service: Arc<ClaimService>, proxies: TrustedProxyConfig) -> Router {
    Router::new()
        .route("/api/claim", post(claim))
        .route("/api/claim/batch", post(claim_batch))
        .route("/api/paint/batch", post(paint_batch))
        .route("/api/pixels/:position", get(pixel))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/world", get(world))
        .route("/api/actors/:id", get(actor))
        .route("/api/countries/:code", get(country))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            service,
            proxies: Arc::new(proxies),
        })
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &GatewayConfig, service: Arc<ClaimService>) -> Result<(), GatewayError> {
    let addr = config
        .bind_addr()
        .map_err(|e| GatewayError::Config(e.to_string()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
    info!(%addr, "gateway listening");

    axum::serve(
        listener,
        router(service, config.trusted_proxy.clone())
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| GatewayError::Serve(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Rate-limit identity. The socket peer, unless the peer is a trusted proxy
/// whose forwarding header names a parseable client address.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    proxies: &TrustedProxyConfig,
) -> String {
    let Some(peer_ip) = peer.map(|p| p.ip()) else {
        return UNKNOWN_CLIENT.to_string();
    };
    if !proxies.is_trusted(peer_ip) {
        if headers.contains_key("x-forwarded-for") || headers.contains_key("x-real-ip") {
            debug!(peer = %peer_ip, "ignoring forwarding headers from untrusted peer");
        }
        return peer_ip.to_string();
    }
    if proxies.real_ip_header.is_empty() {
        return peer_ip.to_string();
    }

    headers
        .get(proxies.real_ip_header.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|value| proxies.client_from_header(value))
        .unwrap_or(peer_ip)
        .to_string()
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(ApiError::malformed_body)
}

fn peer(info: Option<ConnectInfo<SocketAddr>>) -> Option<SocketAddr> {
    info.map(|ConnectInfo(addr)| addr)
}

async fn claim(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let _timer = RequestTimer::new("claim");
    let key = state.client_key(&headers, connect);
    let response = state.service.claim(&key, parse_body(&body)?).await?;
    Ok(Json(response))
}

async fn claim_batch(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let _timer = RequestTimer::new("claim_batch");
    let key = state.client_key(&headers, connect);
    let response = state.service.claim_batch(&key, parse_body(&body)?).await?;
    Ok(Json(response))
}

async fn paint_batch(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let _timer = RequestTimer::new("paint_batch");
    let key = state.client_key(&headers, connect);
    let response = state.service.paint_batch(&key, parse_body(&body)?).await?;
    Ok(Json(response))
}

async fn pixel(
    State(state): State<AppState>,
    Path(position): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.pixel(&position).await?))
}

async fn leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let _timer = RequestTimer::new("leaderboard");
    Ok(Json(state.service.leaderboard().await?))
}

async fn world(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let _timer = RequestTimer::new("world");
    Ok(Json(state.service.world().await?))
}

async fn actor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.actor(&id).await?))
}

async fn country(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.country(&code).await?))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn metrics() -> Response {
    match terra_telemetry::encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let retry_after = self.retry_after_secs();
        let mut response = (status, Json(self)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
