//! Fully wired node for cross-subsystem tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use node_runtime::container::{NodeConfig, SubsystemContainer};
use serde_json::Value;
use shared_store::testing::FailingStore;
use shared_store::SharedStore;
use shared_types::{ManualClock, Timestamp};
use tc_01_geo_classifier::testing::CountingGeocoder;
use tc_01_geo_classifier::{RawAddress, ReverseGeocoder};
use tower::ServiceExt;

/// Loopback reverse proxy that relays every harness request.
pub const PROXY_ADDR: &str = "127.0.0.1:41000";

/// Clock start for every test node.
pub const START: Timestamp = 1_700_000_000_000;

/// Defaults with rate limiting loose enough not to interfere and no
/// whitelisted clients.
pub fn test_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.rate_limit.max_per_window = 1_000;
    config.rate_limit.whitelist.clear();
    config
}

pub struct TestNode {
    pub clock: Arc<ManualClock>,
    pub store: Arc<FailingStore>,
    pub geocoder: Arc<CountingGeocoder>,
    pub container: SubsystemContainer,
    router: Router,
}

impl TestNode {
    /// Node whose geocoder places every looked-up coordinate in France.
    pub fn new(config: NodeConfig) -> Self {
        Self::with_address(config, RawAddress::in_country("fr"))
    }

    pub fn with_address(config: NodeConfig, address: RawAddress) -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(FailingStore::with_clock(clock.clone()));
        let geocoder = Arc::new(CountingGeocoder::returning("mirror-a", address));

        let backing: Arc<dyn SharedStore> = store.clone();
        let mirrors: Vec<Arc<dyn ReverseGeocoder>> = vec![geocoder.clone()];
        let container = SubsystemContainer::with_parts(config, backing, mirrors, clock.clone());
        let router = tc_07_api_gateway::router(
            container.claim_service.clone(),
            container.config.gateway.trusted_proxy.clone(),
        );

        Self {
            clock,
            store,
            geocoder,
            container,
            router,
        }
    }

    pub fn advance(&self, millis: u64) {
        self.clock.advance(millis);
    }

    /// POST relayed by the loopback proxy on behalf of `client`.
    pub async fn post(&self, uri: &str, body: Value, client: &str) -> (StatusCode, HeaderMap, Value) {
        self.post_from(uri, body, PROXY_ADDR, Some(client)).await
    }

    /// POST arriving from socket peer `peer`, optionally carrying an
    /// `X-Forwarded-For` header.
    pub async fn post_from(
        &self,
        uri: &str,
        body: Value,
        peer: &str,
        forwarded_for: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(forwarded) = forwarded_for {
            builder = builder.header("x-forwarded-for", forwarded);
        }
        let mut request = builder.body(Body::from(body.to_string())).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }
}
