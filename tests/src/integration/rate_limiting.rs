//! # Rate Limiting Flows
//!
//! Fixed-window admission in front of the write endpoints, per process and
//! shared through the store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{header, StatusCode};
    use node_runtime::container::{NodeConfig, SubsystemContainer};
    use serde_json::{json, Value};
    use shared_store::SharedStore;
    use tc_02_rate_limiter::AdmissionControl;

    use crate::harness::{test_config, TestNode};

    const WINDOW_MS: u64 = 60_000;

    fn limited_config(max: u32) -> NodeConfig {
        let mut config = test_config();
        config.rate_limit.max_per_window = max;
        config
    }

    fn claim(i: usize) -> Value {
        json!({"cellKey": format!("46.{:04},3.0000", i), "actorId": "alice"})
    }

    #[tokio::test]
    async fn test_limit_then_reset_after_window() {
        let node = TestNode::new(limited_config(3));
        let client = "203.0.113.50";

        for i in 0..3 {
            let (status, _, _) = node.post("/api/claim", claim(i), client).await;
            assert_eq!(status, StatusCode::OK);
        }

        let writes = node.store.write_calls();
        let (status, headers, error) = node.post("/api/claim", claim(3), client).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error["code"], "RATE_LIMITED");
        let retry_after_ms = error["retryAfterMs"].as_u64().unwrap();
        assert!(retry_after_ms > 0 && retry_after_ms <= WINDOW_MS);
        assert_eq!(headers[header::RETRY_AFTER], "60");
        assert_eq!(node.store.write_calls(), writes);

        node.advance(WINDOW_MS);

        // A fresh window admits exactly `max` again.
        for i in 4..7 {
            let (status, _, _) = node.post("/api/claim", claim(i), client).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _, _) = node.post("/api/claim", claim(7), client).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_clients_are_limited_independently() {
        let node = TestNode::new(limited_config(1));

        let (status, _, _) = node.post("/api/claim", claim(0), "203.0.113.60").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = node.post("/api/claim", claim(1), "203.0.113.60").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _, _) = node.post("/api/claim", claim(2), "203.0.113.61").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_batches_and_paints_share_the_budget() {
        let node = TestNode::new(limited_config(2));
        let client = "203.0.113.70";

        let (status, _, _) = node
            .post(
                "/api/claim/batch",
                json!({"cells": ["46.1000,3.1000"], "actorId": "alice"}),
                client,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let paint = json!({
            "pixels": [{"position": "1,1", "color": "#fff"}],
            "actorId": "alice"
        });
        let (status, _, _) = node.post("/api/paint/batch", paint.clone(), client).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = node.post("/api/paint/batch", paint, client).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_reads_are_not_limited() {
        let node = TestNode::new(limited_config(1));
        node.post("/api/claim", claim(0), "203.0.113.80").await;

        for _ in 0..5 {
            let (status, _) = node.get("/api/leaderboard").await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_whitelisted_client_is_never_limited() {
        let mut config = limited_config(1);
        config.rate_limit.whitelist = vec!["10.1.1.1".to_string()];
        let node = TestNode::new(config);

        for i in 0..4 {
            let (status, _, _) = node.post("/api/claim", claim(i), "10.1.1.1").await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_shared_windows_span_instances() {
        let mut config = limited_config(2);
        config.shared_rate_limit = true;
        let node = TestNode::new(config.clone());
        let client = "203.0.113.90";

        // Second instance over the same store and clock.
        let backing: Arc<dyn SharedStore> = node.store.clone();
        let other = SubsystemContainer::with_parts(config, backing, Vec::new(), node.clock.clone());

        let (status, _, _) = node.post("/api/claim", claim(0), client).await;
        assert_eq!(status, StatusCode::OK);
        assert!(other.limiter.admit(client).await.allowed);

        let (status, _, _) = node.post("/api/claim", claim(1), client).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_process_local_windows_do_not_span_instances() {
        let config = limited_config(1);
        let node = TestNode::new(config.clone());
        let client = "203.0.113.91";

        let backing: Arc<dyn SharedStore> = node.store.clone();
        let other = SubsystemContainer::with_parts(config, backing, Vec::new(), node.clock.clone());

        let (status, _, _) = node.post("/api/claim", claim(0), client).await;
        assert_eq!(status, StatusCode::OK);
        assert!(other.limiter.admit(client).await.allowed);
    }

    #[tokio::test]
    async fn test_spoofed_loopback_header_is_ignored() {
        // Production whitelist: loopback is never limited.
        let mut config = NodeConfig::default();
        config.rate_limit.max_per_window = 2;
        let node = TestNode::new(config);
        let peer = "203.0.113.120:51000";

        let mut admitted = 0;
        for i in 0..10 {
            let (status, _, _) = node
                .post_from("/api/claim", claim(i), peer, Some("127.0.0.1"))
                .await;
            if status == StatusCode::OK {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 2);
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_shares_peer_window() {
        let node = TestNode::new(limited_config(2));
        let peer = "203.0.113.121:51000";

        let mut admitted = 0;
        for i in 0..10 {
            let forwarded = format!("198.51.100.{i}");
            let (status, _, _) = node
                .post_from("/api/claim", claim(i), peer, Some(&forwarded))
                .await;
            if status == StatusCode::OK {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 2);
    }

    #[tokio::test]
    async fn test_trusted_proxy_clients_get_separate_windows() {
        let node = TestNode::new(limited_config(1));

        let (first, _, _) = node.post("/api/claim", claim(0), "198.51.100.1").await;
        let (second, _, _) = node.post("/api/claim", claim(1), "198.51.100.2").await;
        let (repeat, _, _) = node.post("/api/claim", claim(2), "198.51.100.1").await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(repeat, StatusCode::TOO_MANY_REQUESTS);
    }
}
