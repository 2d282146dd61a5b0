//! # Claim and Paint Flows
//!
//! Single claims, cell batches and pixel batches through the full stack:
//! validator, rate limiter, ledger, shared store, aggregation reads.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::harness::{test_config, TestNode};

    const CLIENT: &str = "203.0.113.1";

    /// Distinct cells in central France, none inside an open-water box.
    fn france_cells(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("46.{:04},2.{:04}", i * 37 % 10_000, i * 53 % 10_000))
            .collect()
    }

    #[tokio::test]
    async fn test_same_cell_twice_counts_once() {
        let node = TestNode::new(test_config());
        let cell = "48.8566,2.3522";

        let (status, _, first) = node
            .post("/api/claim", json!({"cellKey": cell, "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["outcome"], "claimed");
        assert_eq!(first["country"], "FR");
        assert_eq!(first["firstClaim"], true);

        let (status, _, second) = node
            .post("/api/claim", json!({"cellKey": cell, "actorId": "bob"}), CLIENT)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["success"], false);
        assert_eq!(second["outcome"], "already_claimed");

        let (_, france) = node.get("/api/countries/FR").await;
        assert_eq!(france["revealedCount"], 1);

        let (_, alice) = node.get("/api/actors/alice").await;
        assert_eq!(alice["score"], 1);
        assert_eq!(alice["rank"], 1);
        let (_, bob) = node.get("/api/actors/bob").await;
        assert_eq!(bob["score"], 0);
        assert!(bob["rank"].is_null());
    }

    #[tokio::test]
    async fn test_equivalent_spellings_are_one_cell() {
        let node = TestNode::new(test_config());

        let (_, _, first) = node
            .post("/api/claim", json!({"cellKey": "48.85,2.35", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(first["outcome"], "claimed");

        let (_, _, second) = node
            .post(
                "/api/claim",
                json!({"cellKey": "48.850000,2.350049", "actorId": "bob"}),
                CLIENT,
            )
            .await;
        assert_eq!(second["outcome"], "already_claimed");
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected_wholesale() {
        let node = TestNode::new(test_config());
        let body = json!({"cells": france_cells(51), "actorId": "alice"});

        let (status, _, error) = node.post("/api/claim/batch", body, CLIENT).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "VALIDATION_FAILED");
        assert_eq!(error["field"], "cells");

        assert_eq!(node.store.write_calls(), 0);
        assert_eq!(node.geocoder.calls(), 0);
        let (_, world) = node.get("/api/world").await;
        assert_eq!(world["totalClaimed"], 0);
    }

    #[tokio::test]
    async fn test_partial_batch_adds_exactly_the_valid_cells() {
        let node = TestNode::new(test_config());
        node.post("/api/claim", json!({"cellKey": "45.0000,1.0000", "actorId": "alice"}), CLIENT)
            .await;
        let (_, before) = node.get("/api/world").await;
        assert_eq!(before["totalClaimed"], 1);

        // Past the aggregation cache TTL.
        node.advance(10_000);

        let mut cells = france_cells(3);
        cells.push("not-a-cell".into());
        cells.push("95.0000,2.0000".into());
        let (status, _, result) = node
            .post("/api/claim/batch", json!({"cells": cells, "actorId": "bob"}), CLIENT)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["processed"], 3);
        assert_eq!(result["rejected"], 2);
        assert_eq!(result["totalClaimed"], 4);

        let (_, after) = node.get("/api/world").await;
        assert_eq!(after["totalClaimed"], 4);
        assert_eq!(after["claimedCells"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_batch_skips_claimed_and_water_cells() {
        let node = TestNode::new(test_config());
        let cells = france_cells(2);
        node.post("/api/claim", json!({"cellKey": cells[0], "actorId": "alice"}), CLIENT)
            .await;

        let body = json!({
            "cells": [cells[0], cells[1], "0.0000,-160.0000"],
            "actorId": "bob"
        });
        let (_, _, result) = node.post("/api/claim/batch", body, CLIENT).await;
        assert_eq!(result["processed"], 1);
        assert_eq!(result["rejected"], 0);
        assert_eq!(result["totalClaimed"], 2);

        let (_, bob) = node.get("/api/actors/bob").await;
        assert_eq!(bob["score"], 1);
        assert_eq!(bob["claimedCells"], 1);
    }

    #[tokio::test]
    async fn test_country_percentage_uses_configured_total() {
        let mut config = test_config();
        config
            .aggregation
            .country_totals
            .insert("FR".to_string(), 10_000);
        let node = TestNode::new(config);

        let cells = france_cells(25);
        let (_, _, batch) = node
            .post(
                "/api/claim/batch",
                json!({"cells": &cells[..24], "actorId": "alice"}),
                CLIENT,
            )
            .await;
        assert_eq!(batch["processed"], 24);

        let (_, _, last) = node
            .post("/api/claim", json!({"cellKey": cells[24], "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(last["outcome"], "claimed");
        assert_eq!(last["percentage"], 0.25);
        assert_eq!(last["firstClaim"], false);

        let (_, france) = node.get("/api/countries/FR").await;
        assert_eq!(france["revealedCount"], 25);
        assert_eq!(france["totalCells"], 10_000);
        assert_eq!(france["percentage"], 0.25);
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_score() {
        let node = TestNode::new(test_config());
        let cells = france_cells(4);
        node.post(
            "/api/claim/batch",
            json!({"cells": &cells[..3], "actorId": "alice"}),
            CLIENT,
        )
        .await;
        node.post("/api/claim", json!({"cellKey": cells[3], "actorId": "bob"}), CLIENT)
            .await;

        let (status, board) = node.get("/api/leaderboard").await;
        assert_eq!(status, StatusCode::OK);
        let actors = board["actors"].as_array().unwrap();
        assert_eq!(actors.len(), 2);
        assert_eq!(actors[0]["rank"], 1);
        assert_eq!(actors[0]["score"], 3);
        assert_eq!(actors[1]["score"], 1);

        let countries = board["countries"].as_array().unwrap();
        assert_eq!(countries[0]["code"], "FR");
        assert_eq!(countries[0]["revealedCount"], 4);
        assert_eq!(board["recentActivity"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_pixel_overwrite_keeps_last_value() {
        let node = TestNode::new(test_config());
        let body = json!({
            "pixels": [
                {"position": "10,20", "color": "#112233", "opacity": 1.0},
                {"position": "10,20", "color": "#445566", "opacity": 0.5},
                {"position": "11,20", "color": "#778899", "opacity": 0.25},
                {"position": "", "color": "#000000", "opacity": 1.0}
            ],
            "actorId": "painter"
        });

        let (status, _, result) = node.post("/api/paint/batch", body, CLIENT).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["processed"], 3);
        assert_eq!(result["rejected"], 1);
        assert_eq!(result["totalPixels"], 3);
        assert_eq!(result["onlineActors"], 1);

        let (status, pixel) = node.get("/api/pixels/10,20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pixel["color"], "#445566");
        assert_eq!(pixel["opacity"], 0.5);
        assert_eq!(pixel["ownerId"], "painter");

        let (_, painter) = node.get("/api/actors/painter").await;
        assert_eq!(painter["pixelsPainted"], 3);
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_as_unavailable() {
        let node = TestNode::new(test_config());
        node.store.fail_writes(true);

        let (status, _, error) = node
            .post("/api/claim", json!({"cellKey": "46.5000,2.5000", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error["code"], "STORE_UNAVAILABLE");

        node.store.fail_writes(false);
        let (_, _, retry) = node
            .post("/api/claim", json!({"cellKey": "46.5000,2.5000", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(retry["outcome"], "claimed");
    }
}
