//! # Classification Flows
//!
//! Territory decisions as seen by claimants: local heuristics, the shared
//! grid cache, mirror failure and the unknown-territory policy.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use shared_types::{Coordinate, TerritoryType};
    use tc_01_geo_classifier::{RawAddress, TerritoryClassifier};

    use crate::harness::{test_config, TestNode};

    const CLIENT: &str = "198.51.100.4";
    const DAY_MS: u64 = 24 * 60 * 60 * 1000;

    #[tokio::test]
    async fn test_open_pacific_is_water_without_lookup() {
        let node = TestNode::new(test_config());

        let classification = node
            .container
            .classifier
            .classify(Coordinate::new(0.0, -160.0))
            .await;
        assert_eq!(classification.territory, TerritoryType::Water);
        assert!(classification.country.is_none());

        let (status, _, result) = node
            .post("/api/claim", json!({"cellKey": "0.0,-160.0", "actorId": "sailor"}), CLIENT)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["success"], false);
        assert_eq!(result["outcome"], "unclaimable");
        assert_eq!(result["territory"], "water");

        assert_eq!(node.geocoder.calls(), 0);
        assert_eq!(node.container.classifier.stats().heuristic_hits, 2);
    }

    #[tokio::test]
    async fn test_nearby_claims_share_one_lookup() {
        let node = TestNode::new(test_config());

        for (cell, actor) in [("48.8566,2.3522", "alice"), ("48.8571,2.3519", "bob")] {
            let (_, _, result) = node
                .post("/api/claim", json!({"cellKey": cell, "actorId": actor}), CLIENT)
                .await;
            assert_eq!(result["outcome"], "claimed");
            assert_eq!(result["country"], "FR");
        }
        assert_eq!(node.geocoder.calls(), 1);

        // Still inside the 30-day cache window.
        node.advance(29 * DAY_MS);
        let (_, _, result) = node
            .post("/api/claim", json!({"cellKey": "48.8560,2.3520", "actorId": "carol"}), CLIENT)
            .await;
        assert_eq!(result["outcome"], "claimed");
        assert_eq!(node.geocoder.calls(), 1);

        node.advance(2 * DAY_MS);
        node.post("/api/claim", json!({"cellKey": "48.8562,2.3524", "actorId": "dave"}), CLIENT)
            .await;
        assert_eq!(node.geocoder.calls(), 2);
    }

    #[tokio::test]
    async fn test_polar_cells() {
        let node = TestNode::new(test_config());

        let (_, _, south) = node
            .post("/api/claim", json!({"cellKey": "-75.0,10.0", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(south["outcome"], "claimed");
        assert_eq!(south["country"], "AQ");
        assert_eq!(south["territory"], "antarctica");

        let (_, _, north) = node
            .post("/api/claim", json!({"cellKey": "89.0,10.0", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(north["outcome"], "unclaimable");
        assert_eq!(north["territory"], "international_waters");

        assert_eq!(node.geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_unlisted_country_is_claimed_as_unclassified() {
        let node = TestNode::with_address(test_config(), RawAddress::in_country("tv"));
        let (_, _, result) = node
            .post("/api/claim", json!({"cellKey": "-8.5,179.2", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(result["outcome"], "claimed");
        assert_eq!(result["country"], "XX");
    }

    #[tokio::test]
    async fn test_mirror_outage_rejects_unknown_by_default() {
        let node = TestNode::new(test_config());
        node.geocoder.set_response(None);

        let (status, _, result) = node
            .post("/api/claim", json!({"cellKey": "46.2,2.2", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["outcome"], "unclaimable");
        assert_eq!(result["territory"], "unknown");

        let (_, world) = node.get("/api/world").await;
        assert_eq!(world["totalClaimed"], 0);
    }

    #[tokio::test]
    async fn test_mirror_outage_with_unknown_policy_claims_unclassified() {
        let mut config = test_config();
        config.ledger.accept_unknown_territory = true;
        let node = TestNode::new(config);
        node.geocoder.set_response(None);

        let (_, _, result) = node
            .post("/api/claim", json!({"cellKey": "46.2,2.2", "actorId": "alice"}), CLIENT)
            .await;
        assert_eq!(result["outcome"], "claimed");
        assert_eq!(result["country"], "XX");
        assert_eq!(result["territory"], "unknown");
    }
}
