//! # Timeline Flows
//!
//! Retention pruning as seen through recent activity, and the online-actor
//! figure returned by batch writes.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use crate::harness::{test_config, TestNode};

    const CLIENT: &str = "192.0.2.20";
    const MINUTE_MS: u64 = 60_000;

    fn node_with_retention(minutes: u64) -> TestNode {
        let mut config = test_config();
        config.timeline.retention = Duration::from_secs(minutes * 60);
        TestNode::new(config)
    }

    #[tokio::test]
    async fn test_pruned_entries_leave_recent_activity() {
        let node = node_with_retention(10);
        node.post("/api/claim", json!({"cellKey": "46.0000,2.0000", "actorId": "alice"}), CLIENT)
            .await;

        node.advance(11 * MINUTE_MS);
        let (_, _, result) = node
            .post(
                "/api/claim/batch",
                json!({"cells": ["46.0100,2.0100"], "actorId": "bob"}),
                CLIENT,
            )
            .await;
        assert_eq!(result["processed"], 1);
        assert_eq!(result["onlineActors"], 1);

        let (_, board) = node.get("/api/leaderboard").await;
        let recent = board["recentActivity"].as_array().unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0]["cell"], "46.0100,2.0100");
        assert_eq!(recent[0]["country"], "FR");
        assert_eq!(node.container.cell_timeline.len().await.unwrap(), 1);

        // Pruning touches only the log; the claim itself stays.
        let (_, world) = node.get("/api/world").await;
        assert_eq!(world["totalClaimed"], 2);
    }

    #[tokio::test]
    async fn test_online_actors_counts_distinct_recent_actors() {
        let node = node_with_retention(60);
        for (i, actor) in ["alice", "bob", "alice"].iter().enumerate() {
            node.post(
                "/api/claim",
                json!({"cellKey": format!("46.{:04},2.5000", i), "actorId": actor}),
                CLIENT,
            )
            .await;
        }

        let (_, _, result) = node
            .post(
                "/api/claim/batch",
                json!({"cells": ["46.0100,2.5000"], "actorId": "carol"}),
                CLIENT,
            )
            .await;
        assert_eq!(result["onlineActors"], 3);

        // Past the 5-minute online window, inside retention.
        node.advance(6 * MINUTE_MS);
        let (_, _, result) = node
            .post(
                "/api/claim/batch",
                json!({"cells": ["46.0200,2.5000"], "actorId": "dave"}),
                CLIENT,
            )
            .await;
        assert_eq!(result["onlineActors"], 1);
        let (_, board) = node.get("/api/leaderboard").await;
        assert_eq!(board["recentActivity"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_painters_count_as_online() {
        let node = node_with_retention(60);
        node.post(
            "/api/paint/batch",
            json!({"pixels": [{"position": "5,5", "color": "#abcdef"}], "actorId": "painter"}),
            CLIENT,
        )
        .await;

        let (_, _, result) = node
            .post(
                "/api/claim/batch",
                json!({"cells": ["46.3000,2.3000"], "actorId": "claimer"}),
                CLIENT,
            )
            .await;
        assert_eq!(result["onlineActors"], 2);
    }

    #[tokio::test]
    async fn test_online_actors_never_below_one() {
        let node = node_with_retention(60);
        let (_, _, result) = node
            .post(
                "/api/claim/batch",
                json!({"cells": ["0.0000,-160.0000"], "actorId": "sailor"}),
                CLIENT,
            )
            .await;
        assert_eq!(result["processed"], 0);
        assert_eq!(result["onlineActors"], 1);
    }

    #[tokio::test]
    async fn test_recent_activity_newest_first() {
        let node = node_with_retention(60);
        for (i, actor) in ["alice", "bob"].iter().enumerate() {
            node.post(
                "/api/claim",
                json!({"cellKey": format!("46.{:04},2.7000", i), "actorId": actor}),
                CLIENT,
            )
            .await;
            node.advance(1_000);
        }

        let (_, board) = node.get("/api/leaderboard").await;
        let recent = board["recentActivity"].as_array().unwrap();
        assert_eq!(recent[0]["cell"], "46.0001,2.7000");
        assert_eq!(recent[1]["cell"], "46.0000,2.7000");
        assert!(recent[0]["timestamp"].as_u64() > recent[1]["timestamp"].as_u64());
        assert!(recent[0]["handle"].as_str().unwrap().starts_with("Explorer-"));
    }
}
