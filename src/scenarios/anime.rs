//! Anime scenario groups

use serde_json::json;

use crate::client::RequestSpec;
use crate::runner::{Assertion, Extraction, ScenarioGroup, TestCase};

/// Manage an anime on the authenticated user's list: search, add as
/// watching, verify presence, remove, verify absence.
pub fn list_management() -> ScenarioGroup {
    ScenarioGroup {
        name: "anime-list-management".to_string(),
        description: Some("Managing a user's anime list".to_string()),
        cases: vec![
            TestCase {
                name: "search for an anime and extract its id".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/anime")
                    .query("q", "Witch Watch")
                    .query("limit", 1),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like(json!({
                        "data": [{"node": {"title": "Witch Watch"}}]
                    })),
                ],
                extract: Some(Extraction {
                    path: "data[0].node.id".to_string(),
                    store: "animeId".to_string(),
                }),
            },
            TestCase {
                name: "add the anime to the list with status watching".to_string(),
                requires: vec!["animeId".to_string()],
                // A leftover entry from an aborted earlier run would turn
                // the PUT into an update; clear it first, ignoring the
                // outcome.
                cleanup: Some(RequestSpec::delete("/anime/{animeId}/my_list_status")),
                request: RequestSpec::put("/anime/{animeId}/my_list_status").json(json!({
                    "status": "watching",
                    "num_watched_episodes": 1
                })),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like(json!({"status": "watching"})),
                ],
                extract: None,
            },
            TestCase {
                name: "verify the anime appears on the watching list".to_string(),
                requires: vec!["animeId".to_string()],
                cleanup: None,
                request: RequestSpec::get("/users/@me/animelist")
                    .query("status", "watching")
                    .query("limit", 100)
                    .query("fields", "list_status"),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like_at("data[*].node.id", json!(["{animeId}"])),
                ],
                extract: None,
            },
            TestCase {
                name: "remove the anime from the list".to_string(),
                requires: vec!["animeId".to_string()],
                cleanup: None,
                request: RequestSpec::delete("/anime/{animeId}/my_list_status"),
                expect: vec![Assertion::status(200), Assertion::body_contains("")],
                extract: None,
            },
            TestCase {
                name: "verify the anime is gone from the watching list".to_string(),
                requires: vec!["animeId".to_string()],
                cleanup: None,
                request: RequestSpec::get("/users/@me/animelist")
                    .query("status", "watching")
                    .query("limit", 100)
                    .query("fields", "list_status"),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_not_like_at("data[*].node.id", json!(["{animeId}"])),
                ],
                extract: None,
            },
        ],
    }
}

/// Read-only anime endpoints: paged search, details, ranking, seasonal.
pub fn discovery() -> ScenarioGroup {
    let paged_nodes = json!({
        "type": "object",
        "required": ["data", "paging"],
        "properties": {
            "data": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["node"],
                    "properties": {
                        "node": {
                            "type": "object",
                            "required": ["id", "title"],
                            "properties": {
                                "id": {"type": "integer"},
                                "title": {"type": "string"}
                            }
                        }
                    }
                }
            }
        }
    });

    ScenarioGroup {
        name: "anime-discovery".to_string(),
        description: Some("Search, details, ranking and seasonal listings".to_string()),
        cases: vec![
            TestCase {
                name: "search returns a page of anime nodes".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/anime").query("q", "one piece").query("limit", 4),
                expect: vec![Assertion::status(200), Assertion::schema(paged_nodes.clone())],
                extract: Some(Extraction {
                    path: "data[0].node.id".to_string(),
                    store: "animeId".to_string(),
                }),
            },
            TestCase {
                name: "fetch details for the first search result".to_string(),
                requires: vec!["animeId".to_string()],
                cleanup: None,
                request: RequestSpec::get("/anime/{animeId}")
                    .query("fields", "id,title,mean,rank,media_type"),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like(json!({"id": "{animeId}"})),
                    Assertion::schema(json!({
                        "type": "object",
                        "required": ["id", "title"],
                        "properties": {
                            "id": {"type": "integer"},
                            "title": {"type": "string"},
                            "media_type": {
                                "enum": ["tv", "ova", "movie", "special", "ona", "music", "unknown"]
                            }
                        }
                    })),
                ],
                extract: None,
            },
            TestCase {
                name: "ranking lists ranked anime nodes".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/anime/ranking")
                    .query("ranking_type", "all")
                    .query("limit", 4),
                expect: vec![
                    Assertion::status(200),
                    Assertion::schema(json!({
                        "type": "object",
                        "required": ["data"],
                        "properties": {
                            "data": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "required": ["node", "ranking"],
                                    "properties": {
                                        "ranking": {
                                            "type": "object",
                                            "required": ["rank"],
                                            "properties": {"rank": {"type": "integer"}}
                                        }
                                    }
                                }
                            }
                        }
                    })),
                ],
                extract: None,
            },
            TestCase {
                name: "seasonal listing echoes the requested season".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/anime/season/2025/winter")
                    .query("sort", "anime_score")
                    .query("limit", 4),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like(json!({
                        "season": {"year": 2025, "season": "winter"}
                    })),
                    Assertion::schema(paged_nodes),
                ],
                extract: None,
            },
        ],
    }
}
