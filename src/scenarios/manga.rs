//! Manga scenario group

use serde_json::json;

use crate::client::RequestSpec;
use crate::runner::{Assertion, Extraction, ScenarioGroup, TestCase};

/// Manage a manga on the authenticated user's list: search, mark as
/// reading, remove.
pub fn list_management() -> ScenarioGroup {
    ScenarioGroup {
        name: "manga-list-management".to_string(),
        description: Some("Managing a user's manga list".to_string()),
        cases: vec![
            TestCase {
                name: "search for a manga and extract its id".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/manga").query("q", "Berserk").query("limit", 1),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like(json!({
                        "data": [{"node": {"title": "Berserk"}}]
                    })),
                ],
                extract: Some(Extraction {
                    path: "data[0].node.id".to_string(),
                    store: "mangaId".to_string(),
                }),
            },
            TestCase {
                name: "mark the manga as reading".to_string(),
                requires: vec!["mangaId".to_string()],
                // Same tolerance as the anime group: drop any entry a
                // previous run left behind, outcome ignored.
                cleanup: Some(RequestSpec::delete("/manga/{mangaId}/my_list_status")),
                request: RequestSpec::patch("/manga/{mangaId}/my_list_status").json(json!({
                    "status": "reading",
                    "num_chapters_read": 1
                })),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_like(json!({"status": "reading"})),
                ],
                extract: None,
            },
            TestCase {
                name: "remove the manga from the list".to_string(),
                requires: vec!["mangaId".to_string()],
                cleanup: None,
                request: RequestSpec::delete("/manga/{mangaId}/my_list_status"),
                expect: vec![Assertion::status(200), Assertion::body_contains("")],
                extract: None,
            },
        ],
    }
}
