//! User profile scenario group

use serde_json::json;

use crate::client::RequestSpec;
use crate::runner::{Assertion, ScenarioGroup, TestCase};

/// Profile retrieval plus a negative check that the API rejects an
/// invalid list filter instead of silently returning data.
pub fn profile() -> ScenarioGroup {
    ScenarioGroup {
        name: "user-profile".to_string(),
        description: Some("Authenticated user profile and list filters".to_string()),
        cases: vec![
            TestCase {
                name: "fetch the authenticated user's profile".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/users/@me").query("fields", "anime_statistics"),
                expect: vec![
                    Assertion::status(200),
                    Assertion::schema(json!({
                        "type": "object",
                        "required": ["id", "name"],
                        "properties": {
                            "id": {"type": "integer"},
                            "name": {"type": "string"}
                        }
                    })),
                ],
                extract: None,
            },
            TestCase {
                name: "an invalid status filter is rejected".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/users/@me/animelist")
                    .query("status", "binge_watching")
                    .query("limit", 4),
                expect: vec![Assertion::status(400)],
                extract: None,
            },
        ],
    }
}
