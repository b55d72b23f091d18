//! End-to-end tests for the scenario runner
//!
//! These drive whole scenario groups through the runner against an
//! in-memory transport serving canned MyAnimeList-shaped responses, so
//! ordering, chaining, and failure-isolation behavior is verified
//! without touching the live API.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use mal_e2e::client::{ApiResponse, Method, RequestSpec, ResolvedRequest, Transport};
use mal_e2e::common::{Error, Result, RunConfig};
use mal_e2e::report::JsonReporter;
use mal_e2e::runner::{Assertion, Extraction, Runner, ScenarioGroup, TestCase};

/// Transport that answers from a handler closure and records every
/// request it sees
struct MockTransport {
    handler: Box<dyn Fn(&ResolvedRequest) -> Result<ApiResponse> + Send + Sync>,
    requests: Mutex<Vec<ResolvedRequest>>,
}

impl MockTransport {
    fn new(
        handler: impl Fn(&ResolvedRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method, r.url.clone()))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ResolvedRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

fn test_config(report_path: PathBuf) -> RunConfig {
    RunConfig {
        base_url: "https://api.test/v2".to_string(),
        timeout_secs: 30,
        token: "test-token".to_string(),
        report_path,
    }
}

fn ok(body: Value) -> Result<ApiResponse> {
    Ok(ApiResponse::new(200, serde_json::to_vec(&body).unwrap()))
}

fn search_case(store: &str) -> TestCase {
    TestCase {
        name: "search".to_string(),
        requires: vec![],
        cleanup: None,
        request: RequestSpec::get("/anime").query("q", "Witch Watch").query("limit", 1),
        expect: vec![
            Assertion::status(200),
            Assertion::json_like(json!({"data": [{"node": {"title": "Witch Watch"}}]})),
        ],
        extract: Some(Extraction {
            path: "data[0].node.id".to_string(),
            store: store.to_string(),
        }),
    }
}

fn add_case() -> TestCase {
    TestCase {
        name: "add to list".to_string(),
        requires: vec!["animeId".to_string()],
        cleanup: None,
        request: RequestSpec::put("/anime/{animeId}/my_list_status")
            .json(json!({"status": "watching", "num_watched_episodes": 1})),
        expect: vec![
            Assertion::status(200),
            Assertion::json_like(json!({"status": "watching"})),
        ],
        extract: None,
    }
}

fn search_response() -> Value {
    json!({
        "data": [{"node": {"id": 52991, "title": "Witch Watch"}}],
        "paging": {}
    })
}

#[tokio::test]
async fn extracted_id_chains_into_later_case_urls() {
    let transport = MockTransport::new(|req| match (req.method, req.url.as_str()) {
        (Method::Get, "https://api.test/v2/anime") => ok(search_response()),
        (Method::Put, "https://api.test/v2/anime/52991/my_list_status") => {
            ok(json!({"status": "watching", "num_watched_episodes": 1}))
        }
        _ => Ok(ApiResponse::new(404, "{}")),
    });

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let group = ScenarioGroup {
        name: "anime".to_string(),
        description: None,
        cases: vec![search_case("animeId"), add_case()],
    };

    let summary = Runner::new(&transport, &config)
        .run(std::slice::from_ref(&group))
        .await
        .unwrap();

    assert_eq!(summary.cases, 2);
    assert_eq!(summary.failed, 0);

    let seen = transport.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].1, "https://api.test/v2/anime/52991/my_list_status");
}

#[tokio::test]
async fn cases_run_strictly_in_declared_order() {
    let transport = MockTransport::new(|_| ok(json!({"data": [], "paging": {}})));

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let cases: Vec<TestCase> = ["first", "second", "third"]
        .iter()
        .map(|name| TestCase {
            name: name.to_string(),
            requires: vec![],
            cleanup: None,
            request: RequestSpec::get(format!("/{name}")),
            expect: vec![Assertion::status(200)],
            extract: None,
        })
        .collect();
    let group = ScenarioGroup {
        name: "ordered".to_string(),
        description: None,
        cases,
    };

    Runner::new(&transport, &config)
        .run(std::slice::from_ref(&group))
        .await
        .unwrap();

    let urls: Vec<String> = transport.seen().into_iter().map(|(_, u)| u).collect();
    assert_eq!(
        urls,
        vec![
            "https://api.test/v2/first",
            "https://api.test/v2/second",
            "https://api.test/v2/third"
        ]
    );
}

#[tokio::test]
async fn dependent_case_fails_with_missing_precondition_without_sending() {
    // Search returns an empty page, so extraction fails and nothing is
    // stored under animeId.
    let transport = MockTransport::new(|req| match req.method {
        Method::Get => ok(json!({"data": [], "paging": {}})),
        _ => panic!("dependent case must not reach the transport"),
    });

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let group = ScenarioGroup {
        name: "anime".to_string(),
        description: None,
        cases: vec![search_case("animeId"), add_case()],
    };

    let summary = Runner::new(&transport, &config)
        .run(std::slice::from_ref(&group))
        .await
        .unwrap();

    assert_eq!(summary.failed, 2);
    // Only the search hit the wire.
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn cleanup_outcome_never_fails_the_primary_case() {
    let transport = MockTransport::new(|req| match req.method {
        // The cleanup DELETE is rejected by the remote; that must be
        // invisible to the primary PUT.
        Method::Delete => Ok(ApiResponse::new(404, r#"{"error":"not_found"}"#)),
        Method::Get => ok(search_response()),
        Method::Put => ok(json!({"status": "watching"})),
        _ => Ok(ApiResponse::new(500, "{}")),
    });

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let mut add = add_case();
    add.cleanup = Some(RequestSpec::delete("/anime/{animeId}/my_list_status"));
    let group = ScenarioGroup {
        name: "anime".to_string(),
        description: None,
        cases: vec![search_case("animeId"), add],
    };

    let summary = Runner::new(&transport, &config)
        .run(std::slice::from_ref(&group))
        .await
        .unwrap();

    assert_eq!(summary.failed, 0);

    let seen = transport.seen();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[1].0, Method::Delete);
    assert_eq!(seen[2].0, Method::Put);
}

#[tokio::test]
async fn removal_is_verified_by_absence_from_the_list() {
    let transport = MockTransport::new(|req| match (req.method, req.url.as_str()) {
        (Method::Get, "https://api.test/v2/anime") => ok(search_response()),
        (Method::Delete, _) => Ok(ApiResponse::new(200, "")),
        (Method::Get, "https://api.test/v2/users/@me/animelist") => {
            ok(json!({"data": [{"node": {"id": 999}}], "paging": {}}))
        }
        _ => Ok(ApiResponse::new(404, "{}")),
    });

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let group = ScenarioGroup {
        name: "anime".to_string(),
        description: None,
        cases: vec![
            search_case("animeId"),
            TestCase {
                name: "remove".to_string(),
                requires: vec!["animeId".to_string()],
                cleanup: None,
                request: RequestSpec::delete("/anime/{animeId}/my_list_status"),
                expect: vec![Assertion::status(200), Assertion::body_contains("")],
                extract: None,
            },
            TestCase {
                name: "verify gone".to_string(),
                requires: vec!["animeId".to_string()],
                cleanup: None,
                request: RequestSpec::get("/users/@me/animelist").query("status", "watching"),
                expect: vec![
                    Assertion::status(200),
                    Assertion::json_not_like_at("data[*].node.id", json!(["{animeId}"])),
                ],
                extract: None,
            },
        ],
    };

    let summary = Runner::new(&transport, &config)
        .run(std::slice::from_ref(&group))
        .await
        .unwrap();

    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn a_failing_group_does_not_stop_later_groups() {
    let transport = MockTransport::new(|req| {
        if req.url.ends_with("/anime") {
            // First group times out on its only case.
            Err(Error::Timeout(30))
        } else {
            ok(json!({"id": 7, "name": "mal-user"}))
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let groups = vec![
        ScenarioGroup {
            name: "broken".to_string(),
            description: None,
            cases: vec![search_case("animeId")],
        },
        ScenarioGroup {
            name: "profile".to_string(),
            description: None,
            cases: vec![TestCase {
                name: "me".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::get("/users/@me"),
                expect: vec![
                    Assertion::status(200),
                    Assertion::schema(json!({"type": "object", "required": ["id", "name"]})),
                ],
                extract: None,
            }],
        },
    ];

    let summary = Runner::new(&transport, &config).run(&groups).await.unwrap();

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.cases, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(transport.seen().len(), 2);
}

#[tokio::test]
async fn groups_never_share_extracted_state() {
    let transport = MockTransport::new(|req| match req.method {
        Method::Get => ok(search_response()),
        // The second group never searched, so its PUT must arrive with
        // the default ID 0, which the remote rejects.
        Method::Put if req.url.contains("/anime/0/") => Ok(ApiResponse::new(404, "{}")),
        Method::Put => ok(json!({"status": "watching"})),
        _ => Ok(ApiResponse::new(500, "{}")),
    });

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().join("report.json"));
    let groups = vec![
        ScenarioGroup {
            name: "seeds-state".to_string(),
            description: None,
            cases: vec![search_case("animeId"), add_case()],
        },
        ScenarioGroup {
            name: "fresh-context".to_string(),
            description: None,
            cases: vec![TestCase {
                name: "add without search".to_string(),
                requires: vec![],
                cleanup: None,
                request: RequestSpec::put("/anime/{animeId}/my_list_status")
                    .json(json!({"status": "watching"})),
                expect: vec![Assertion::status(200)],
                extract: None,
            }],
        },
    ];

    let summary = Runner::new(&transport, &config).run(&groups).await.unwrap();

    // The zero-ID request is made and surfaces as a real failure.
    assert_eq!(summary.failed, 1);
    let urls: Vec<String> = transport.seen().into_iter().map(|(_, u)| u).collect();
    assert!(urls.contains(&"https://api.test/v2/anime/0/my_list_status".to_string()));
}

#[tokio::test]
async fn report_artifact_is_written_even_when_cases_fail() {
    let transport = MockTransport::new(|_| Ok(ApiResponse::new(500, "{}")));

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    let config = test_config(report_path.clone());
    let group = ScenarioGroup {
        name: "anime".to_string(),
        description: None,
        cases: vec![search_case("animeId")],
    };

    let mut runner = Runner::new(&transport, &config);
    runner.add_reporter(Box::new(JsonReporter::new(&report_path)));
    let summary = runner.run(std::slice::from_ref(&group)).await.unwrap();

    assert_eq!(summary.failed, 1);

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["failed"], 1);
    assert_eq!(written["groups"][0]["name"], "anime");
    assert_eq!(written["groups"][0]["cases"][0]["passed"], false);
    let error = written["groups"][0]["cases"][0]["error"].as_str().unwrap();
    assert!(error.contains("expected 200"), "error was: {error}");
}

#[test]
fn missing_credential_aborts_before_any_case() {
    // Serialized within this one test to avoid env races.
    std::env::remove_var("MAL_ACCESS_TOKEN");
    let err = RunConfig::load(Default::default()).unwrap_err();
    assert!(matches!(err, Error::MissingCredential));
    assert!(err.is_fatal());

    std::env::set_var("MAL_ACCESS_TOKEN", "token-from-env");
    let config = RunConfig::load(Default::default()).unwrap();
    assert_eq!(config.token, "token-from-env");
    assert_eq!(config.timeout_secs, 30);
    std::env::remove_var("MAL_ACCESS_TOKEN");
}

#[tokio::test]
async fn yaml_scenario_runs_through_the_same_engine() {
    let yaml = r#"
name: yaml-smoke
cases:
  - name: search
    request:
      method: GET
      path: /anime
      query:
        q: Witch Watch
        limit: "1"
    expect:
      - check: status
        equals: 200
    extract:
      path: data[0].node.id
      store: animeId
  - name: detail
    requires: [animeId]
    request:
      method: GET
      path: /anime/{animeId}
    expect:
      - check: status
        equals: 200
      - check: json_like
        value:
          id: "{animeId}"
"#;
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("smoke.yaml");
    std::fs::write(&scenario_path, yaml).unwrap();
    let group = ScenarioGroup::from_yaml_file(&scenario_path).unwrap();

    let transport = MockTransport::new(|req| match req.url.as_str() {
        "https://api.test/v2/anime" => ok(search_response()),
        "https://api.test/v2/anime/52991" => ok(json!({"id": 52991, "title": "Witch Watch"})),
        _ => Ok(ApiResponse::new(404, "{}")),
    });
    let config = test_config(dir.path().join("report.json"));

    let summary = Runner::new(&transport, &config)
        .run(std::slice::from_ref(&group))
        .await
        .unwrap();

    assert_eq!(summary.cases, 2);
    assert_eq!(summary.failed, 0);
}
