//! Scenario and case definitions
//!
//! A scenario group is an ordered list of cases sharing a
//! [`GroupContext`] of extracted values. Groups are either built in code
//! (the built-in suite) or deserialized from a YAML file; both paths go
//! through the same types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::client::{RequestSpec, ResolvedRequest};
use crate::common::{Error, Result};
use crate::runner::assert::Assertion;

/// A named cluster of dependent cases executed strictly in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cases: Vec<TestCase>,
}

impl ScenarioGroup {
    /// Load a scenario group from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ScenarioParse(format!("failed to read '{}': {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            Error::ScenarioParse(format!("failed to parse '{}': {}", path.display(), e))
        })
    }
}

/// One request/assert cycle; executes exactly once, never retried
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Context keys that must have been extracted by an earlier case.
    /// A missing key fails the case before any HTTP is attempted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Best-effort request issued before the primary one; its outcome is
    /// discarded by contract (tolerance for non-idempotent remote state).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<RequestSpec>,
    pub request: RequestSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expect: Vec<Assertion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Extraction>,
}

/// Pulls a value out of the response body into the group context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// JSON path into the response body, e.g. `data[0].node.id`
    pub path: String,
    /// Context key the resolved value is stored under
    pub store: String,
}

/// Mutable state shared by the cases of one group
///
/// Created empty at group start and dropped at group end; keys are
/// written once by an extracting case and read by later cases. A `{key}`
/// placeholder with no stored value interpolates as `0`, preserving the
/// source suite's behavior of sending ID 0 and letting the remote API
/// reject it.
#[derive(Debug, Default)]
pub struct GroupContext {
    values: HashMap<String, Value>,
}

impl GroupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Value) {
        if let Some(old) = self.values.insert(key.to_string(), value) {
            debug!(key, %old, "context key overwritten");
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a key a case declared as required
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| Error::MissingPrecondition(key.to_string()))
    }

    /// Replace every `{key}` occurrence in a template string
    pub fn interpolate(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            match rest[start..].find('}') {
                Some(end) => {
                    let key = &rest[start + 1..start + end];
                    out.push_str(&self.value_as_string(key));
                    rest = &rest[start + end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    return out;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Interpolate placeholders inside a JSON value
    ///
    /// A string that is exactly `{key}` for a stored key is replaced by
    /// the stored value with its type preserved; other strings get plain
    /// text interpolation.
    pub fn interpolate_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => {
                if let Some(key) = s.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
                    if !key.contains('{') {
                        if let Some(stored) = self.values.get(key) {
                            return stored.clone();
                        }
                    }
                }
                Value::String(self.interpolate(s))
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.interpolate_value(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.interpolate_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Resolve a request spec against this context and a base URL
    pub fn resolve(&self, spec: &RequestSpec, base_url: &str) -> ResolvedRequest {
        let path = self.interpolate(&spec.path);
        ResolvedRequest {
            method: spec.method,
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
            query: spec
                .query
                .iter()
                .map(|(k, v)| (k.clone(), self.interpolate(v)))
                .collect(),
            body: spec.body.as_ref().map(|b| self.interpolate_value(b)),
        }
    }

    fn value_as_string(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
            // No prior extraction stored this key; IDs default to 0 so
            // the request is still made and the API's answer observed.
            None => "0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolates_stored_id_into_path() {
        let mut ctx = GroupContext::new();
        ctx.set("animeId", json!(52991));
        assert_eq!(
            ctx.interpolate("/anime/{animeId}/my_list_status"),
            "/anime/52991/my_list_status"
        );
    }

    #[test]
    fn missing_key_interpolates_as_zero() {
        let ctx = GroupContext::new();
        assert_eq!(ctx.interpolate("/anime/{animeId}"), "/anime/0");
    }

    #[test]
    fn require_fails_for_absent_key() {
        let ctx = GroupContext::new();
        let err = ctx.require("mangaId").unwrap_err();
        assert!(matches!(err, Error::MissingPrecondition(_)));
    }

    #[test]
    fn whole_string_placeholder_preserves_value_type() {
        let mut ctx = GroupContext::new();
        ctx.set("animeId", json!(7));
        let resolved = ctx.interpolate_value(&json!(["{animeId}"]));
        assert_eq!(resolved, json!([7]));
    }

    #[test]
    fn embedded_placeholder_interpolates_as_text() {
        let mut ctx = GroupContext::new();
        ctx.set("animeId", json!(7));
        let resolved = ctx.interpolate_value(&json!({"note": "id is {animeId}"}));
        assert_eq!(resolved, json!({"note": "id is 7"}));
    }

    #[test]
    fn resolve_joins_base_url_and_query() {
        let mut ctx = GroupContext::new();
        ctx.set("animeId", json!(30));
        let spec = RequestSpec::get("/anime/{animeId}").query("fields", "id,title");
        let resolved = ctx.resolve(&spec, "https://api.example.net/v2/");
        assert_eq!(resolved.url, "https://api.example.net/v2/anime/30");
        assert_eq!(resolved.query, vec![("fields".to_string(), "id,title".to_string())]);
    }

    #[test]
    fn group_parses_from_yaml() {
        let yaml = r#"
name: smoke
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
  - name: add
    requires: [animeId]
    request:
      method: PUT
      path: /anime/{animeId}/my_list_status
      body:
        status: watching
"#;
        let group: ScenarioGroup = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(group.cases.len(), 2);
        assert_eq!(group.cases[0].extract.as_ref().unwrap().store, "animeId");
        assert_eq!(group.cases[1].requires, vec!["animeId"]);
    }
}
