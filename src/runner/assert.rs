//! Response assertions
//!
//! Each case carries an ordered list of assertions evaluated against the
//! response. Failures identify the assertion and the expected vs. actual
//! value. The JSON path grammar covers dotted keys, `[n]` indices, and
//! the `[*]` wildcard (`data[0].node.id`, `data[*].node.id`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ApiResponse;
use crate::common::{Error, Result};

/// One check against a response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Assertion {
    /// Exact status code match
    Status { equals: u16 },
    /// Deep-subset structural match against the body (or the value at
    /// `path`): objects match if every expected key matches, arrays if
    /// every expected element matches some actual element.
    JsonLike {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        value: Value,
    },
    /// Negation of [`Assertion::JsonLike`]
    JsonNotLike {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        value: Value,
    },
    /// Structural conformance: `type`, `properties`, `required`, `items`,
    /// and `enum` keywords
    JsonSchema { schema: Value },
    /// Substring check on the raw body text
    BodyContains { value: String },
    /// The body must be empty (or whitespace only)
    BodyEmpty,
}

impl Assertion {
    pub fn status(code: u16) -> Self {
        Self::Status { equals: code }
    }

    pub fn json_like(value: Value) -> Self {
        Self::JsonLike { path: None, value }
    }

    pub fn json_like_at(path: impl Into<String>, value: Value) -> Self {
        Self::JsonLike {
            path: Some(path.into()),
            value,
        }
    }

    pub fn json_not_like_at(path: impl Into<String>, value: Value) -> Self {
        Self::JsonNotLike {
            path: Some(path.into()),
            value,
        }
    }

    pub fn schema(schema: Value) -> Self {
        Self::JsonSchema { schema }
    }

    pub fn body_contains(value: impl Into<String>) -> Self {
        Self::BodyContains {
            value: value.into(),
        }
    }

    /// Evaluate this assertion against a response
    pub fn evaluate(&self, response: &ApiResponse) -> Result<()> {
        match self {
            Assertion::Status { equals } => {
                if response.status != *equals {
                    return Err(Error::assertion_mismatch(
                        "status code",
                        equals,
                        response.status,
                    ));
                }
                Ok(())
            }
            Assertion::JsonLike { path, value } => {
                let target = body_at(response, path.as_deref())?;
                json_like(value, &target, "$").map_err(Error::Assertion)
            }
            Assertion::JsonNotLike { path, value } => {
                let target = body_at(response, path.as_deref())?;
                match json_like(value, &target, "$") {
                    Ok(()) => Err(Error::Assertion(format!(
                        "expected {} not to match {}",
                        path.as_deref().unwrap_or("body"),
                        value
                    ))),
                    Err(_) => Ok(()),
                }
            }
            Assertion::JsonSchema { schema } => {
                let body = response.json()?;
                check_schema(schema, &body, "$").map_err(Error::Assertion)
            }
            Assertion::BodyContains { value } => {
                let text = response.text();
                if !text.contains(value.as_str()) {
                    return Err(Error::Assertion(format!(
                        "body does not contain '{}'",
                        value
                    )));
                }
                Ok(())
            }
            Assertion::BodyEmpty => {
                if !response.text().trim().is_empty() {
                    return Err(Error::Assertion(format!(
                        "expected empty body, got {} bytes",
                        response.body.len()
                    )));
                }
                Ok(())
            }
        }
    }
}

fn body_at(response: &ApiResponse, path: Option<&str>) -> Result<Value> {
    let body = response.json()?;
    match path {
        Some(p) => resolve_path(&body, p),
        None => Ok(body),
    }
}

/// One step of a parsed JSON path
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
    Wildcard,
}

fn parse_path(path: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            return Err(Error::path_resolution(path, "empty path segment"));
        }
        let mut rest = part;
        if let Some(bracket) = rest.find('[') {
            if bracket > 0 {
                segments.push(Segment::Key(rest[..bracket].to_string()));
            }
            rest = &rest[bracket..];
            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| Error::path_resolution(path, "unclosed '['"))?;
                let inner = &rest[1..close];
                if inner == "*" {
                    segments.push(Segment::Wildcard);
                } else {
                    let index = inner.parse::<usize>().map_err(|_| {
                        Error::path_resolution(path, format!("invalid index '{inner}'"))
                    })?;
                    segments.push(Segment::Index(index));
                }
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(Error::path_resolution(path, "text after ']'"));
                }
            }
        } else {
            segments.push(Segment::Key(rest.to_string()));
        }
    }
    Ok(segments)
}

/// Resolve a JSON path against a value
///
/// Without a wildcard the single addressed value is returned; with one
/// or more `[*]` segments the matches are returned as an array.
pub fn resolve_path(root: &Value, path: &str) -> Result<Value> {
    let segments = parse_path(path)?;
    let fanned_out = segments.contains(&Segment::Wildcard);

    let mut current: Vec<&Value> = vec![root];
    for segment in &segments {
        let mut next = Vec::new();
        for value in current {
            match segment {
                Segment::Key(key) => match value.get(key.as_str()) {
                    Some(v) => next.push(v),
                    None => {
                        return Err(Error::path_resolution(
                            path,
                            format!("key '{key}' not found"),
                        ))
                    }
                },
                Segment::Index(i) => match value.get(*i) {
                    Some(v) => next.push(v),
                    None => {
                        return Err(Error::path_resolution(
                            path,
                            format!("index {i} out of bounds"),
                        ))
                    }
                },
                Segment::Wildcard => match value.as_array() {
                    Some(items) => next.extend(items.iter()),
                    None => {
                        return Err(Error::path_resolution(path, "'[*]' applied to non-array"))
                    }
                },
            }
        }
        current = next;
    }

    if fanned_out {
        Ok(Value::Array(current.into_iter().cloned().collect()))
    } else {
        current
            .into_iter()
            .next()
            .cloned()
            .ok_or_else(|| Error::path_resolution(path, "no value at path"))
    }
}

/// Deep-subset match of `expected` against `actual`
///
/// `loc` tracks the position inside `expected` for mismatch messages.
fn json_like(expected: &Value, actual: &Value, loc: &str) -> std::result::Result<(), String> {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_val) in exp {
                match act.get(key) {
                    Some(act_val) => json_like(exp_val, act_val, &format!("{loc}.{key}"))?,
                    None => return Err(format!("{loc}: missing key '{key}'")),
                }
            }
            Ok(())
        }
        (Value::Array(exp), Value::Array(act)) => {
            for (i, exp_val) in exp.iter().enumerate() {
                let matched = act
                    .iter()
                    .any(|act_val| json_like(exp_val, act_val, loc).is_ok());
                if !matched {
                    return Err(format!(
                        "{loc}[{i}]: no element matching {exp_val} in array of {} element(s)",
                        act.len()
                    ));
                }
            }
            Ok(())
        }
        (exp, act) => {
            if exp == act {
                Ok(())
            } else {
                Err(format!("{loc}: expected {exp}, got {act}"))
            }
        }
    }
}

/// Structural schema conformance check
fn check_schema(schema: &Value, actual: &Value, loc: &str) -> std::result::Result<(), String> {
    if let Some(ty) = schema.get("type").and_then(Value::as_str) {
        let ok = match ty {
            "object" => actual.is_object(),
            "array" => actual.is_array(),
            "string" => actual.is_string(),
            "integer" => actual.as_number().is_some_and(|n| n.is_i64() || n.is_u64()),
            "number" => actual.is_number(),
            "boolean" => actual.is_boolean(),
            "null" => actual.is_null(),
            other => return Err(format!("{loc}: unsupported schema type '{other}'")),
        };
        if !ok {
            return Err(format!("{loc}: expected type {ty}, got {}", kind(actual)));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(actual) {
            return Err(format!("{loc}: {actual} is not one of {allowed:?}"));
        }
    }

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        let obj = actual
            .as_object()
            .ok_or_else(|| format!("{loc}: expected object, got {}", kind(actual)))?;
        for key in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(key) {
                return Err(format!("{loc}: missing required key '{key}'"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        if let Some(obj) = actual.as_object() {
            for (key, subschema) in properties {
                if let Some(value) = obj.get(key) {
                    check_schema(subschema, value, &format!("{loc}.{key}"))?;
                }
            }
        }
    }

    if let Some(items) = schema.get("items") {
        if let Some(array) = actual.as_array() {
            for (i, value) in array.iter().enumerate() {
                check_schema(items, value, &format!("{loc}[{i}]"))?;
            }
        }
    }

    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
