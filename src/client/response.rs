//! API responses as seen by the assertion engine

use serde_json::Value;

use crate::common::{Error, Result};

/// Status code plus raw body of one completed request
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as lossy UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_parses_body() {
        let resp = ApiResponse::new(200, r#"{"id": 7}"#);
        assert_eq!(resp.json().unwrap(), json!({"id": 7}));
    }

    #[test]
    fn json_fails_on_non_json_body() {
        let resp = ApiResponse::new(200, "not json");
        assert!(resp.json().is_err());
    }
}
