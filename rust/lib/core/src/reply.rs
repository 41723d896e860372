use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ServiceError;

/// Success envelope: `{"error": false, "message": "...", ...data}`.
///
/// Payload fields are flattened into the top-level object next to
/// `error` and `message`.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    message: String,
    data: Map<String, Value>,
}

impl Reply {
    /// 200 reply with a message and no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Map::new(),
        }
    }

    /// 201 reply.
    pub fn created(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message)
        }
    }

    /// Attach a payload field.
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, ServiceError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ServiceError::Internal(format!("serialize {}: {}", key, e)))?;
        self.data.insert(key.to_string(), value);
        Ok(self)
    }

    /// Render the envelope as a JSON value.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("error".into(), Value::Bool(false));
        body.insert("message".into(), Value::String(self.message.clone()));
        for (k, v) in &self.data {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_flattens_payload() {
        let reply = Reply::ok("Friend added")
            .with("likes", 3)
            .unwrap()
            .with("tags", vec!["a", "b"])
            .unwrap();
        let json = reply.to_json();
        assert_eq!(json["error"], false);
        assert_eq!(json["message"], "Friend added");
        assert_eq!(json["likes"], 3);
        assert_eq!(json["tags"][1], "b");
    }

    #[test]
    fn created_status() {
        assert_eq!(Reply::created("x").into_response().status(), StatusCode::CREATED);
        assert_eq!(Reply::ok("x").into_response().status(), StatusCode::OK);
    }
}
