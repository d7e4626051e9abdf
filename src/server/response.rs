use crate::error::{ErrorInfo, HandlerError};
use serde_json::Value;

pub const APPLICATION_JSON: &str = "application/json";

/// Final reply for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Content type; `may_minihttp` only takes static header lines.
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, APPLICATION_JSON, body.to_string())
    }

    /// Body parsed back as JSON, `Value::Null` when it is not JSON.
    #[must_use]
    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    #[must_use]
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// Turns results and errors into responses.
///
/// Every method has a default, so a custom replier only overrides what it
/// needs, typically [`Replier::error`] to add its own status table.
pub trait Replier: Send + Sync + 'static {
    /// Success with a JSON body.
    fn reply(&self, code: u16, data: &Value) -> Response {
        Response::json(code, data)
    }

    /// Success without a typed result: an explicit empty object.
    fn reply_with_code(&self, code: u16) -> Response {
        Response::new(code, APPLICATION_JSON, b"{}".to_vec())
    }

    fn error(&self, err: &HandlerError) -> Response {
        error_response(&err.to_info())
    }
}

/// Default replier: JSON bodies and the fixed error table.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReplier;

impl Replier for JsonReplier {}

/// `{"error": .., "key"?: .., "errno"?: ..}` with the info's status.
#[must_use]
pub fn error_response(info: &ErrorInfo) -> Response {
    let body = serde_json::to_vec(info).unwrap_or_else(|_| b"{}".to_vec());
    Response::new(info.code, APPLICATION_JSON, body)
}

pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Copy a [`Response`] onto the transport's response.
pub fn write_response(res: &mut may_minihttp::Response, response: Response) {
    res.status_code(response.status as usize, status_reason(response.status));
    res.header(content_type_header(response.content_type));
    res.body_vec(response.body);
}

fn content_type_header(content_type: &'static str) -> &'static str {
    match content_type {
        APPLICATION_JSON => "Content-Type: application/json",
        "text/plain" => "Content-Type: text/plain",
        "text/html" => "Content-Type: text/html",
        _ => "Content-Type: application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(409), "Conflict");
    }

    #[test]
    fn test_empty_success_envelope() {
        let res = JsonReplier.reply_with_code(200);
        assert_eq!(res.body, b"{}");
        assert_eq!(res.content_length(), 2);
        assert_eq!(res.content_type, APPLICATION_JSON);
    }

    #[test]
    fn test_default_error_mapping() {
        let res = JsonReplier.error(&HandlerError::NotFound);
        assert_eq!(res.status, 404);
        assert_eq!(res.json_body(), serde_json::json!({"error": "entry not found"}));

        let res = JsonReplier.error(&HandlerError::status(404, "id not found"));
        assert_eq!(res.status, 404);
        assert_eq!(res.json_body(), serde_json::json!({"error": "id not found"}));
    }
}
