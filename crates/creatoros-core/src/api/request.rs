use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ApiError;

/// Method, headers and body for a gateway call.
///
/// The body is kept as bytes so the same request can be sent again after a
/// credential refresh.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON and set `Content-Type: application/json`
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode JSON body: {}", e)))?;
        Ok(self
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(bytes))
    }
}

/// A fully resolved request as handed to a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Buffered HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Response with a JSON body and no other headers
    pub fn json_body(status: StatusCode, body: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(status, headers, body.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }

    /// Convert a non-2xx response into the matching `ApiError`
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_content_type() {
        let options = RequestOptions::post()
            .json(&serde_json::json!({"name": "Launch"}))
            .unwrap();
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.headers[CONTENT_TYPE], "application/json");
        assert_eq!(options.body.as_deref(), Some(br#"{"name":"Launch"}"#.as_slice()));
    }

    #[test]
    fn test_default_is_get_without_body() {
        let options = RequestOptions::get();
        assert_eq!(options.method, Method::GET);
        assert!(options.body.is_none());
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_response_json_and_errors() {
        let ok = ApiResponse::json_body(StatusCode::OK, &serde_json::json!({"workspaces": []}));
        let value: serde_json::Value = ok.json().unwrap();
        assert_eq!(value["workspaces"], serde_json::json!([]));
        assert!(ok.error_for_status().is_ok());

        let malformed = ApiResponse::new(StatusCode::OK, HeaderMap::new(), "<html>");
        assert!(matches!(
            malformed.json::<serde_json::Value>(),
            Err(ApiError::InvalidResponse(_))
        ));

        let missing = ApiResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), "Video not found");
        assert!(matches!(missing.error_for_status(), Err(ApiError::NotFound(b)) if b == "Video not found"));
    }
}
