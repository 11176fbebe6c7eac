use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::error::{Error, ValidationError};
use crate::types::{method, HeaderSet};

/// Timeout applied by [`Request::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response cap applied by [`Request::new`] (100 MiB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 100 * 1024 * 1024;

/// A single HTTP request, built with chained setters and then executed.
///
/// Setters never fail. A rejected value leaves the previous one in place and
/// records a [`ValidationError`], readable through [`Request::error_message`].
/// Execution failures are returned from `execute` instead.
///
/// ```ignore
/// let mut request = Request::new(method::POST);
/// request
///     .set_url("https://api.example.com/users")
///     .set_headers(HeaderSet::new().with("Content-Type", "application/json"))
///     .set_data(r#"{"name":"tonny"}"#)
///     .set_timeout(5);
///
/// let body = request.execute().await?;
/// assert_eq!(request.status_code(), 201);
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    url: String,
    method: String,
    timeout: Duration,
    headers: Option<HeaderSet>,
    body: Option<Bytes>,
    max_response_size: u64,
    status_code: u16,
    last_error: Option<ValidationError>,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            url: String::new(),
            method: method.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: None,
            body: None,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            status_code: 0,
            last_error: None,
        }
    }

    pub fn get() -> Self {
        Self::new(method::GET)
    }

    pub fn post() -> Self {
        Self::new(method::POST)
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        let url = url.into();
        if url.is_empty() {
            self.last_error = Some(ValidationError::EmptyUrl);
        } else {
            self.url = url;
        }
        self
    }

    /// Set the execution deadline in whole seconds. Values `<= 0` are ignored.
    pub fn set_timeout(&mut self, seconds: i64) -> &mut Self {
        if seconds > 0 {
            self.timeout = Duration::from_secs(seconds.unsigned_abs());
        }
        self
    }

    /// Cap the number of response bytes read. Values `<= 0` are ignored.
    ///
    /// Bytes past the cap are dropped without an error; compare the returned
    /// length against [`Request::max_response_size`] to detect truncation.
    pub fn set_max_response_size(&mut self, bytes: i64) -> &mut Self {
        if bytes > 0 {
            self.max_response_size = bytes.unsigned_abs();
        }
        self
    }

    /// Replace the header set. An empty set is rejected and the current
    /// headers are kept.
    pub fn set_headers(&mut self, headers: impl Into<HeaderSet>) -> &mut Self {
        let headers = headers.into();
        if headers.is_empty() {
            self.last_error = Some(ValidationError::EmptyHeaders);
        } else {
            self.headers = Some(headers);
        }
        self
    }

    /// Set the request body. An empty payload is rejected and the current
    /// body is kept.
    pub fn set_data(&mut self, data: impl Into<Bytes>) -> &mut Self {
        let data = data.into();
        if data.is_empty() {
            self.last_error = Some(ValidationError::EmptyBody);
        } else {
            self.body = Some(data);
        }
        self
    }

    /// Serialize `value` as JSON and set it as the body.
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self, Error> {
        let data = serde_json::to_vec(value)?;
        Ok(self.set_data(data))
    }

    pub fn set_method(&mut self, method: impl Into<String>) -> &mut Self {
        let method = method.into();
        if method.is_empty() {
            self.last_error = Some(ValidationError::EmptyMethod);
        } else {
            self.method = method;
        }
        self
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        if code > 0 {
            self.status_code = code;
        } else {
            self.last_error = Some(ValidationError::EmptyStatusCode);
        }
        self
    }

    /// Record a validation error if the URL or method is missing.
    ///
    /// An earlier error is never cleared.
    pub fn check(&mut self) -> &mut Self {
        if self.url.is_empty() {
            self.last_error = Some(ValidationError::EmptyUrl);
        }
        if self.method.is_empty() {
            self.last_error = Some(ValidationError::EmptyMethod);
        }
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> Option<&HeaderSet> {
        self.headers.as_ref()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn max_response_size(&self) -> u64 {
        self.max_response_size
    }

    /// Status of the last response, or 0 before one has arrived.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn last_error(&self) -> Option<ValidationError> {
        self.last_error
    }

    /// The last validation error as text, empty if there was none.
    pub fn error_message(&self) -> String {
        self.last_error
            .map(|e| e.to_string())
            .unwrap_or_default()
    }

    pub(crate) fn outbound_method(&self) -> Result<http::Method, Error> {
        http::Method::from_bytes(self.method.as_bytes()).map_err(|_| Error::InvalidMethod {
            method: self.method.clone(),
        })
    }

    pub(crate) fn outbound_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.url)?)
    }

    pub(crate) fn outbound_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers.iter().flatten() {
            let header_name = HeaderName::try_from(name.as_str())?;
            let header_value = HeaderValue::try_from(value.as_str())?;
            headers.append(header_name, header_value);
        }
        Ok(headers)
    }

    /// The body to send, if any. Cloning is a reference count bump.
    pub(crate) fn outbound_body(&self) -> Option<Bytes> {
        self.body.clone()
    }

    pub(crate) fn record_status(&mut self, status: u16) {
        self.set_status_code(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn new_request_defaults() {
        let request = Request::new("PUT");
        assert_eq!(request.method(), "PUT");
        assert_eq!(request.timeout(), Duration::from_secs(10));
        assert_eq!(request.max_response_size(), 104_857_600);
        assert_eq!(request.status_code(), 0);
        assert_eq!(request.url(), "");
        assert!(request.headers().is_none());
        assert!(request.body().is_none());
        assert_eq!(request.error_message(), "");
    }

    #[test]
    fn get_and_post_constructors() {
        assert_eq!(Request::get().method(), "GET");
        assert_eq!(Request::post().method(), "POST");
    }

    #[test]
    fn empty_url_records_error_and_keeps_previous() {
        let mut request = Request::get();
        request.set_url("https://example.com").set_url("");
        assert_eq!(request.error_message(), "url is empty");
        assert_eq!(request.url(), "https://example.com");
    }

    #[test]
    fn timeout_ignores_non_positive() {
        let mut request = Request::get();
        request.set_timeout(3);
        request.set_timeout(0);
        request.set_timeout(-5);
        assert_eq!(request.timeout(), Duration::from_secs(3));
        assert_eq!(request.error_message(), "");
    }

    #[test]
    fn max_response_size_ignores_non_positive() {
        let mut request = Request::get();
        request.set_max_response_size(0).set_max_response_size(-1000);
        assert_eq!(request.max_response_size(), DEFAULT_MAX_RESPONSE_SIZE);

        request.set_max_response_size(1024);
        assert_eq!(request.max_response_size(), 1024);
    }

    #[test]
    fn empty_headers_record_error_and_keep_previous() {
        let mut request = Request::get();
        request.set_headers(HeaderSet::new().with("X-Test", "1"));
        request.set_headers(HashMap::<String, String>::new());

        assert_eq!(request.error_message(), "headers are empty");
        assert_eq!(request.headers().unwrap().get("X-Test"), Some("1"));
    }

    #[test]
    fn headers_from_map_with_only_empty_entries_are_rejected() {
        let mut map = HashMap::new();
        map.insert("X-Blank".to_string(), String::new());

        let mut request = Request::get();
        request.set_headers(map);
        assert_eq!(request.last_error(), Some(ValidationError::EmptyHeaders));
        assert!(request.headers().is_none());
    }

    #[test]
    fn empty_body_records_error_and_keeps_previous() {
        let mut request = Request::post();
        request.set_data("payload").set_data(Vec::<u8>::new());
        assert_eq!(request.error_message(), "body is empty");
        assert_eq!(request.body(), Some(&b"payload"[..]));
    }

    #[test]
    fn empty_method_records_error_and_keeps_previous() {
        let mut request = Request::post();
        request.set_method("");
        assert_eq!(request.error_message(), "request method is empty");
        assert_eq!(request.method(), "POST");

        request.set_method("DELETE");
        assert_eq!(request.method(), "DELETE");
    }

    #[test]
    fn zero_status_code_records_error() {
        let mut request = Request::get();
        request.set_status_code(204);
        request.set_status_code(0);
        assert_eq!(request.status_code(), 204);
        assert_eq!(request.error_message(), "status code is empty");
    }

    #[test]
    fn check_reports_missing_fields() {
        let mut request = Request::new("");
        request.check();
        // method is checked last
        assert_eq!(request.last_error(), Some(ValidationError::EmptyMethod));

        let mut request = Request::get();
        request.check();
        assert_eq!(request.error_message(), "url is empty");
    }

    #[test]
    fn check_does_not_clear_earlier_error() {
        let mut request = Request::get();
        request.set_data(Vec::<u8>::new());
        request.set_url("https://example.com").check();
        assert_eq!(request.error_message(), "body is empty");
    }

    #[test]
    fn set_json_serializes_body() {
        #[derive(Serialize)]
        struct Payload {
            name: &'static str,
        }

        let mut request = Request::post();
        request.set_json(&Payload { name: "tonny" }).unwrap();
        assert_eq!(request.body(), Some(&br#"{"name":"tonny"}"#[..]));
    }

    #[test]
    fn outbound_rejects_bad_method_and_url() {
        let mut request = Request::new("BAD METHOD");
        assert!(matches!(
            request.outbound_method(),
            Err(Error::InvalidMethod { .. })
        ));

        request.set_url("not a url");
        assert!(matches!(request.outbound_url(), Err(Error::UrlParse(_))));
    }

    #[test]
    fn outbound_headers_rejects_invalid_name() {
        let mut request = Request::get();
        request.set_headers(HeaderSet::new().with("Bad Header", "x"));
        assert!(matches!(
            request.outbound_headers(),
            Err(Error::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn outbound_headers_keep_case_variant_entries() {
        let mut request = Request::get();
        request.set_headers(HeaderSet::new().with("X-Dup", "a").with("x-dup", "b"));

        let headers = request.outbound_headers().unwrap();
        let mut values: Vec<_> = headers
            .get_all("x-dup")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        values.sort_unstable();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn outbound_method_is_case_sensitive() {
        let request = Request::new("get");
        assert_eq!(request.outbound_method().unwrap().as_str(), "get");
    }
}
