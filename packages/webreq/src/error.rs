/// Failures returned from executing a request.
///
/// These are never recorded on the [`Request`](crate::Request) itself; the
/// caller receives them directly from `execute`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the body of a blocking response failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The execution scope was cancelled before the response was read.
    #[error("request cancelled")]
    Cancelled,

    /// The execution scope's deadline passed before the response was read.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// `client::configure` was called after the shared client config was fixed.
    #[error("shared client is already initialized")]
    ClientAlreadyInitialized,
}

impl Error {
    /// True when the request was stopped by its scope (cancel or deadline)
    /// or by the transport's own timeout.
    pub fn is_timeout_or_cancel(&self) -> bool {
        match self {
            Error::Cancelled | Error::DeadlineExceeded => true,
            Error::Http(e) => e.is_timeout(),
            Error::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

/// Validation faults recorded by the request setters.
///
/// The `Display` text is what [`Request::error_message`](crate::Request::error_message)
/// reports.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("url is empty")]
    EmptyUrl,

    #[error("headers are empty")]
    EmptyHeaders,

    #[error("body is empty")]
    EmptyBody,

    #[error("request method is empty")]
    EmptyMethod,

    #[error("status code is empty")]
    EmptyStatusCode,
}
