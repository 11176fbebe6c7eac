//! Async execution of a [`Request`] on the shared client.

use tracing::{debug, trace, warn};

use crate::client;
use crate::error::Error;
use crate::request::Request;
use crate::scope::Scope;

impl Request {
    /// Execute with a deadline of [`Request::timeout`] from now.
    ///
    /// Returns the response body, truncated to
    /// [`Request::max_response_size`]. The status code is recorded on the
    /// request as soon as the response head arrives.
    pub async fn execute(&mut self) -> Result<Vec<u8>, Error> {
        let scope = Scope::background().with_timeout(self.timeout());
        self.execute_with_scope(&scope).await
    }

    /// Execute within a caller-supplied scope.
    ///
    /// The request's own timeout is not applied; the scope alone bounds the
    /// call. Cancelling the scope aborts in-flight I/O and returns
    /// [`Error::Cancelled`]; an expired deadline returns
    /// [`Error::DeadlineExceeded`].
    pub async fn execute_with_scope(&mut self, scope: &Scope) -> Result<Vec<u8>, Error> {
        scope.check()?;
        let client = client::shared()?;

        let outcome = tokio::select! {
            biased;
            end = scope.done() => Err(Error::from(end)),
            result = self.send(client) => result,
        };

        if let Err(Error::Cancelled | Error::DeadlineExceeded) = &outcome {
            warn!(method = %self.method(), url = %self.url(), "request aborted by scope");
        }
        outcome
    }

    async fn send(&mut self, client: &reqwest::Client) -> Result<Vec<u8>, Error> {
        let url = self.outbound_url()?;
        let method = self.outbound_method()?;
        let headers = self.outbound_headers()?;

        let mut req_builder = client.request(method, url).headers(headers);
        if let Some(body) = self.outbound_body() {
            req_builder = req_builder.body(body);
        }

        debug!(method = %self.method(), url = %self.url(), "sending request");
        let response = req_builder.send().await?;

        let status = response.status().as_u16();
        self.record_status(status);
        debug!(status, "response received");

        read_limited(response, self.max_response_size()).await
    }
}

/// Read at most `limit` bytes of the body. The rest is never read, and the
/// response is released when this returns on any path.
async fn read_limited(mut response: reqwest::Response, limit: u64) -> Result<Vec<u8>, Error> {
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let capacity = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .map_or(0, |len| len.min(limit));

    let mut body = Vec::with_capacity(capacity);
    while body.len() < limit {
        let Some(chunk) = response.chunk().await? else {
            break;
        };
        let room = limit - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            trace!(limit, "response truncated at size cap");
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
