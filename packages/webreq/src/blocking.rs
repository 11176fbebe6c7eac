//! Blocking execution on the shared blocking client.
//!
//! Must not be called from inside an async runtime thread; use
//! `tokio::task::spawn_blocking` there, or the async
//! [`Request::execute`] instead.

use std::io::Read;
use std::time::Instant;

use tracing::debug;

use crate::client;
use crate::error::Error;
use crate::request::Request;

impl Request {
    /// Execute and block until the body is read.
    ///
    /// [`Request::timeout`] bounds the whole call. The body is read through
    /// a reader limited to [`Request::max_response_size`].
    pub fn execute_blocking(&mut self) -> Result<Vec<u8>, Error> {
        let client = client::shared_blocking()?;

        let url = self.outbound_url()?;
        let method = self.outbound_method()?;
        let headers = self.outbound_headers()?;

        let mut req_builder = client.request(method, url).headers(headers);
        // an unrepresentable deadline means no deadline
        if Instant::now().checked_add(self.timeout()).is_some() {
            req_builder = req_builder.timeout(self.timeout());
        }
        if let Some(body) = self.outbound_body() {
            req_builder = req_builder.body(body);
        }

        debug!(method = %self.method(), url = %self.url(), "sending blocking request");
        let response = req_builder.send()?;

        let status = response.status().as_u16();
        self.record_status(status);
        debug!(status, "response received");

        let mut body = Vec::new();
        response
            .take(self.max_response_size())
            .read_to_end(&mut body)?;
        Ok(body)
    }
}
