use http::{Method, StatusCode, header};
use log::debug;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::website::WebsiteChecker;
use crate::{ErrorKind, Result};

/// What a single request found out about a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Probe {
    pub(crate) status: StatusCode,
    /// Raw `Location` header, only meaningful for redirects
    pub(crate) location: Option<String>,
}

impl From<&reqwest::Response> for Probe {
    fn from(response: &reqwest::Response) -> Self {
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        Self {
            status: response.status(),
            location,
        }
    }
}

impl WebsiteChecker {
    /// Perform one request against `url`.
    ///
    /// A cheap `HEAD` request goes first. Servers that reject it with
    /// `405 Method Not Allowed` or `501 Not Implemented` get a second chance
    /// with `GET`; the body of that response is drained up to `body_limit`
    /// bytes so the connection can be reused.
    pub(crate) async fn probe(&self, url: &Url, token: &CancellationToken) -> Result<Probe> {
        let response = self
            .send(self.reqwest_client.request(Method::HEAD, url.clone()), token)
            .await?;

        let status = response.status();
        if status != StatusCode::METHOD_NOT_ALLOWED && status != StatusCode::NOT_IMPLEMENTED {
            return Ok(Probe::from(&response));
        }

        debug!("{url} rejected HEAD with {status}, retrying with GET");
        let response = self
            .send(self.reqwest_client.request(Method::GET, url.clone()), token)
            .await?;
        let probe = Probe::from(&response);
        self.drain(response, token).await?;
        Ok(probe)
    }

    /// Send a request, abandoning it as soon as `token` is cancelled.
    pub(super) async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: &CancellationToken,
    ) -> Result<reqwest::Response> {
        tokio::select! {
            biased;
            () = token.cancelled() => Err(ErrorKind::Cancelled),
            response = request.send() => response.map_err(ErrorKind::NetworkRequest),
        }
    }

    /// Read and discard up to `body_limit` bytes of the response body.
    ///
    /// Read errors are ignored since the status is already known, but a
    /// cancelled token still fails the request.
    pub(super) async fn drain(
        &self,
        mut response: reqwest::Response,
        token: &CancellationToken,
    ) -> Result<()> {
        let mut read = 0;
        while read < self.body_limit {
            let chunk = tokio::select! {
                biased;
                () = token.cancelled() => return Err(ErrorKind::Cancelled),
                chunk = response.chunk() => chunk,
            };
            match chunk {
                Ok(Some(bytes)) => read += bytes.len(),
                Ok(None) | Err(_) => return Ok(()),
            }
        }
        Ok(())
    }
}
