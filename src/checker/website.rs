use http::StatusCode;
use log::debug;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{ErrorKind, Options, Outcome, Result, retry::RetryExt, retry::backoff};

/// Verifies single website URLs.
///
/// One instance is cloned into every worker; clones share the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub(crate) struct WebsiteChecker {
    /// Shared, pooled HTTP client with automatic redirects disabled
    pub(super) reqwest_client: reqwest::Client,
    /// Maximum number of retries for transient failures
    pub(super) max_retries: u64,
    /// Maximum number of redirects followed per URL
    pub(super) max_redirects: usize,
    /// Bytes of body drained after a `GET` fallback
    pub(super) body_limit: usize,
}

impl WebsiteChecker {
    pub(crate) fn new(reqwest_client: reqwest::Client, options: &Options) -> Self {
        Self {
            reqwest_client,
            max_retries: options.max_retries,
            max_redirects: options.max_redirects,
            body_limit: options.body_limit,
        }
    }

    /// Verify `url` as written in a document.
    ///
    /// Only `http` and `https` URLs are checked; anything else is reported
    /// as `Dead` without touching the network.
    pub(crate) async fn check(&self, url: &str, token: &CancellationToken) -> Outcome {
        match parse_website_url(url) {
            Ok(url) => self.retry_check(&url, token).await,
            Err(e) => e.into(),
        }
    }

    /// Retry the full verification of `url` up to `max_retries` times with an
    /// exponential backoff, as long as the outcome looks transient.
    pub(crate) async fn retry_check(&self, url: &Url, token: &CancellationToken) -> Outcome {
        let mut retries: u64 = 0;

        let mut outcome = self.check_once(url, token).await;
        while retries < self.max_retries && outcome.should_retry() {
            if token.is_cancelled() {
                return ErrorKind::Cancelled.into();
            }
            retries += 1;
            let wait = backoff(retries);
            debug!(
                "Retrying {url} in {wait:?} (retry {retries}/{}): {outcome}",
                self.max_retries
            );
            tokio::select! {
                () = token.cancelled() => return ErrorKind::Cancelled.into(),
                () = tokio::time::sleep(wait) => {}
            }
            outcome = self.check_once(url, token).await;
        }

        if retries > 0 && outcome.should_retry() {
            outcome.annotate_retries(retries)
        } else {
            outcome
        }
    }

    /// One verification attempt: probe, then classify the status, following
    /// redirects and trying the bot bypass where needed.
    pub(crate) async fn check_once(&self, url: &Url, token: &CancellationToken) -> Outcome {
        let probe = match self.probe(url, token).await {
            Ok(probe) => probe,
            Err(e) => return e.into(),
        };

        let status = probe.status;
        if status.is_success() {
            Outcome::Alive(status)
        } else if status.is_redirection() {
            self.follow_redirects(url, probe, token).await
        } else if status == StatusCode::FORBIDDEN {
            self.check_forbidden(url, token).await
        } else {
            Outcome::dead(status)
        }
    }
}

/// Parse the URL of an occurrence and make sure it can be checked over HTTP.
fn parse_website_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| ErrorKind::InvalidUrl(url.to_string(), e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ErrorKind::UnsupportedScheme(scheme.to_string())),
    }
}
