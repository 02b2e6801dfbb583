//! Verification of website links.
//!
//! [`Checker`] is the entry point: it owns one pooled HTTP client and checks
//! whole batches of [`LinkOccurrence`]s with bounded parallelism. Every URL
//! goes through the same pipeline: a retry loop around a single attempt,
//! which probes the URL, follows redirects by hand and works around bot
//! detection for `403` answers.

mod bypass;
mod probe;
mod redirect;
mod website;

pub(crate) use website::WebsiteChecker;

use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::{CheckResult, LinkOccurrence, Options, Outcome, Result, client::build_client, pool};

/// Checks batches of link occurrences.
///
/// A `Checker` is cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Checker {
    website: WebsiteChecker,
    concurrency: usize,
}

impl Checker {
    /// Create a checker from `options`.
    ///
    /// Invalid option values are replaced with their defaults, see
    /// [`Options::validated`].
    ///
    /// # Errors
    ///
    /// Fails if the user agent is not a valid header value or if the HTTP
    /// client cannot be created (e.g. the TLS backend fails to initialize).
    pub fn new(options: Options) -> Result<Self> {
        let options = options.validated();
        let client = build_client(&options)?;
        Ok(Self {
            website: WebsiteChecker::new(client, &options),
            concurrency: options.concurrency,
        })
    }

    /// Start checking `occurrences` and return a stream of results.
    ///
    /// Returns immediately; the work happens on background tasks. The stream
    /// yields exactly one [`CheckResult`] per occurrence, in completion
    /// order. All results for one URL are yielded back to back, the primary
    /// first. Cancelling `token` abandons in-flight requests (they are
    /// reported as network errors) and skips URLs that were not started yet.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[must_use]
    pub fn check(
        &self,
        occurrences: Vec<LinkOccurrence>,
        token: CancellationToken,
    ) -> ReceiverStream<CheckResult> {
        pool::spawn(self.website.clone(), self.concurrency, occurrences, token)
    }

    /// Check all `occurrences` and wait for every result.
    pub async fn check_all(&self, occurrences: Vec<LinkOccurrence>) -> Vec<CheckResult> {
        self.check(occurrences, CancellationToken::new())
            .collect()
            .await
    }

    /// Check a single URL, outside of any batch.
    pub async fn check_url(&self, url: &str, token: &CancellationToken) -> Outcome {
        self.website.check(url, token).await
    }

    /// Number of URLs checked in parallel
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }
}
