//! Configuration of a [`Checker`](crate::Checker).
//!
//! [`Options`] is immutable once a checker is built. It can be created with
//! the generated builder, or deserialized from a caller's configuration file:
//!
//! ```toml
//! concurrency = 32
//! timeout = "5s"
//! max_retries = 1
//! ```
use std::time::Duration;

use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Default number of concurrently checked URLs, 20.
pub const DEFAULT_CONCURRENCY: usize = 20;
/// Default timeout in seconds before a request is deemed as failed, 10.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of retries before a request is deemed as failed, 2.
pub const DEFAULT_MAX_RETRIES: u64 = 2;
/// Default number of redirects before a request is deemed as failed, 10.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
/// Default number of body bytes drained after a `GET` fallback, 64 KiB.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;
/// Default user agent, `linkverify/<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("linkverify/", env!("CARGO_PKG_VERSION"));

/// Settings of one engine instance.
///
/// All fields have sane defaults; see the `DEFAULT_*` constants.
#[derive(TypedBuilder, Deserialize, Debug, Clone, PartialEq, Eq)]
#[builder(field_defaults(default, setter(into)))]
#[builder(builder_method(doc = "
Create a builder for building `Options`.

On the builder call, call methods with same name as its fields to set their values.

Finally, call `.build()` to create the instance of `Options`.
"))]
#[serde(default)]
pub struct Options {
    /// Number of URLs verified in parallel.
    ///
    /// This is also the capacity of the result stream.
    #[builder(default = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout of a single request.
    ///
    /// Applies to connecting, the TLS handshake and receiving the response.
    #[builder(default = Duration::from_secs(DEFAULT_TIMEOUT_SECS))]
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Maximum number of additional attempts for transient failures.
    #[builder(default = DEFAULT_MAX_RETRIES)]
    pub max_retries: u64,

    /// Maximum number of redirects followed per URL.
    #[builder(default = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// User agent sent with every regular request.
    ///
    /// The bot-bypass request replaces it with a browser user agent.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    pub user_agent: String,

    /// Maximum number of idle pooled connections kept per host.
    ///
    /// Defaults to `concurrency`.
    pub max_idle_per_host: Option<usize>,

    /// Number of body bytes read and discarded after a `GET` fallback, so
    /// the connection can go back to the pool.
    #[builder(default = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Options {
    /// Replace unusable values with their defaults.
    ///
    /// A concurrency, timeout or redirect bound of zero and an empty user
    /// agent would make the engine useless, so they fall back to the
    /// documented defaults instead of failing.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if self.concurrency == 0 {
            self.concurrency = DEFAULT_CONCURRENCY;
        }
        if self.timeout.is_zero() {
            self.timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        }
        if self.max_redirects == 0 {
            self.max_redirects = DEFAULT_MAX_REDIRECTS;
        }
        if self.user_agent.trim().is_empty() {
            self.user_agent = String::from(DEFAULT_USER_AGENT);
        }
        if self.max_idle_per_host == Some(0) {
            self.max_idle_per_host = None;
        }
        self
    }

    /// Idle connections kept per host in the connection pool
    #[must_use]
    pub fn idle_per_host(&self) -> usize {
        self.max_idle_per_host.unwrap_or(self.concurrency)
    }
}
