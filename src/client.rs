//! Construction of the shared HTTP client.
//!
//! One [`reqwest::Client`] is built per [`Checker`](crate::Checker) and
//! shared read-only by all workers, so they reuse pooled connections.
use std::time::Duration;

use http::header::{self, HeaderMap, HeaderValue};

use crate::{ErrorKind, Options, Result};

/// TCP keepalive
/// See <https://tldp.org/HOWTO/TCP-Keepalive-HOWTO/overview.html> for more info
const TCP_KEEPALIVE: u64 = 60;
/// Idle pooled connections are closed after this many seconds
const POOL_IDLE_TIMEOUT: u64 = 90;

/// Build the pooled HTTP client described by `options`.
///
/// Redirects are never followed automatically: every hop is observed and
/// bounded by the redirect resolver instead.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The user agent is not a valid header value.
/// - The request client cannot be created.
///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
pub(crate) fn build_client(options: &Options) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&options.user_agent)?,
    );

    reqwest::ClientBuilder::new()
        .gzip(true)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::none())
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .pool_max_idle_per_host(options.idle_per_host())
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT))
        .tcp_keepalive(Duration::from_secs(TCP_KEEPALIVE))
        // Covers TCP connect and the TLS handshake
        .connect_timeout(options.timeout)
        // Covers waiting for the response headers
        .read_timeout(options.timeout)
        // Upper bound for the whole request, including the drained body
        .timeout(options.timeout)
        .build()
        .map_err(ErrorKind::BuildRequestClient)
}
