//! `linkverify` is a concurrent link verification engine.
//!
//! It takes the links found in a set of documents and finds out which ones
//! still work. Each unique URL is checked once, no matter how often it is
//! referenced; transient failures are retried with backoff, redirects are
//! followed and recorded by hand, and `403` answers get a second chance with
//! a browser-like request.
//!
//! "Hello world" example:
//! ```no_run
//! use linkverify::{LinkOccurrence, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let results = linkverify::check_all(vec![
//!         LinkOccurrence::new("https://github.com/lycheeverse/lychee", "README.md", 3),
//!     ])
//!     .await?;
//!     for result in results {
//!         println!("{result}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For more control, build a [`Checker`] from [`Options`] and consume the
//! results as a stream while they arrive:
//!
//! ```no_run
//! use futures::StreamExt;
//! use linkverify::{CancellationToken, Checker, LinkOccurrence, Options, Result, Summary};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let checker = Checker::new(Options::builder().concurrency(8_usize).build())?;
//!     let occurrences = vec![LinkOccurrence::new("https://example.com", "docs/index.md", 12)];
//!
//!     let mut summary = Summary::new();
//!     let mut results = checker.check(occurrences, CancellationToken::new());
//!     while let Some(result) = results.next().await {
//!         println!("{result}");
//!         summary.add(&result);
//!     }
//!     assert!(summary.is_success());
//!     Ok(())
//! }
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(missing_docs)]

#[cfg(not(any(feature = "native-tls", feature = "rustls-tls")))]
compile_error!("Enable at least one TLS backend: `native-tls` or `rustls-tls`");

mod checker;
mod client;
mod options;
mod pool;
mod retry;
mod types;
mod utils;

#[cfg(test)]
#[macro_use]
pub(crate) mod test_utils;

pub use checker::Checker;
pub use options::{
    DEFAULT_BODY_LIMIT, DEFAULT_CONCURRENCY, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Options,
};
pub use retry::backoff;
pub use tokio_util::sync::CancellationToken;
pub use types::*;

/// Check a batch of occurrences with the default [`Options`].
///
/// # Errors
///
/// Fails only if the HTTP client cannot be created. Broken links are
/// reported in the returned results, never as an error.
pub async fn check_all(occurrences: Vec<LinkOccurrence>) -> Result<Vec<CheckResult>> {
    let checker = Checker::new(Options::default())?;
    Ok(checker.check_all(occurrences).await)
}
