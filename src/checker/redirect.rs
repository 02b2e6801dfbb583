use http::StatusCode;
use log::debug;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{probe::Probe, website::WebsiteChecker};
use crate::{ErrorKind, Outcome, Redirects, Result};

/// A redirect chain that ended in a non-redirect response
#[derive(Debug)]
struct ResolvedChain {
    redirects: Redirects,
    final_url: Url,
    final_status: StatusCode,
}

impl WebsiteChecker {
    /// Walk the redirect chain starting at `url`, whose first response is
    /// `first`, and classify where it ends.
    ///
    /// - A working destination is a `Redirect`: the link works, but should be
    ///   updated.
    /// - A `403` at the destination gets one bot-bypass attempt.
    /// - Anything else, as well as an unbounded or looping chain, is `Dead`.
    pub(crate) async fn follow_redirects(
        &self,
        url: &Url,
        first: Probe,
        token: &CancellationToken,
    ) -> Outcome {
        let chain = match self.resolve_chain(url, first, token).await {
            Ok(chain) => chain,
            Err(e) => return e.into(),
        };

        let ResolvedChain {
            redirects,
            final_url,
            final_status,
        } = chain;
        let code = redirects.iter().next().map_or(final_status, |hop| hop.status);

        let final_code = if final_status.is_success() {
            final_status
        } else if final_status == StatusCode::FORBIDDEN {
            match self.bypass(&final_url, token).await {
                Ok(bypass_status) if bypass_status.is_success() => bypass_status,
                Ok(_) => return dead_at_target(final_status, &final_url),
                Err(ErrorKind::Cancelled) => return ErrorKind::Cancelled.into(),
                Err(e) => {
                    debug!("Bypass request to {final_url} failed: {e}");
                    return dead_at_target(final_status, &final_url);
                }
            }
        } else {
            return dead_at_target(final_status, &final_url);
        };

        Outcome::Redirect {
            code,
            redirects,
            final_url,
            final_code,
        }
    }

    /// Follow `Location` headers until a non-redirect response arrives.
    ///
    /// The chain never holds more than `max_redirects` hops; a chain that
    /// needs more, or that revisits one of its URLs, is an error.
    ///
    /// `max_redirects` bounds followed redirects, not requests: the response
    /// to the original URL is `first`, so a chain of exactly `max_redirects`
    /// hops is accepted and costs `max_redirects` further requests here
    /// (`max_redirects + 1` in total for the check).
    async fn resolve_chain(
        &self,
        url: &Url,
        first: Probe,
        token: &CancellationToken,
    ) -> Result<ResolvedChain> {
        let mut redirects = Redirects::default();
        let mut current = url.clone();
        let mut probe = first;

        while probe.status.is_redirection() {
            if redirects.count() >= self.max_redirects {
                return Err(ErrorKind::TooManyRedirects(self.max_redirects));
            }
            let location = probe
                .location
                .take()
                .ok_or(ErrorKind::MissingLocation(probe.status))?;
            let next = resolve_location(&current, &location)?;

            redirects.push(current, probe.status);
            if redirects.contains(&next) {
                return Err(ErrorKind::RedirectLoop(next));
            }

            debug!("Following redirect ({}) to {next}", probe.status);
            probe = self.probe(&next, token).await?;
            current = next;
        }

        Ok(ResolvedChain {
            redirects,
            final_url: current,
            final_status: probe.status,
        })
    }
}

/// Resolve the value of a `Location` header against the URL that sent it.
///
/// Absolute URLs are taken as they are; protocol-relative (`//host/path`),
/// root-relative (`/path`), path-relative (`path`, `../path`) and query- or
/// fragment-only references (`?q`, `#f`) resolve against `base`.
fn resolve_location(base: &Url, location: &str) -> Result<Url> {
    let location = location.trim();
    base.join(location)
        .map_err(|e| ErrorKind::InvalidLocation(location.to_string(), e))
}

fn dead_at_target(status: StatusCode, target: &Url) -> Outcome {
    Outcome::Dead {
        code: Some(status),
        reason: format!("{status} at redirect target {target}"),
    }
}
