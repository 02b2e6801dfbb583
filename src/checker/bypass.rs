use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use log::debug;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::website::WebsiteChecker;
use crate::{ErrorKind, Outcome, Result};

/// Some firewalls (e.g. Cloudflare, Akamai) answer `403` to anything that
/// does not look like a browser navigating to a page.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Headers a desktop browser sends on a top-level navigation
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers
}

impl WebsiteChecker {
    /// Classify a direct `403`: `Alive` if a browser-like request gets
    /// through, `Blocked` otherwise.
    pub(crate) async fn check_forbidden(&self, url: &Url, token: &CancellationToken) -> Outcome {
        match self.bypass(url, token).await {
            Ok(status) if status.is_success() => Outcome::Alive(status),
            Ok(_) => Outcome::Blocked(StatusCode::FORBIDDEN),
            Err(ErrorKind::Cancelled) => ErrorKind::Cancelled.into(),
            Err(e) => {
                debug!("Bypass request to {url} failed: {e}");
                Outcome::Blocked(StatusCode::FORBIDDEN)
            }
        }
    }

    /// Issue exactly one `GET` with a desktop browser header profile and
    /// return its status. Redirects in the answer are not followed.
    pub(crate) async fn bypass(&self, url: &Url, token: &CancellationToken) -> Result<StatusCode> {
        debug!("{url} answered 403, retrying with a browser profile");
        let request = self
            .reqwest_client
            .request(Method::GET, url.clone())
            .headers(browser_headers());
        let response = self.send(request, token).await?;
        let status = response.status();
        self.drain(response, token).await?;
        Ok(status)
    }
}
