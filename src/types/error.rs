use http::StatusCode;
use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

use crate::utils::reqwest::trim_error_output;

/// Possible errors when verifying links with `linkverify`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The shared HTTP client could not be created
    #[error("Failed to build the HTTP client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),

    /// Network error while talking to a remote endpoint
    #[error("{}", trim_error_output(.0))]
    NetworkRequest(#[source] reqwest::Error),

    /// The given header could not be parsed.
    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice.
    #[error("Header could not be parsed: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// The URL of an occurrence cannot be parsed
    #[error("Invalid URL `{0}`: {1}")]
    InvalidUrl(String, #[source] url::ParseError),

    /// The URL parses but uses a scheme other than `http` or `https`
    #[error("Unsupported URL scheme `{0}`")]
    UnsupportedScheme(String),

    /// A redirect response did not carry a `Location` header
    #[error("Redirect ({0}) without a Location header")]
    MissingLocation(StatusCode),

    /// The `Location` header of a redirect could not be resolved
    #[error("Cannot resolve redirect target `{0}`: {1}")]
    InvalidLocation(String, #[source] url::ParseError),

    /// A redirect pointed back to a URL that was already visited
    #[error("Redirect loop detected at {0}")]
    RedirectLoop(Url),

    /// The redirect chain did not end within the configured bound
    #[error("Too many redirects (more than {0})")]
    TooManyRedirects(usize),

    /// The check was abandoned because the batch was cancelled
    #[error("Check cancelled")]
    Cancelled,
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::BuildRequestClient(e1), Self::BuildRequestClient(e2))
            | (Self::NetworkRequest(e1), Self::NetworkRequest(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::InvalidHeader(_), Self::InvalidHeader(_))
            | (Self::Cancelled, Self::Cancelled) => true,
            (Self::InvalidUrl(s1, e1), Self::InvalidUrl(s2, e2))
            | (Self::InvalidLocation(s1, e1), Self::InvalidLocation(s2, e2)) => {
                s1 == s2 && e1 == e2
            }
            (Self::UnsupportedScheme(s1), Self::UnsupportedScheme(s2)) => s1 == s2,
            (Self::MissingLocation(c1), Self::MissingLocation(c2)) => c1 == c2,
            (Self::RedirectLoop(u1), Self::RedirectLoop(u2)) => u1 == u2,
            (Self::TooManyRedirects(n1), Self::TooManyRedirects(n2)) => n1 == n2,
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
