use std::{fmt::Display, sync::Arc};

use http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use url::Url;

use super::redirects::Redirects;
use crate::{CheckResult, ErrorKind};

const ICON_ALIVE: &str = "✔";
const ICON_REDIRECT: &str = "⇄";
const ICON_BLOCKED: &str = "⊘";
const ICON_DEAD: &str = "✗";
const ICON_NETWORK_ERROR: &str = "⚠";
const ICON_DUPLICATE: &str = "↻";

/// The classified result of verifying one URL.
///
/// Exactly one variant is active per result. Only the variants that carry a
/// field have it; there are no zeroed placeholders.
#[allow(variant_size_differences)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The URL answered with a success status
    Alive(StatusCode),
    /// The URL redirects to a working destination.
    ///
    /// This is a warning rather than a failure: the link works, but it
    /// should be updated to point at `final_url`.
    Redirect {
        /// Status of the original request, e.g. `301`
        code: StatusCode,
        /// The hops that were followed, starting with the original URL
        redirects: Redirects,
        /// The final destination
        final_url: Url,
        /// Status of the final destination
        final_code: StatusCode,
    },
    /// The server refused access (`403`), even to a browser-like request
    Blocked(StatusCode),
    /// The URL is broken
    Dead {
        /// Status code that caused the classification, if the failure
        /// happened at the HTTP level
        code: Option<StatusCode>,
        /// Human-readable description
        reason: String,
    },
    /// The URL could not be reached at all (DNS, TLS, refused connection,
    /// timeout or cancellation)
    NetworkError(String),
    /// Another occurrence of the same URL carries the authoritative outcome
    Duplicate(Arc<CheckResult>),
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Alive(code) => write!(f, "{code}"),
            Outcome::Redirect { .. } => f.write_str("Redirect"),
            Outcome::Blocked(code) => write!(f, "Blocked ({code})"),
            Outcome::Dead { reason, .. } => f.write_str(reason),
            Outcome::NetworkError(message) => f.write_str(message),
            Outcome::Duplicate(primary) => write!(
                f,
                "Duplicate of {}:{}",
                primary.occurrence.source_file, primary.occurrence.source_line
            ),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Outcome", 4)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("text", &self.to_string())?;
        if let Some(code) = self.code() {
            s.serialize_field("code", &code.as_u16())?;
        }
        match self {
            Outcome::Redirect {
                redirects,
                final_url,
                final_code,
                ..
            } => {
                s.serialize_field("redirects", redirects)?;
                s.serialize_field("final_url", final_url.as_str())?;
                s.serialize_field("final_code", &final_code.as_u16())?;
            }
            Outcome::Duplicate(primary) => {
                s.serialize_field("primary", &primary.occurrence)?;
            }
            _ => {}
        }
        s.end()
    }
}

impl Outcome {
    /// Create a `Dead` outcome for a failing HTTP status
    #[must_use]
    pub fn dead(code: StatusCode) -> Self {
        Outcome::Dead {
            code: Some(code),
            reason: code.to_string(),
        }
    }

    /// A short, stable name of the variant, e.g. `"alive"`
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Outcome::Alive(_) => "alive",
            Outcome::Redirect { .. } => "redirect",
            Outcome::Blocked(_) => "blocked",
            Outcome::Dead { .. } => "dead",
            Outcome::NetworkError(_) => "network_error",
            Outcome::Duplicate(_) => "duplicate",
        }
    }

    /// Return the HTTP status code (if any).
    ///
    /// For redirects this is the status of the original request; the status
    /// of the final destination is kept in `final_code`. Duplicates report
    /// the code of their primary.
    #[must_use]
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            Outcome::Alive(code) | Outcome::Blocked(code) | Outcome::Redirect { code, .. } => {
                Some(*code)
            }
            Outcome::Dead { code, .. } => *code,
            Outcome::NetworkError(_) => None,
            Outcome::Duplicate(primary) => primary.outcome.code(),
        }
    }

    /// Returns `true` if the link works, possibly after following redirects.
    /// A duplicate reports the verdict of its primary.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::Alive(_) | Outcome::Redirect { .. } => true,
            Outcome::Duplicate(primary) => primary.outcome.is_success(),
            _ => false,
        }
    }

    /// Returns `true` if the link is broken or could not be verified.
    /// A duplicate reports the verdict of its primary.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        match self {
            Outcome::Blocked(_) | Outcome::Dead { .. } | Outcome::NetworkError(_) => true,
            Outcome::Duplicate(primary) => primary.outcome.is_failure(),
            _ => false,
        }
    }

    /// Returns `true` if this outcome defers to a primary result
    #[inline]
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Outcome::Duplicate(_))
    }

    /// Return a unicode icon to visualize the outcome
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Outcome::Alive(_) => ICON_ALIVE,
            Outcome::Redirect { .. } => ICON_REDIRECT,
            Outcome::Blocked(_) => ICON_BLOCKED,
            Outcome::Dead { .. } => ICON_DEAD,
            Outcome::NetworkError(_) => ICON_NETWORK_ERROR,
            Outcome::Duplicate(_) => ICON_DUPLICATE,
        }
    }

    /// Return more details about the outcome (if any).
    ///
    /// The output is meant for humans and may change between releases.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Outcome::Alive(code) => code.canonical_reason().map(String::from),
            Outcome::Redirect {
                redirects,
                final_url,
                final_code,
                ..
            } => {
                let count = redirects.count();
                let noun = if count == 1 { "redirect" } else { "redirects" };
                Some(format!(
                    "Followed {count} {noun} to {final_url} ({final_code}). Redirects: {redirects}"
                ))
            }
            Outcome::Blocked(code) => Some(format!(
                "Server answered {code}, also to a browser-like request"
            )),
            Outcome::Dead { reason, .. } => Some(reason.clone()),
            Outcome::NetworkError(message) => Some(message.clone()),
            Outcome::Duplicate(primary) => Some(format!(
                "Same URL as {}:{}, which is {}",
                primary.occurrence.source_file,
                primary.occurrence.source_line,
                primary.outcome.kind()
            )),
        }
    }

    /// Append the number of retries that were spent on this outcome to its
    /// message. Outcomes without a message are returned unchanged.
    pub(crate) fn annotate_retries(self, retries: u64) -> Self {
        let suffix = if retries == 1 { "retry" } else { "retries" };
        match self {
            Outcome::Dead { code, reason } => Outcome::Dead {
                code,
                reason: format!("{reason} (after {retries} {suffix})"),
            },
            Outcome::NetworkError(message) => {
                Outcome::NetworkError(format!("{message} (after {retries} {suffix})"))
            }
            other => other,
        }
    }
}

impl From<ErrorKind> for Outcome {
    fn from(e: ErrorKind) -> Self {
        match e {
            ErrorKind::MissingLocation(code) => Outcome::Dead {
                code: Some(code),
                reason: e.to_string(),
            },
            ErrorKind::InvalidUrl(..)
            | ErrorKind::UnsupportedScheme(_)
            | ErrorKind::InvalidLocation(..)
            | ErrorKind::RedirectLoop(_)
            | ErrorKind::TooManyRedirects(_) => Outcome::Dead {
                code: None,
                reason: e.to_string(),
            },
            ErrorKind::BuildRequestClient(_)
            | ErrorKind::NetworkRequest(_)
            | ErrorKind::InvalidHeader(_)
            | ErrorKind::Cancelled => Outcome::NetworkError(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for Outcome {
    fn from(e: reqwest::Error) -> Self {
        ErrorKind::NetworkRequest(e).into()
    }
}
