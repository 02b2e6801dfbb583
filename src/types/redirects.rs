use std::fmt::Display;

use http::StatusCode;
use serde::{Serialize, Serializer};
use url::Url;

/// One recorded step of a redirect chain: the URL that was requested and the
/// redirect status it answered with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RedirectHop {
    /// The URL that answered with a redirect
    pub url: Url,
    /// The redirect status code, e.g. `301`
    pub status: StatusCode,
}

impl Serialize for RedirectHop {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("RedirectHop", 2)?;
        s.serialize_field("url", self.url.as_str())?;
        s.serialize_field("status", &self.status.as_u16())?;
        s.end()
    }
}

/// The hops that were followed between the original URL and its final
/// destination.
///
/// `chain[0]` is the original request, the last hop is the one preceding the
/// final destination. The final destination itself is not part of the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Redirects(Vec<RedirectHop>);

impl From<Vec<RedirectHop>> for Redirects {
    fn from(value: Vec<RedirectHop>) -> Self {
        Self(value)
    }
}

impl Display for Redirects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = self
            .0
            .iter()
            .map(|hop| format!("{} [{}]", hop.url, hop.status.as_u16()))
            .collect::<Vec<_>>()
            .join(" --> ");
        write!(f, "{list}")
    }
}

impl Redirects {
    /// Number of redirects that were followed
    #[must_use]
    pub const fn count(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no redirect was followed
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the recorded hops in order
    pub fn iter(&self) -> impl Iterator<Item = &RedirectHop> {
        self.0.iter()
    }

    /// Returns `true` if `url` was already visited in this chain
    pub(crate) fn contains(&self, url: &Url) -> bool {
        self.0.iter().any(|hop| &hop.url == url)
    }

    pub(crate) fn push(&mut self, url: Url, status: StatusCode) {
        self.0.push(RedirectHop { url, status });
    }
}
