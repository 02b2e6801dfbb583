use std::fmt::Display;

use serde::Serialize;

use crate::{LinkOccurrence, Outcome};

/// The verification result for one [`LinkOccurrence`].
///
/// A result is created once per occurrence and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// The occurrence this result belongs to
    pub occurrence: LinkOccurrence,
    /// What the engine found out about the URL
    pub outcome: Outcome,
}

impl CheckResult {
    /// Create a new result
    #[inline]
    #[must_use]
    pub const fn new(occurrence: LinkOccurrence, outcome: Outcome) -> Self {
        Self {
            occurrence,
            outcome,
        }
    }

    /// The URL that was checked
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.occurrence.url
    }

    /// Retrieve the outcome of the check
    #[inline]
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Returns `true` if this is the authoritative result for its URL
    #[inline]
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        !self.outcome.is_duplicate()
    }
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self
            .outcome
            .code()
            .map_or_else(|| "ERROR".to_string(), |code| code.as_str().to_string());
        write!(
            f,
            "{} [{code}] {}",
            self.outcome.icon(),
            self.occurrence
        )?;

        if self.outcome == Outcome::Alive(http::StatusCode::OK) {
            // Plain successes need no further explanation
            return Ok(());
        }

        match self.outcome.details() {
            Some(details) => write!(f, " | {details}"),
            None => Ok(()),
        }
    }
}
