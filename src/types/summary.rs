use std::collections::BTreeMap;

use serde::Serialize;

use crate::{CheckResult, Outcome};

/// Aggregated counts over the results of a batch.
///
/// Duplicates are counted separately and are not included in the per-outcome
/// counters, so `alive + redirected + blocked + dead + errors + duplicates`
/// always equals `total`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of results seen
    pub total: usize,
    /// Primary results with an `Alive` outcome
    pub alive: usize,
    /// Primary results with a `Redirect` outcome
    pub redirected: usize,
    /// Primary results with a `Blocked` outcome
    pub blocked: usize,
    /// Primary results with a `Dead` outcome
    pub dead: usize,
    /// Primary results with a `NetworkError` outcome
    pub errors: usize,
    /// Results that defer to a primary
    pub duplicates: usize,
    /// Failing primary results grouped by source file
    pub failures: BTreeMap<String, Vec<String>>,
}

impl Summary {
    /// Create an empty summary
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one result
    pub fn add(&mut self, result: &CheckResult) {
        self.total += 1;
        match &result.outcome {
            Outcome::Alive(_) => self.alive += 1,
            Outcome::Redirect { .. } => self.redirected += 1,
            Outcome::Blocked(_) => self.blocked += 1,
            Outcome::Dead { .. } => self.dead += 1,
            Outcome::NetworkError(_) => self.errors += 1,
            Outcome::Duplicate(_) => self.duplicates += 1,
        }

        if result.outcome.is_failure() && result.is_primary() {
            self.failures
                .entry(result.occurrence.source_file.clone())
                .or_default()
                .push(result.to_string());
        }
    }

    /// Returns `true` if no link in the batch is broken, blocked or
    /// unreachable. Redirects count as warnings, not failures.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.blocked == 0 && self.dead == 0 && self.errors == 0
    }

    /// Returns `true` if no result was recorded
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl<'a> FromIterator<&'a CheckResult> for Summary {
    fn from_iter<T: IntoIterator<Item = &'a CheckResult>>(iter: T) -> Self {
        let mut summary = Summary::new();
        for result in iter {
            summary.add(result);
        }
        summary
    }
}
