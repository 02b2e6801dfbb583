use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A single textual appearance of a URL in a source document.
///
/// Occurrences are produced by the document parsers and are the only input
/// the engine consumes. Several occurrences may share the same URL; each of
/// them yields exactly one [`CheckResult`](crate::CheckResult).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkOccurrence {
    /// The URL as it was written in the document
    pub url: String,
    /// The file the URL was found in
    pub source_file: String,
    /// The (1-based) line the URL was found on
    pub source_line: usize,
}

impl LinkOccurrence {
    /// Create a new occurrence
    #[must_use]
    pub fn new(url: impl Into<String>, source_file: impl Into<String>, source_line: usize) -> Self {
        Self {
            url: url.into(),
            source_file: source_file.into(),
            source_line,
        }
    }
}

impl Display for LinkOccurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}:{})", self.url, self.source_file, self.source_line)
    }
}
