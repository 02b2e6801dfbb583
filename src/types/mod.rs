#![allow(unreachable_pub)]

mod error;
mod occurrence;
mod outcome;
mod redirects;
mod result;
mod summary;

pub use error::ErrorKind;
pub use occurrence::LinkOccurrence;
pub use outcome::Outcome;
pub use redirects::{RedirectHop, Redirects};
pub use result::CheckResult;
pub use summary::Summary;

/// The `linkverify` `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
