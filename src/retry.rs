use std::time::Duration;

use http::StatusCode;
use ring::rand::{SecureRandom, SystemRandom};

use crate::Outcome;

/// Upper bound of the exponential part of the backoff, in seconds.
const MAX_BACKOFF_SECS: u64 = 30;

/// An extension trait to help determine if a given outcome is transient
/// and worth another attempt.
///
/// Inspired by `Retryable` from
/// [reqwest-middleware](https://github.com/TrueLayer/reqwest-middleware/blob/f854725791ccf4a02c401a26cab3d9db753f468c/reqwest-retry/src/retryable.rs)
pub(crate) trait RetryExt {
    fn should_retry(&self) -> bool;
}

impl RetryExt for StatusCode {
    fn should_retry(&self) -> bool {
        self.is_server_error() || *self == StatusCode::TOO_MANY_REQUESTS
    }
}

impl RetryExt for Outcome {
    #[allow(clippy::match_same_arms)]
    fn should_retry(&self) -> bool {
        match self {
            Outcome::NetworkError(_) => true,
            Outcome::Dead {
                code: Some(code), ..
            } => code.should_retry(),
            Outcome::Dead { code: None, .. } => false,
            Outcome::Alive(_) => false,
            Outcome::Redirect { .. } => false,
            Outcome::Blocked(_) => false,
            Outcome::Duplicate(_) => false,
        }
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// The delay grows exponentially from one second and is capped at
/// thirty seconds, plus a random jitter of up to a quarter of that value so
/// that workers retrying the same host do not fire in lockstep. Attempt
/// numbers below 1 are treated as 1.
#[must_use]
pub fn backoff(attempt: u64) -> Duration {
    let exponent = u32::try_from(attempt.max(1) - 1).unwrap_or(u32::MAX);
    let base = Duration::from_secs(2_u64.saturating_pow(exponent).min(MAX_BACKOFF_SECS));
    base + (base / 4).mul_f64(random_fraction())
}

/// A uniformly distributed value in `[0, 1)`, drawn from the system CSPRNG.
///
/// Falls back to no jitter at all if the system source is unavailable.
fn random_fraction() -> f64 {
    let mut bytes = [0_u8; 8];
    if SystemRandom::new().fill(&mut bytes).is_err() {
        return 0.0;
    }
    // Keep 53 random bits, the precision of an `f64` mantissa
    #[allow(clippy::cast_precision_loss)]
    let fraction = (u64::from_le_bytes(bytes) >> 11) as f64 / (1_u64 << 53) as f64;
    fraction
}
