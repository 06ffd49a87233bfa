//! Bounded retry for network calls
//!
//! Wraps a fallible unit of work with a fixed number of attempts and a fixed
//! pacing delay between them. There is deliberately no exponential backoff
//! and no jitter. The delay is a real blocking pause on the calling thread;
//! the whole fetch pipeline is synchronous.

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;
use crate::{Result, runlog};

/// Maximum attempts per call
pub const MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Attempt count and pacing delay for one retried call.
///
/// Tests shrink the delay; production code uses the default.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

/// Invoke `op` up to [`MAX_ATTEMPTS`] times, pausing [`RETRY_DELAY`] between
/// attempts, with failures logged under the default log directory.
///
/// # Errors
///
/// Returns [`Error::RetryExhausted`] carrying the last underlying error once
/// every attempt has failed. The exhaustion is appended to the error log
/// before returning.
pub fn with_retry<T, F>(label: &str, op: F) -> Result<T>
where
    F: FnMut() -> anyhow::Result<T>,
{
    with_retry_policy(
        &RetryPolicy::default(),
        Path::new(runlog::DEFAULT_LOG_DIR),
        label,
        op,
    )
}

/// [`with_retry`] with an explicit policy and error-log directory
pub fn with_retry_policy<T, F>(
    policy: &RetryPolicy,
    log_dir: &Path,
    label: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> anyhow::Result<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < max_attempts {
                    warn!(
                        "{label} failed (attempt {attempt}/{max_attempts}): {e}. \
                         Retrying in {}s...",
                        policy.delay.as_secs()
                    );
                    thread::sleep(policy.delay);
                }
                last_error = Some(e);
            }
        }
    }

    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no attempts were made".to_string());
    warn!("All {max_attempts} attempts failed for {label}.");
    runlog::log_error(
        log_dir,
        &format!("API call failed after {max_attempts} attempts: {message}"),
    );
    Err(Error::RetryExhausted {
        attempts: max_attempts,
        last_error: message,
    })
}
