//! Review parameters: Reviewer fan-out control.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound on a single reviewer call
pub const DEFAULT_REVIEW_TIMEOUT: Duration = Duration::from_secs(15);

/// Reviewer fan-out parameters used by
/// [`ReviewCoordinator`](crate::use_cases::review_application::ReviewCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewParams {
    /// Wall-clock cap per reviewer call. A reviewer exceeding it gets an
    /// `error` verdict; the others are unaffected.
    pub timeout: Duration,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REVIEW_TIMEOUT,
        }
    }
}

impl ReviewParams {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        assert_eq!(ReviewParams::default().timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_builder() {
        let params = ReviewParams::default().with_timeout(Duration::from_millis(50));
        assert_eq!(params.timeout, Duration::from_millis(50));
    }
}
