use crate::retry::RetryPolicy;

/// Which non-success HTTP statuses count as retryable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StatusPolicy {
    /// Every non-success status is retried like a transport failure.
    #[default]
    RetryAll,
    /// Only 408, 429 and 5xx gateway/server statuses are retried; anything
    /// else fails immediately with [`GymSenseError::Rejected`].
    ///
    /// [`GymSenseError::Rejected`]: crate::GymSenseError::Rejected
    TransientOnly,
}

/// Configures retry and timeout behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Total attempt budget, including the first attempt. Zero is treated as one.
    pub max_attempts: u32,
    /// Seed for the exponential backoff, in milliseconds.
    pub base_delay_ms: u64,
    /// Optional per-call timeout in milliseconds. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
    /// Retry classification for non-success HTTP statuses.
    pub status_policy: StatusPolicy,
}

impl ClientOptions {
    /// Retry policy derived from these options.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay_ms)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            timeout_ms: None,
            status_policy: StatusPolicy::RetryAll,
        }
    }
}
