/// Failure of a single attempt. Recovered locally by retrying.
#[derive(Debug, thiserror::Error)]
pub enum TransientCallFailure {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body was not valid `generateContent` JSON.
    #[error("decode error: {0}")]
    Decode(String),
}

impl TransientCallFailure {
    /// HTTP status of the failed attempt, if the server answered with a
    /// non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum GymSenseError {
    /// The request ended without success.
    #[error("request exhausted after {attempts} attempt(s): {last}")]
    RequestExhausted {
        /// Number of attempts made. Equals the configured maximum unless the
        /// loop was stopped early by classification.
        attempts: u32,
        /// Failure of the final attempt.
        #[source]
        last: TransientCallFailure,
    },
    /// Non-retryable HTTP status under [`StatusPolicy::TransientOnly`].
    ///
    /// [`StatusPolicy::TransientOnly`]: crate::StatusPolicy::TransientOnly
    #[error("request rejected with http {status} on attempt {attempts}: {body}")]
    Rejected {
        status: u16,
        body: String,
        /// Attempt on which the rejection arrived.
        attempts: u32,
    },
}

impl GymSenseError {
    /// Number of attempts made before the error was surfaced.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::RequestExhausted { attempts, .. } | Self::Rejected { attempts, .. } => *attempts,
        }
    }
}
