//! Bounded retry loop with deterministic exponential backoff.
//!
//! The loop owns all attempt state, so concurrent calls never share a counter.

use std::future::Future;
use std::time::Duration;

// tokio::time::sleep is only available on non-WASM targets.
#[cfg(not(target_arch = "wasm32"))]
use tokio::time::sleep;

/// Largest power of two applied to the base delay.
pub const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Attempt budget and backoff seed for one logical request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl RetryPolicy {
    /// Creates a policy. A `max_attempts` of zero is raised to one.
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    /// Delay that precedes attempt `ordinal`: `base × 2^(ordinal - 1)`.
    ///
    /// The first attempt is never delayed.
    pub fn delay_before(&self, ordinal: u32) -> Duration {
        if ordinal <= 1 {
            return Duration::ZERO;
        }
        let exp = (ordinal - 1).min(MAX_BACKOFF_EXPONENT);
        let multiplier = 1u64 << exp;
        Duration::from_millis(self.base_delay_ms.saturating_mul(multiplier))
    }
}

/// One physical call made for a logical request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Attempt {
    /// 1-based attempt number.
    pub ordinal: u32,
    /// Backoff slept before this attempt started.
    pub delay: Duration,
}

impl Attempt {
    fn first() -> Self {
        Self {
            ordinal: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Terminal outcome of [`retry_with_backoff`] when no attempt succeeded.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The attempt budget was spent.
    Exhausted { attempts: u32, last: E },
    /// An attempt failed with an error the caller classified as permanent.
    Aborted { attempts: u32, error: E },
}

/// Runs `operation` until it succeeds, fails permanently, or the budget runs out.
///
/// Attempts run strictly one after another. After a retryable failure on
/// attempt `n` the loop sleeps [`RetryPolicy::delay_before`]`(n + 1)` and
/// calls `operation` again with the next [`Attempt`].
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: R,
) -> Result<T, RetryError<E>>
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = Attempt::first();
    loop {
        let error = match operation(attempt).await {
            Ok(value) => {
                #[cfg(feature = "tracing")]
                if attempt.ordinal > 1 {
                    tracing::debug!("request succeeded on attempt {}", attempt.ordinal);
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !is_retryable(&error) {
            return Err(RetryError::Aborted {
                attempts: attempt.ordinal,
                error,
            });
        }
        if attempt.ordinal >= policy.max_attempts {
            return Err(RetryError::Exhausted {
                attempts: attempt.ordinal,
                last: error,
            });
        }

        let ordinal = attempt.ordinal + 1;
        let delay = policy.delay_before(ordinal);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "attempt {} failed, retrying after {} ms",
            attempt.ordinal,
            delay.as_millis()
        );

        sleep(delay).await;
        attempt = Attempt { ordinal, delay };
    }
}

/// `setTimeout` argument for `delay`, clamped to the largest value browsers
/// honor. Longer values overflow and fire immediately.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn timer_millis(delay: Duration) -> i32 {
    delay.as_millis().min(i32::MAX as u128) as i32
}

/// Suspends via a `setTimeout` promise. The browser has no tokio timer.
///
/// Without a usable `setTimeout` the backoff is skipped and the next attempt
/// starts at once.
#[cfg(target_arch = "wasm32")]
async fn sleep(delay: Duration) {
    use wasm_bindgen::{JsCast, JsValue};

    let millis = timer_millis(delay);
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let set_timeout = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("setTimeout"))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok());
        let scheduled = match set_timeout {
            Some(set_timeout) => set_timeout.call2(&JsValue::NULL, &resolve, &JsValue::from(millis)),
            None => Err(JsValue::from_str("setTimeout is not available")),
        };
        if let Err(reason) = scheduled {
            let _ = reject.call1(&JsValue::NULL, &reason);
        }
    });

    if let Err(_reason) = wasm_bindgen_futures::JsFuture::from(promise).await {
        #[cfg(feature = "tracing")]
        tracing::warn!("backoff of {} ms skipped: {:?}", millis, _reason);
    }
}
