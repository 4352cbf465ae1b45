//! Fixed-cadence polling until a resource reaches a terminal status.
//!
//! [`poll_until`] calls `fetch` every `interval`. Transient errors (network
//! failures, 5xx) are logged and the next poll goes ahead; any other error is
//! returned immediately. After `max_attempts` polls without a terminal value
//! it gives up with [`ClientError::PollTimeout`].

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2_000),
            max_attempts: 900,
        }
    }
}

pub(crate) async fn poll_until<T, F, Fut, D>(
    resource: &'static str,
    id: &str,
    policy: PollPolicy,
    mut fetch: F,
    is_done: D,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    D: Fn(&T) -> bool,
{
    for attempt in 1..=policy.max_attempts {
        match fetch().await {
            Ok(value) if is_done(&value) => {
                tracing::debug!(resource, id, attempt, "poll reached terminal status");
                return Ok(value);
            }
            Ok(_) => {
                tracing::debug!(resource, id, attempt, "not finished yet");
            }
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    resource,
                    id,
                    attempt,
                    error = %err,
                    "transient error while polling, will poll again"
                );
            }
            Err(err) => return Err(err),
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(ClientError::PollTimeout {
        resource,
        id: id.to_owned(),
        attempts: policy.max_attempts,
    })
}
