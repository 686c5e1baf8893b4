// SPDX-License-Identifier: GPL-3.0-only

//! Polling for eventually consistent datastore state
//!
//! A returned create/delete call means the request was processed remotely,
//! not that every existence query already reflects it. Callers that need to
//! observe the effect poll with [`wait_for_path`].

use std::future::Future;
use std::time::Duration;

use disk_path_contracts::{DatastoreBrowser, DatastorePath, RemoteError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    pub tries: u32,
    #[serde(rename = "interval_ms", with = "millis")]
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            tries: 5,
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("condition not met after {tries} tries")]
    TimedOut { tries: u32 },

    #[error("probe failed: {0}")]
    Probe(#[from] RemoteError),
}

/// Await `probe` until it reports `true`, at most `policy.tries` times.
pub async fn wait_until<F, Fut>(policy: WaitPolicy, mut probe: F) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, RemoteError>>,
{
    for attempt in 1..=policy.tries {
        if probe().await? {
            return Ok(());
        }
        if attempt < policy.tries {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(WaitError::TimedOut {
        tries: policy.tries,
    })
}

/// Wait until the existence of `target` matches `expected`.
pub async fn wait_for_path(
    browser: &dyn DatastoreBrowser,
    target: &DatastorePath,
    expected: bool,
    policy: WaitPolicy,
) -> Result<(), WaitError> {
    let result = wait_until(policy, move || async move {
        Ok::<_, RemoteError>(browser.path_exists(target).await? == expected)
    })
    .await;

    if let Err(WaitError::TimedOut { tries }) = &result {
        tracing::debug!(%target, expected, tries, "Path existence did not settle");
    }
    result
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use disk_path_contracts::RemoteErrorKind;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn returns_as_soon_as_the_probe_passes() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let started = tokio::time::Instant::now();

        wait_until(WaitPolicy::default(), move || async move {
            Ok(calls.fetch_add(1, Ordering::SeqCst) + 1 >= 3)
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_last_try() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let started = tokio::time::Instant::now();

        let err = wait_until(WaitPolicy::default(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        })
        .await
        .unwrap_err();

        assert_eq!(err, WaitError::TimedOut { tries: 5 });
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn probe_errors_stop_polling() {
        let err = wait_until(WaitPolicy::default(), || async {
            Err(RemoteError::new(RemoteErrorKind::Unavailable, "host down"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, WaitError::Probe(_)));
    }

    #[test]
    fn interval_reads_as_milliseconds() {
        let policy: WaitPolicy = toml::from_str("tries = 3\ninterval_ms = 250").unwrap();
        assert_eq!(policy.tries, 3);
        assert_eq!(policy.interval, Duration::from_millis(250));
    }
}
