//! Waiting for asynchronous operations to finish
//!
//! After a mutating call the command decides, via [`PollConfig`], whether to
//! block until the control plane has actually finished. The poller drives an
//! [`Interrogator`] at a fixed interval until it reports a terminal state or
//! the timeout expires, with optional progress callbacks for UI updates.
//!
//! ```text
//!            enabled == false
//!   start ────────────────────────────▶ Skipped
//!     │
//!     ▼
//!  Polling ──▶ Succeeded | Failed | TimedOut
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::interrogator::{Check, CompletionModel, Interrogator};
use crate::request::AsyncRequest;

/// Default time to wait for an operation, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default timeout for async operations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Fixed pause between two checks (5 seconds)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// How a command waits for its mutation to complete
///
/// Built once per invocation and not changed while polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub enabled: bool,
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollConfig {
    /// Waiting enabled or not, with the given timeout and the default interval
    pub fn new(enabled: bool, timeout: Duration) -> Self {
        Self {
            enabled,
            timeout,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Do not wait at all
    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_TIMEOUT)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Progress events emitted while polling
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// First check is about to be issued
    Started { id: String },
    /// A non-terminal observation
    Polling {
        id: String,
        status: String,
        elapsed: Duration,
    },
    /// Terminal success
    Completed { id: String, elapsed: Duration },
    /// Terminal failure, transport error or timeout
    Failed { id: String, error: String },
}

/// Callback type for progress updates
///
/// CLI uses this to update spinners.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Drives interrogators to a terminal outcome
#[derive(Default)]
pub struct Poller {
    config: PollConfig,
    on_progress: Option<ProgressCallback>,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Block until `id` is done, failed, or the timeout expires
    ///
    /// Returns `Ok(())` immediately, without checking, when waiting is disabled.
    /// Transport errors from the interrogator are returned as-is on first sight.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use cloudctl_core::{PollConfig, Poller, RequestCompletion, RequestStatusApi};
    /// use std::time::Duration;
    ///
    /// let interrogator = RequestCompletion::new(RequestStatusApi::new(client.clone()));
    /// Poller::new(PollConfig::new(true, Duration::from_secs(120)))
    ///     .poll(&interrogator, &request.request_id)
    ///     .await?;
    /// ```
    pub async fn poll(&self, interrogator: &dyn Interrogator, id: &str) -> Result<()> {
        if !self.config.enabled {
            debug!("Waiting disabled, not polling {}", id);
            return Ok(());
        }

        let start = Instant::now();
        self.emit(ProgressEvent::Started { id: id.to_string() });

        loop {
            let check = match interrogator.check(id).await {
                Ok(check) => check,
                Err(e) => {
                    self.emit(ProgressEvent::Failed {
                        id: id.to_string(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };
            let elapsed = start.elapsed();
            debug!("{} is {} after {:?}", id, check.status(), elapsed);

            match check {
                Check::Succeeded => {
                    self.emit(ProgressEvent::Completed {
                        id: id.to_string(),
                        elapsed,
                    });
                    return Ok(());
                }
                Check::Failed { status, message } => {
                    let err = CoreError::OperationFailed {
                        id: id.to_string(),
                        status,
                        message,
                    };
                    self.emit(ProgressEvent::Failed {
                        id: id.to_string(),
                        error: err.to_string(),
                    });
                    return Err(err);
                }
                Check::Pending { status } => {
                    if elapsed >= self.config.timeout {
                        let err = CoreError::Timeout {
                            id: id.to_string(),
                            elapsed,
                            timeout: self.config.timeout,
                        };
                        self.emit(ProgressEvent::Failed {
                            id: id.to_string(),
                            error: err.to_string(),
                        });
                        return Err(err);
                    }
                    self.emit(ProgressEvent::Polling {
                        id: id.to_string(),
                        status,
                        elapsed,
                    });
                    tokio::time::sleep(self.config.interval).await;
                }
            }
        }
    }

    /// Wait for the outcome of a mutation applied to `item_id`
    ///
    /// Request-tracked mutations are polled by the id of the request they
    /// returned; if the API returned none there is nothing to wait for. State and
    /// existence completion poll the item itself.
    ///
    /// Returns `Ok(true)` when the mutation was observed to complete and
    /// `Ok(false)` when no wait took place.
    pub async fn wait_for_mutation(
        &self,
        interrogator: &dyn Interrogator,
        item_id: &str,
        request: Option<&AsyncRequest>,
    ) -> Result<bool> {
        if !self.config.enabled {
            return Ok(false);
        }
        let id = match interrogator.model() {
            CompletionModel::Request => match request {
                Some(request) => request.request_id.as_str(),
                None => {
                    warn!("No request id returned for {}, not waiting", item_id);
                    return Ok(false);
                }
            },
            CompletionModel::State | CompletionModel::Existence => item_id,
        };
        self.poll(interrogator, id).await?;
        Ok(true)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(cb) = &self.on_progress {
            cb(event);
        }
    }
}

/// Poll without progress reporting
pub async fn poll(config: &PollConfig, interrogator: &dyn Interrogator, id: &str) -> Result<()> {
    Poller::new(*config).poll(interrogator, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays scripted answers, repeating the last one forever
    struct Scripted {
        answers: Mutex<VecDeque<Result<Check>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<Check>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn pending(status: &str) -> Result<Check> {
        Ok(Check::Pending {
            status: status.to_string(),
        })
    }

    fn duplicate(answer: &Result<Check>) -> Result<Check> {
        match answer {
            Ok(check) => Ok(check.clone()),
            Err(e) => Err(CoreError::Validation(e.to_string())),
        }
    }

    #[async_trait]
    impl Interrogator for Scripted {
        fn model(&self) -> CompletionModel {
            CompletionModel::Request
        }

        async fn check(&self, _id: &str) -> Result<Check> {
            self.calls.lock().unwrap().push(Instant::now());
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop_front().unwrap()
            } else {
                duplicate(answers.front().unwrap())
            }
        }
    }

    fn enabled(timeout_secs: u64, interval_secs: u64) -> PollConfig {
        PollConfig::new(true, Duration::from_secs(timeout_secs))
            .with_interval(Duration::from_secs(interval_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_config_never_checks() {
        let interrogator = Scripted::new(vec![pending("RUNNING")]);
        let result = poll(&PollConfig::disabled(), &interrogator, "req-1").await;
        assert!(result.is_ok());
        assert!(interrogator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_running_done_succeeds_with_interval_spacing() {
        let interrogator = Scripted::new(vec![
            pending("RUNNING"),
            pending("RUNNING"),
            Ok(Check::Succeeded),
        ]);
        poll(&enabled(60, 2), &interrogator, "req-1").await.unwrap();

        let calls = interrogator.calls();
        assert!(calls.len() >= 3);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_finishing_times_out_with_configured_timeout() {
        let interrogator = Scripted::new(vec![pending("RUNNING")]);
        let err = poll(&enabled(10, 1), &interrogator, "req-1")
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        let msg = err.to_string();
        assert!(msg.contains("req-1"), "{msg}");
        assert!(msg.contains("10s"), "{msg}");
        assert_eq!(interrogator.calls().len(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_on_first_check_returns_without_sleeping() {
        let interrogator = Scripted::new(vec![Ok(Check::Failed {
            status: "FAILED".to_string(),
            message: Some("quota exceeded".to_string()),
        })]);
        let start = Instant::now();
        let err = poll(&enabled(60, 5), &interrogator, "req-9")
            .await
            .unwrap_err();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(interrogator.calls().len(), 1);
        assert!(matches!(err, CoreError::OperationFailed { .. }));
        let msg = err.to_string();
        assert!(msg.contains("req-9"));
        assert!(msg.contains("FAILED"));
        assert!(msg.contains("quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_returned_immediately() {
        let interrogator = Scripted::new(vec![
            pending("QUEUED"),
            Err(CoreError::Api(ApiError::Status {
                code: 500,
                message: "internal".to_string(),
            })),
            Ok(Check::Succeeded),
        ]);
        let err = poll(&enabled(60, 1), &interrogator, "req-1")
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert_eq!(interrogator.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_checks_once() {
        let interrogator = Scripted::new(vec![pending("RUNNING")]);
        let err = poll(&enabled(0, 1), &interrogator, "req-1")
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(interrogator.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events_are_emitted_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let poller = Poller::new(enabled(60, 1)).with_progress(Box::new(move |event| {
            let label = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::Polling { status, .. } => format!("polling:{status}"),
                ProgressEvent::Completed { .. } => "completed".to_string(),
                ProgressEvent::Failed { .. } => "failed".to_string(),
            };
            sink.lock().unwrap().push(label);
        }));
        let interrogator = Scripted::new(vec![pending("QUEUED"), Ok(Check::Succeeded)]);

        poller.poll(&interrogator, "req-1").await.unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec!["started", "polling:QUEUED", "completed"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_mutation_polls_request_id() {
        let interrogator = Scripted::new(vec![Ok(Check::Succeeded)]);
        let request = AsyncRequest::new("req-7");
        let completed = Poller::new(enabled(60, 1))
            .wait_for_mutation(&interrogator, "lb-1", Some(&request))
            .await
            .unwrap();
        assert!(completed);
        assert_eq!(interrogator.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_mutation_without_request_does_not_poll() {
        let interrogator = Scripted::new(vec![pending("RUNNING")]);
        let completed = Poller::new(enabled(60, 1))
            .wait_for_mutation(&interrogator, "lb-1", None)
            .await
            .unwrap();
        assert!(!completed);
        assert!(interrogator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_mutation_reports_disabled_wait() {
        let interrogator = Scripted::new(vec![Ok(Check::Succeeded)]);
        let request = AsyncRequest::new("req-7");
        let completed = Poller::new(PollConfig::disabled())
            .wait_for_mutation(&interrogator, "lb-1", Some(&request))
            .await
            .unwrap();
        assert!(!completed);
        assert!(interrogator.calls().is_empty());
    }
}
