//! Caller-supplied time limits for a workflow.
//!
//! A deadline that has passed before submission fails the workflow with
//! [`WorkflowError::DeadlineExceeded`] and nothing reaches the ledger. Once an
//! envelope is in flight, running out of time makes the outcome ambiguous.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::WorkflowError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No limit.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(duration: Duration) -> Self {
        Self(Some(Instant::now() + duration))
    }

    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Time left, or `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn check(&self) -> Result<(), WorkflowError> {
        if self.is_expired() {
            return Err(WorkflowError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Run a read (account load) under the deadline.
    pub(crate) async fn bound_read<T, F>(&self, fut: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        match self.0 {
            None => fut.await,
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| WorkflowError::DeadlineExceeded)?,
        }
    }

    /// Run a submission under the deadline. Expiry mid-flight is ambiguous.
    pub(crate) async fn bound_submit<T, F>(&self, fut: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        match self.0 {
            None => fut.await,
            Some(at) => tokio::time::timeout_at(at, fut).await.map_err(|_| {
                WorkflowError::Network {
                    message: "deadline elapsed while submission was in flight".into(),
                    ambiguous: true,
                }
            })?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_never_expires() {
        let d = Deadline::none();
        assert!(!d.is_expired());
        assert_eq!(d.remaining(), None);
        assert!(d.check().is_ok());
    }

    #[tokio::test]
    async fn past_deadline_fails_check() {
        let d = Deadline::at(Instant::now() - Duration::from_millis(1));
        assert!(d.is_expired());
        assert_eq!(d.remaining(), Some(Duration::ZERO));
        assert!(matches!(d.check(), Err(WorkflowError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_read_exceeds_deadline() {
        let d = Deadline::after(Duration::from_secs(1));
        let result = d
            .bound_read(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, WorkflowError>(())
            })
            .await;
        assert!(matches!(result, Err(WorkflowError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_submit_is_ambiguous() {
        let d = Deadline::after(Duration::from_secs(1));
        let result = d
            .bound_submit(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, WorkflowError>(())
            })
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::Network { ambiguous: true, .. })
        ));
    }

    #[tokio::test]
    async fn fast_operations_pass_through() {
        let d = Deadline::after(Duration::from_secs(30));
        let value = d.bound_submit(async { Ok::<_, WorkflowError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
