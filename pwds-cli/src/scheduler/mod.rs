//! Scheduler layer
//!
//! Drives a remote generation job from submission to a terminal state.
//! Polling is bounded by a deadline and/or attempt count, honours a
//! cancellation token, and retries transient errors per an explicit policy.

pub mod cancel;
pub mod poller;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::{CancelToken, cancel_channel};
pub use poller::{JobPoller, PollerConfig, PollerError};
pub use retry::RetryPolicy;
