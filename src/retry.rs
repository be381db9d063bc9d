//! Retry bookkeeping for get and set operations
//!
//! Every data point carries one [`RetryState`] for reads and, if writable,
//! one for writes. Attempts are counted when a request is sent and
//! cleared when the device answers. Once the ceiling is reached the
//! operation is suspended for the retry interval, then granted a single
//! attempt with a fresh counter.

use crate::core::FieldId;
use tracing::{info, warn};

/// Attempt ceiling used when the configuration does not override it
pub const DEFAULT_RETRY_CEILING: u8 = 5;

/// Backoff used when the configuration does not override it
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 15_000;

/// Limits shared by every retry state of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Attempts allowed before the operation is suspended
    pub ceiling: u8,
    /// Suspension time once the ceiling is reached
    pub retry_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            ceiling: DEFAULT_RETRY_CEILING,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

/// Which operation a retry state tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read request
    Get,
    /// Write request
    Set,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Get => f.write_str("get"),
            Operation::Set => f.write_str("set"),
        }
    }
}

/// Attempt counter and timers for one operation of one point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    operation: Operation,
    attempts: u8,
    next_eligible_at: u64,
    exhausted_since: Option<u64>,
    exhaustions: u32,
}

impl RetryState {
    /// Create a fresh state, eligible immediately
    pub fn new(operation: Operation) -> Self {
        RetryState {
            operation,
            attempts: 0,
            next_eligible_at: 0,
            exhausted_since: None,
            exhaustions: 0,
        }
    }

    /// Operation this state belongs to
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Attempts since the last success or backoff
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Earliest time of the next regular attempt
    pub fn next_eligible_at(&self) -> u64 {
        self.next_eligible_at
    }

    /// Start of the current suspension, if suspended
    pub fn exhausted_since(&self) -> Option<u64> {
        self.exhausted_since
    }

    /// Number of times the ceiling has been reached
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions
    }

    /// Whether an attempt may be made at `now`
    ///
    /// Past the ceiling this starts the suspension on first call, logging
    /// it once, and grants exactly one attempt when the interval has
    /// elapsed, resetting the counter.
    pub fn is_eligible(&mut self, now: u64, policy: &RetryPolicy, field_id: FieldId) -> bool {
        if self.attempts < policy.ceiling {
            return now >= self.next_eligible_at;
        }

        let since = self.record_exhaustion(now, policy, field_id);
        if now >= since.saturating_add(policy.retry_interval_ms) {
            info!(field_id = %field_id, op = %self.operation, "retrying after wait");
            self.attempts = 0;
            self.exhausted_since = None;
            return true;
        }
        false
    }

    /// Count a request that has been sent
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Clear the counter after the device answered
    pub fn record_success(&mut self) {
        self.attempts = 0;
        self.exhausted_since = None;
    }

    /// Mark the start of a suspension, returning its start time
    ///
    /// Only the first call of a suspension logs and counts.
    pub fn record_exhaustion(&mut self, now: u64, policy: &RetryPolicy, field_id: FieldId) -> u64 {
        if let Some(since) = self.exhausted_since {
            return since;
        }
        warn!(
            field_id = %field_id,
            op = %self.operation,
            wait_s = policy.retry_interval_ms as f64 / 1000.0,
            "retries exhausted, waiting before retry"
        );
        self.exhausted_since = Some(now);
        self.exhaustions += 1;
        now
    }

    /// Set the earliest time of the next regular attempt
    pub fn schedule(&mut self, at: u64) {
        self.next_eligible_at = at;
    }
}
