// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use tokio::time::Instant;

/// Tracks how much of a time budget is left since it was created.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutWatch {
    start: Instant,
    timeout: Duration,
}

impl TimeoutWatch {
    pub fn new(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Remaining part of the budget, zero once it is spent
    pub fn remaining_time(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_time().is_zero()
    }
}
