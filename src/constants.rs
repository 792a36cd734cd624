// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;

pub const TIMEOUT_1SEC: Duration = Duration::from_secs(1);
pub const TIMEOUT_5SEC: Duration = Duration::from_secs(5);
pub const TIMEOUT_10SEC: Duration = Duration::from_secs(10);
pub const TIMEOUT_30SEC: Duration = Duration::from_secs(30);
pub const TIMEOUT_1MINUTE: Duration = Duration::from_secs(60);
pub const TIMEOUT_2MINUTES: Duration = Duration::from_secs(2 * 60);
pub const TIMEOUT_4MINUTES: Duration = Duration::from_secs(4 * 60);
pub const TIMEOUT_10MINUTES: Duration = Duration::from_secs(10 * 60);

/// Budget for `Resource::instance`, which only retries transport errors
pub const INSTANCE_RETRY_TIMEOUT: Duration = TIMEOUT_10SEC;

/// Field manager recorded on patches issued by this crate
pub const FIELD_MANAGER: &str = "ocp-resources";

/// Replacement for sensitive values in logged payloads
pub const REDACTED: &str = "*******";

/// Common `status.phase` values
pub mod status {
    pub const PENDING: &str = "Pending";
    pub const RUNNING: &str = "Running";
    pub const SUCCEEDED: &str = "Succeeded";
    pub const FAILED: &str = "Failed";
    pub const UNKNOWN: &str = "Unknown";
    pub const ACTIVE: &str = "Active";
    pub const BOUND: &str = "Bound";
    pub const TERMINATING: &str = "Terminating";
}

/// Common condition types and statuses
pub mod condition {
    pub const READY: &str = "Ready";
    pub const AVAILABLE: &str = "Available";
    pub const PROGRESSING: &str = "Progressing";
    pub const DEGRADED: &str = "Degraded";
    pub const SUCCEEDED: &str = "Succeeded";
    pub const FAILED: &str = "Failed";

    pub mod status {
        pub const TRUE: &str = "True";
        pub const FALSE: &str = "False";
        pub const UNKNOWN: &str = "Unknown";
    }
}
