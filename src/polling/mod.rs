// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval polling with a time budget and a retryable-error table.

pub mod retry;
pub mod sampler;
pub mod watch;

pub use retry::{ErrorClass, RetryTable};
pub use sampler::TimeoutSampler;
pub use watch::TimeoutWatch;
