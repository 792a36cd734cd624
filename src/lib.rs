// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Thin, test-friendly wrappers around Kubernetes and OpenShift objects:
//! a polling primitive with per-error retry rules, and a generic resource
//! with create/delete/update and wait helpers.

pub mod conditions;
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod logging;
pub mod polling;
pub mod resource;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ResourceError, Result};
pub use polling::{ErrorClass, RetryTable, TimeoutSampler, TimeoutWatch};
pub use resource::{Resource, ResourceBuilder, ResourceOptions};
