// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::{Config, ResourceMatcher};
use crate::constants::TIMEOUT_4MINUTES;
use std::time::Duration;

/// Per-resource behaviour switches, passed explicitly instead of read from the environment
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    /// When false, `clean_up` leaves the object on the cluster
    pub teardown: bool,
    pub delete_timeout: Duration,
    /// Submit creates with `dryRun=All`
    pub dry_run: bool,
    pub reuse_if_exists: Option<ResourceMatcher>,
    pub skip_teardown: Option<ResourceMatcher>,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            teardown: true,
            delete_timeout: TIMEOUT_4MINUTES,
            dry_run: false,
            reuse_if_exists: None,
            skip_teardown: None,
        }
    }
}

impl ResourceOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reuse_if_exists: config.reuse_if_resource_exists.clone(),
            skip_teardown: config.skip_resource_teardown.clone(),
            ..Default::default()
        }
    }
}
