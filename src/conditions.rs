// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading `status.phase` and `status.conditions` from dynamic objects.

use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set by MTV (forklift) resources: Critical, Error, Warn, Advisory, Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// `status.phase`, if the object reports one
pub fn status_phase(obj: &DynamicObject) -> Option<String> {
    obj.data
        .get("status")
        .and_then(|s| s.get("phase"))
        .and_then(|p| p.as_str())
        .map(str::to_string)
}

/// Every well-formed entry of `status.conditions`; malformed entries are skipped
pub fn conditions(obj: &DynamicObject) -> Vec<Condition> {
    obj.data
        .get("status")
        .and_then(|s| s.get("conditions"))
        .and_then(|c| c.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|c| serde_json::from_value(c.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Check whether the object has a condition of `condition_type` with `status`
pub fn has_condition(obj: &DynamicObject, condition_type: &str, status: &str) -> bool {
    conditions(obj)
        .iter()
        .any(|c| c.condition_type == condition_type && c.status == status)
}

/// Condition filter; unset optional fields match anything
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionMatch {
    pub condition_type: String,
    pub status: String,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub category: Option<String>,
}

impl ConditionMatch {
    pub fn new(condition_type: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            condition_type: condition_type.into(),
            status: status.into(),
            message: None,
            reason: None,
            category: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, condition: &Condition) -> bool {
        fn optional(wanted: &Option<String>, actual: &Option<String>) -> bool {
            wanted.is_none() || wanted == actual
        }

        condition.condition_type == self.condition_type
            && condition.status == self.status
            && optional(&self.message, &condition.message)
            && optional(&self.reason, &condition.reason)
            && optional(&self.category, &condition.category)
    }

    pub fn matches_object(&self, obj: &DynamicObject) -> bool {
        conditions(obj).iter().any(|c| self.matches(c))
    }
}
