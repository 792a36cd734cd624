// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Building REST payloads from fields or YAML files, and redacting them for logs.

use crate::constants::REDACTED;
use crate::error::{ResourceError, Result};
use crate::resource::kinds::{Body, ResolvedKind};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Read a single-document YAML file into a JSON value
pub fn read_yaml_file(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path).map_err(|source| ResourceError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut doc: Value = serde_yaml::from_str(&raw)?;
    if !doc.is_object() {
        return Err(ResourceError::InvalidResource(format!(
            "{} does not contain a YAML mapping",
            path.display()
        )));
    }

    // A stale resourceVersion would make the create call fail
    if let Some(metadata) = doc.get_mut("metadata").and_then(Value::as_object_mut) {
        metadata.remove("resourceVersion");
    }
    Ok(doc)
}

pub fn document_str<'a>(doc: &'a Value, pointer: &str) -> Option<&'a str> {
    doc.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Names of required fields that are absent, null, or empty
pub fn missing_fields(kind: &ResolvedKind, fields: &Map<String, Value>) -> Vec<&'static str> {
    kind.required
        .iter()
        .copied()
        .filter(|field| match fields.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Object(entries)) => entries.is_empty(),
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .collect()
}

pub struct PayloadParts<'a> {
    pub name: &'a str,
    pub namespace: Option<&'a str>,
    pub labels: &'a BTreeMap<String, String>,
    pub annotations: &'a BTreeMap<String, String>,
    pub fields: &'a Map<String, Value>,
}

/// Build `{apiVersion, kind, metadata, spec|fields}`, failing on missing required fields
pub fn build(kind: &ResolvedKind, parts: PayloadParts<'_>) -> Result<Value> {
    let missing = missing_fields(kind, parts.fields);
    if !missing.is_empty() {
        return Err(ResourceError::missing_argument(missing.join(", ")));
    }

    let mut metadata = Map::new();
    metadata.insert("name".to_string(), json!(parts.name));
    if kind.namespaced {
        if let Some(namespace) = parts.namespace {
            metadata.insert("namespace".to_string(), json!(namespace));
        }
    }
    if !parts.labels.is_empty() {
        metadata.insert("labels".to_string(), json!(parts.labels));
    }
    if !parts.annotations.is_empty() {
        metadata.insert("annotations".to_string(), json!(parts.annotations));
    }

    let mut payload = Map::new();
    payload.insert(
        "apiVersion".to_string(),
        json!(kind.api_resource.api_version),
    );
    payload.insert("kind".to_string(), json!(kind.api_resource.kind));
    payload.insert("metadata".to_string(), Value::Object(metadata));

    if !parts.fields.is_empty() {
        match kind.body {
            Body::Spec => {
                payload.insert("spec".to_string(), Value::Object(parts.fields.clone()));
            }
            Body::TopLevel => {
                for (key, value) in parts.fields {
                    payload.insert(key.clone(), value.clone());
                }
            }
        }
    }

    Ok(Value::Object(payload))
}

/// Copy of `payload` with the values under `sensitive` top-level keys masked
pub fn redacted(payload: &Value, sensitive: &[&str]) -> Value {
    let mut copy = payload.clone();
    if let Some(object) = copy.as_object_mut() {
        for key in sensitive {
            match object.get_mut(*key) {
                Some(Value::Object(entries)) => {
                    for value in entries.values_mut() {
                        *value = json!(REDACTED);
                    }
                }
                Some(value) if !value.is_null() => *value = json!(REDACTED),
                _ => {}
            }
        }
    }
    copy
}
