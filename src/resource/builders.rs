// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Payload builders for the few kinds whose fields need more than a key/value copy.

use crate::error::{ResourceError, Result};
use crate::resource::kinds::{DATA_VOLUME, SECRET};
use crate::resource::object::Resource;
use crate::resource::options::ResourceOptions;
use kube::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub mod annotations {
    pub const PROVISION_ON_NODE: &str = "kubevirt.io/provisionOnNode";
    pub const MULTUS_NETWORKS: &str = "k8s.v1.cni.cncf.io/networks";
    pub const BIND_IMMEDIATE: &str = "cdi.kubevirt.io/storage.bindImmediateRequested";
}

/// Inputs for a CDI DataVolume
#[derive(Debug, Clone, Default)]
pub struct DataVolumeSpec {
    /// Source type: http, registry, s3, upload, blank, pvc, ...
    pub source: String,
    pub size: String,
    pub url: Option<String>,
    pub access_modes: Option<String>,
    pub volume_mode: Option<String>,
    pub content_type: Option<String>,
    pub storage_class: Option<String>,
    /// Name of the Secret holding source credentials
    pub secret: Option<String>,
    pub cert_configmap: Option<String>,
    pub source_pvc: Option<String>,
    pub source_namespace: Option<String>,
    pub hostpath_node: Option<String>,
    pub multus_annotation: Option<String>,
    pub bind_immediate: bool,
}

/// The `spec.source` mapping for a DataVolume.
///
/// `url` is written for every source type, not only http and registry. `upload` and
/// `blank` are then reset to an empty mapping and `pvc` is replaced by a name/namespace
/// reference.
pub fn data_volume_source(spec: &DataVolumeSpec, namespace: &str) -> Value {
    let mut entry = Map::new();
    if let Some(url) = &spec.url {
        entry.insert("url".to_string(), json!(url));
    }
    if let Some(secret) = &spec.secret {
        entry.insert("secretRef".to_string(), json!(secret));
    }
    if let Some(cert_configmap) = &spec.cert_configmap {
        entry.insert("certConfigMap".to_string(), json!(cert_configmap));
    }

    let entry = match spec.source.as_str() {
        "upload" | "blank" => json!({}),
        "pvc" => json!({
            "name": spec.source_pvc.as_deref().unwrap_or("dv-source"),
            "namespace": spec.source_namespace.as_deref().unwrap_or(namespace),
        }),
        _ => Value::Object(entry),
    };

    json!({ spec.source.clone(): entry })
}

pub fn data_volume(
    client: Client,
    name: &str,
    namespace: &str,
    spec: &DataVolumeSpec,
    options: ResourceOptions,
) -> Result<Resource> {
    if spec.source.is_empty() {
        return Err(ResourceError::missing_argument("source"));
    }
    if spec.size.is_empty() {
        return Err(ResourceError::missing_argument("size"));
    }

    let mut pvc = json!({ "resources": { "requests": { "storage": spec.size } } });
    if let Some(access_modes) = &spec.access_modes {
        pvc["accessModes"] = json!([access_modes]);
    }
    if let Some(volume_mode) = &spec.volume_mode {
        pvc["volumeMode"] = json!(volume_mode);
    }
    if let Some(storage_class) = &spec.storage_class {
        pvc["storageClassName"] = json!(storage_class);
    }

    let mut builder = Resource::builder(client, &DATA_VOLUME)
        .name(name)
        .namespace(namespace)
        .options(options)
        .field("source", data_volume_source(spec, namespace))
        .field("pvc", pvc);

    if let Some(content_type) = &spec.content_type {
        builder = builder.field("contentType", content_type.as_str());
    }
    if let Some(node) = &spec.hostpath_node {
        builder = builder.annotation(annotations::PROVISION_ON_NODE, node);
    }
    if let Some(networks) = &spec.multus_annotation {
        builder = builder.annotation(annotations::MULTUS_NETWORKS, networks);
    }
    if spec.bind_immediate {
        builder = builder.annotation(annotations::BIND_IMMEDIATE, "true");
    }

    builder.build()
}

/// Opaque Secret from plain-text values; they travel as `stringData`
pub fn secret(
    client: Client,
    name: &str,
    namespace: &str,
    string_data: &BTreeMap<String, String>,
    options: ResourceOptions,
) -> Result<Resource> {
    Resource::builder(client, &SECRET)
        .name(name)
        .namespace(namespace)
        .options(options)
        .field("type", "Opaque")
        .field("stringData", json!(string_data))
        .build()
}

/// Wrap a typed k8s-openapi object (or any `kube::Resource`) as a dynamic resource
pub fn from_typed<K>(client: Client, obj: &K, options: ResourceOptions) -> Result<Resource>
where
    K: kube::Resource<DynamicType = ()> + Serialize,
{
    let mut dict = serde_json::to_value(obj)?;
    if let Some(map) = dict.as_object_mut() {
        map.insert("apiVersion".to_string(), json!(K::api_version(&())));
        map.insert("kind".to_string(), json!(K::kind(&())));
    }
    Resource::from_dict(client, dict, options)
}
