// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic resource wrapper: a kind descriptor plus fields, driven through `Api<DynamicObject>`.

pub mod builders;
pub mod kinds;
pub mod object;
pub mod options;
pub mod payload;
pub mod wait;

pub use kinds::{lookup, Body, KindDescriptor, ResolvedKind};
pub use object::{Resource, ResourceBuilder};
pub use options::ResourceOptions;

use crate::error::Result;
use kube::api::{DynamicObject, ListParams};
use kube::{Api, Client};
use tracing::instrument;

/// List objects of `kind`, in one namespace or across the cluster
#[instrument(skip(client, kind, params), fields(kind = kind.kind))]
pub async fn list(
    client: &Client,
    kind: &KindDescriptor,
    namespace: Option<&str>,
    params: &ListParams,
) -> Result<Vec<DynamicObject>> {
    let ar = kind.api_resource();
    let api: Api<DynamicObject> = match namespace {
        Some(ns) if kind.is_namespaced() => Api::namespaced_with(client.clone(), ns, &ar),
        _ => Api::all_with(client.clone(), &ar),
    };
    Ok(api.list(params).await?.items)
}
