// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! A single cluster object: payload construction and create/update/delete.

use crate::conditions::status_phase;
use crate::constants::{FIELD_MANAGER, INSTANCE_RETRY_TIMEOUT, TIMEOUT_1SEC, TIMEOUT_4MINUTES};
use crate::error::{ResourceError, Result};
use crate::polling::{RetryTable, TimeoutSampler};
use crate::resource::kinds::{KindDescriptor, ResolvedKind};
use crate::resource::options::ResourceOptions;
use crate::resource::payload::{self, PayloadParts};
use futures::future::BoxFuture;
use futures::FutureExt;
use kube::api::{DeleteParams, DynamicObject, Patch, PatchParams, PostParams};
use kube::discovery::ApiResource;
use kube::{Api, Client};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Builder for [`Resource`]; `build` enforces the name/namespace invariants
pub struct ResourceBuilder {
    client: Client,
    kind: ResolvedKind,
    name: Option<String>,
    namespace: Option<String>,
    yaml_file: Option<PathBuf>,
    yaml_doc: Option<Value>,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    fields: Map<String, Value>,
    options: ResourceOptions,
}

impl ResourceBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Set a payload field; it lands under `spec` or at the top level depending on the kind
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Take the whole payload from a YAML file instead of from fields.
    ///
    /// The file is the complete payload: `build` rejects labels, annotations or fields
    /// set alongside it.
    pub fn yaml_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.yaml_file = Some(path.into());
        self
    }

    pub fn options(mut self, options: ResourceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Resource> {
        let yaml_doc = match (&self.yaml_doc, &self.yaml_file) {
            (Some(doc), _) => Some(doc.clone()),
            (None, Some(path)) => Some(payload::read_yaml_file(path)?),
            (None, None) => None,
        };

        let namespaced = self.kind.namespaced;
        let (name, namespace) = match &yaml_doc {
            Some(_)
                if !(self.labels.is_empty()
                    && self.annotations.is_empty()
                    && self.fields.is_empty()) =>
            {
                return Err(ResourceError::InvalidResource(
                    "labels, annotations and fields cannot be combined with a YAML payload"
                        .to_string(),
                ));
            }
            Some(doc) => {
                let doc_kind = payload::document_str(doc, "/kind");
                if doc_kind != Some(self.kind.api_resource.kind.as_str()) {
                    return Err(ResourceError::InvalidResource(format!(
                        "expected kind {}, payload declares {}",
                        self.kind.api_resource.kind,
                        doc_kind.unwrap_or("nothing")
                    )));
                }
                let name = payload::document_str(doc, "/metadata/name")
                    .ok_or_else(|| {
                        ResourceError::InvalidResource("payload has no metadata.name".to_string())
                    })?
                    .to_string();
                let namespace = payload::document_str(doc, "/metadata/namespace")
                    .map(str::to_string)
                    .or_else(|| self.namespace.clone());
                (name, namespace)
            }
            None => {
                let name = self.name.clone().filter(|n| !n.is_empty());
                let namespace = self.namespace.clone().filter(|n| !n.is_empty());
                match (name, namespace) {
                    (Some(name), namespace) if !namespaced => (name, namespace),
                    (Some(name), Some(namespace)) => (name, Some(namespace)),
                    (None, _) if !namespaced => return Err(ResourceError::missing_argument("name")),
                    _ => return Err(ResourceError::missing_argument("'name' and 'namespace'")),
                }
            }
        };

        if namespaced && namespace.is_none() {
            return Err(ResourceError::missing_argument("namespace"));
        }

        Ok(Resource {
            client: self.client,
            kind: self.kind,
            name,
            namespace: namespace.filter(|_| namespaced),
            yaml_file: self.yaml_file,
            yaml_doc,
            labels: self.labels,
            annotations: self.annotations,
            fields: self.fields,
            options: self.options,
            res: Value::Null,
            initial_resource_version: None,
        })
    }
}

/// One Kubernetes object, described in memory and driven through the dynamic API
pub struct Resource {
    client: Client,
    kind: ResolvedKind,
    name: String,
    namespace: Option<String>,
    yaml_file: Option<PathBuf>,
    yaml_doc: Option<Value>,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    fields: Map<String, Value>,
    pub(crate) options: ResourceOptions,
    res: Value,
    initial_resource_version: Option<String>,
}

impl Resource {
    pub fn builder(client: Client, kind: &KindDescriptor) -> ResourceBuilder {
        Self::builder_for(client, kind.into())
    }

    pub fn builder_for(client: Client, kind: ResolvedKind) -> ResourceBuilder {
        ResourceBuilder {
            client,
            kind,
            name: None,
            namespace: None,
            yaml_file: None,
            yaml_doc: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            fields: Map::new(),
            options: ResourceOptions::default(),
        }
    }

    /// Load a resource of any kind from a YAML file; kind, name and namespace come from the file
    pub fn from_yaml_file(client: Client, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_file_with(client, path, ResourceOptions::default())
    }

    pub fn from_yaml_file_with(
        client: Client,
        path: impl AsRef<Path>,
        options: ResourceOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let doc = payload::read_yaml_file(path)?;
        Self::from_document(client, doc, Some(path.to_path_buf()), options)
    }

    /// Build a resource from a complete payload, e.g. a serialized k8s-openapi object
    pub fn from_dict(client: Client, dict: Value, options: ResourceOptions) -> Result<Self> {
        Self::from_document(client, dict, None, options)
    }

    fn from_document(
        client: Client,
        doc: Value,
        yaml_file: Option<PathBuf>,
        options: ResourceOptions,
    ) -> Result<Self> {
        let api_version = payload::document_str(&doc, "/apiVersion")
            .ok_or_else(|| ResourceError::InvalidResource("payload has no apiVersion".to_string()))?;
        let kind = payload::document_str(&doc, "/kind")
            .ok_or_else(|| ResourceError::InvalidResource("payload has no kind".to_string()))?;
        let namespaced = payload::document_str(&doc, "/metadata/namespace").is_some();
        let resolved = ResolvedKind::for_api_version(api_version, kind, namespaced);

        let mut builder = Self::builder_for(client, resolved).options(options);
        builder.yaml_file = yaml_file;
        builder.yaml_doc = Some(doc);
        builder.build()
    }

    pub fn kind(&self) -> &str {
        &self.kind.api_resource.kind
    }

    pub fn api_version(&self) -> &str {
        &self.kind.api_resource.api_version
    }

    pub fn api_resource(&self) -> &ApiResource {
        &self.kind.api_resource
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn yaml_file(&self) -> Option<&Path> {
        self.yaml_file.as_deref()
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    /// `metadata.resourceVersion` returned by the create call
    pub fn initial_resource_version(&self) -> Option<&str> {
        self.initial_resource_version.as_deref()
    }

    /// The payload as last built by [`Resource::to_dict`]
    pub fn res(&self) -> &Value {
        &self.res
    }

    pub(crate) fn display(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{} {}/{}", self.kind(), ns, self.name),
            None => format!("{} {}", self.kind(), self.name),
        }
    }

    pub(crate) fn api(&self) -> Api<DynamicObject> {
        match &self.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &self.kind.api_resource),
            None => Api::all_with(self.client.clone(), &self.kind.api_resource),
        }
    }

    /// Build the REST payload. Never touches the network.
    pub fn to_dict(&mut self) -> Result<&Value> {
        self.res = match &self.yaml_doc {
            Some(doc) => {
                let mut doc = doc.clone();
                if let (Some(ns), Some(metadata)) = (
                    &self.namespace,
                    doc.get_mut("metadata").and_then(Value::as_object_mut),
                ) {
                    metadata
                        .entry("namespace")
                        .or_insert_with(|| Value::String(ns.clone()));
                }
                doc
            }
            None => payload::build(
                &self.kind,
                PayloadParts {
                    name: &self.name,
                    namespace: self.namespace.as_deref(),
                    labels: &self.labels,
                    annotations: &self.annotations,
                    fields: &self.fields,
                },
            )?,
        };
        Ok(&self.res)
    }

    pub fn to_yaml(&mut self) -> Result<String> {
        let payload = self.to_dict()?;
        Ok(serde_yaml::to_string(payload)?)
    }

    fn redacted_payload(&self) -> Value {
        payload::redacted(&self.res, self.kind.sensitive)
    }

    /// Create the object on the cluster, optionally waiting until it can be read back
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn create(&mut self, wait: bool) -> Result<DynamicObject> {
        self.to_dict()?;
        let body: DynamicObject = serde_json::from_value(self.res.clone())?;
        let redacted = self.redacted_payload();

        info!("Create {}", self.display());
        info!("Posting {}", redacted);
        debug!("\n{}", serde_yaml::to_string(&redacted).unwrap_or_default());

        let pp = PostParams {
            dry_run: self.options.dry_run,
            field_manager: Some(FIELD_MANAGER.to_string()),
        };
        let created = self.api().create(&pp, &body).await?;
        self.initial_resource_version = created.metadata.resource_version.clone();

        if wait && !self.options.dry_run {
            self.wait(TIMEOUT_4MINUTES, TIMEOUT_1SEC).await?;
        }
        Ok(created)
    }

    /// Create unless a matching object may be reused
    pub async fn deploy(&mut self, wait: bool) -> Result<()> {
        if let Some(matcher) = &self.options.reuse_if_exists {
            if matcher.matches(self.kind(), &self.name, self.namespace.as_deref())
                && self.exists().await?.is_some()
            {
                warn!(
                    "Skip resource {} creation, using existing one. Got {}",
                    self.display(),
                    matcher.describe()
                );
                return Ok(());
            }
        }

        self.create(wait).await?;
        Ok(())
    }

    /// Delete the object. Returns `false` when there was nothing to delete.
    #[instrument(skip(self), fields(resource = %self.display()))]
    pub async fn delete(&self, wait: bool, timeout: Duration) -> Result<bool> {
        info!("Delete {}", self.display());

        if self.exists().await?.is_none() {
            warn!("Resource {} was not found, and wasn't deleted", self.display());
            return Ok(false);
        }

        if !self.res.is_null() {
            info!("Deleting {}", self.redacted_payload());
        }

        match self.api().delete(&self.name, &DeleteParams::default()).await {
            Ok(_) => {}
            Err(kube::Error::Api(err)) if err.code == 404 => {
                warn!("Resource {} disappeared before deletion", self.display());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        if wait {
            self.wait_deleted(timeout).await?;
        }
        Ok(true)
    }

    /// Teardown entry point: honours `teardown` and the skip-teardown matcher
    pub async fn clean_up(&self, wait: bool) -> Result<bool> {
        if !self.options.teardown {
            info!("Teardown disabled for {}, leaving it in place", self.display());
            return Ok(true);
        }

        if let Some(matcher) = &self.options.skip_teardown {
            if matcher.matches(self.kind(), &self.name, self.namespace.as_deref()) {
                warn!(
                    "Skip resource {} teardown. Got {}",
                    self.display(),
                    matcher.describe()
                );
                return Ok(true);
            }
        }

        self.delete(wait, self.options.delete_timeout).await
    }

    /// Merge-patch the object
    #[instrument(skip(self, resource_dict), fields(resource = %self.display()))]
    pub async fn update(&self, resource_dict: &Value) -> Result<DynamicObject> {
        info!("Update {}", self.display());
        debug!("\n{}", serde_yaml::to_string(resource_dict).unwrap_or_default());

        let pp = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        Ok(self
            .api()
            .patch(&self.name, &pp, &Patch::Merge(resource_dict))
            .await?)
    }

    /// Replace the whole object; unlike a merge patch this can drop fields
    #[instrument(skip(self, resource_dict), fields(resource = %self.display()))]
    pub async fn update_replace(&self, resource_dict: &Value) -> Result<DynamicObject> {
        info!("Replace {}", self.display());
        let body: DynamicObject = serde_json::from_value(resource_dict.clone())?;
        let pp = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        Ok(self.api().replace(&self.name, &pp, &body).await?)
    }

    /// The live object, or `None` if the API server reports it missing
    pub async fn exists(&self) -> Result<Option<DynamicObject>> {
        Ok(self.api().get_opt(&self.name).await?)
    }

    /// GET the live object, retrying transport errors for a short while
    pub async fn instance(&self) -> Result<DynamicObject> {
        TimeoutSampler::new(INSTANCE_RETRY_TIMEOUT, TIMEOUT_1SEC, self.get_fn())
            .retry_on(RetryTable::protocol())
            .describe(format!("{} instance", self.display()))
            .wait_until(|_| true)
            .await
    }

    /// `status.phase` of the live object
    pub async fn status(&self) -> Result<Option<String>> {
        Ok(status_phase(&self.instance().await?))
    }

    pub(crate) fn get_fn(&self) -> impl FnMut() -> BoxFuture<'static, Result<DynamicObject>> {
        let api = self.api();
        let name = self.name.clone();
        move || {
            let api = api.clone();
            let name = name.clone();
            async move { api.get(&name).await.map_err(ResourceError::from) }.boxed()
        }
    }

    pub(crate) fn get_opt_fn(
        &self,
    ) -> impl FnMut() -> BoxFuture<'static, Result<Option<DynamicObject>>> {
        let api = self.api();
        let name = self.name.clone();
        move || {
            let api = api.clone();
            let name = name.clone();
            async move { api.get_opt(&name).await.map_err(ResourceError::from) }.boxed()
        }
    }
}
