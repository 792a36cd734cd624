// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Static table of the resource kinds this crate knows how to build.

use kube::core::GroupVersionKind;
use kube::discovery::{ApiResource, Scope};

/// Where caller-supplied fields land in the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// Nested under `spec`
    Spec,
    /// Next to `metadata`, e.g. `data` on a Secret
    TopLevel,
}

#[derive(Debug)]
pub struct KindDescriptor {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
    pub scope: Scope,
    pub body: Body,
    /// Fields that must be set unless the payload comes from a YAML file
    pub required: &'static [&'static str],
    /// Top-level keys whose values are redacted when a payload is logged
    pub sensitive: &'static [&'static str],
}

impl KindDescriptor {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn is_namespaced(&self) -> bool {
        matches!(self.scope, Scope::Namespaced)
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk(self.group, self.version, self.kind),
            self.plural,
        )
    }
}

/// Kind information a resource carries around, resolved once at construction
#[derive(Debug, Clone)]
pub struct ResolvedKind {
    pub api_resource: ApiResource,
    pub namespaced: bool,
    pub body: Body,
    pub required: &'static [&'static str],
    pub sensitive: &'static [&'static str],
}

impl ResolvedKind {
    /// Resolve a kind from the table, or derive it from the apiVersion for unlisted kinds
    pub fn for_api_version(api_version: &str, kind: &str, namespaced: bool) -> Self {
        if let Some(descriptor) = lookup(Some(api_version), kind) {
            return descriptor.into();
        }
        let (group, version) = api_version.rsplit_once('/').unwrap_or(("", api_version));
        Self {
            api_resource: ApiResource::from_gvk(&GroupVersionKind::gvk(group, version, kind)),
            namespaced,
            body: Body::Spec,
            required: &[],
            sensitive: &[],
        }
    }
}

impl From<&KindDescriptor> for ResolvedKind {
    fn from(descriptor: &KindDescriptor) -> Self {
        Self {
            api_resource: descriptor.api_resource(),
            namespaced: descriptor.is_namespaced(),
            body: descriptor.body,
            required: descriptor.required,
            sensitive: descriptor.sensitive,
        }
    }
}

macro_rules! kind {
    ($ident:ident, $group:expr, $version:expr, $kind:expr, $plural:expr, $scope:ident, $body:ident) => {
        kind!($ident, $group, $version, $kind, $plural, $scope, $body, [], []);
    };
    ($ident:ident, $group:expr, $version:expr, $kind:expr, $plural:expr, $scope:ident, $body:ident, [$($req:expr),*]) => {
        kind!($ident, $group, $version, $kind, $plural, $scope, $body, [$($req),*], []);
    };
    ($ident:ident, $group:expr, $version:expr, $kind:expr, $plural:expr, $scope:ident, $body:ident, [$($req:expr),*], [$($sens:expr),*]) => {
        pub static $ident: KindDescriptor = KindDescriptor {
            group: $group,
            version: $version,
            kind: $kind,
            plural: $plural,
            scope: Scope::$scope,
            body: Body::$body,
            required: &[$($req),*],
            sensitive: &[$($sens),*],
        };
    };
}

kind!(NAMESPACE, "", "v1", "Namespace", "namespaces", Cluster, Spec);
kind!(POD, "", "v1", "Pod", "pods", Namespaced, Spec, ["containers"]);
kind!(SECRET, "", "v1", "Secret", "secrets", Namespaced, TopLevel, [], ["data", "stringData"]);
kind!(CONFIG_MAP, "", "v1", "ConfigMap", "configmaps", Namespaced, TopLevel);
kind!(SERVICE, "", "v1", "Service", "services", Namespaced, Spec);
kind!(RESOURCE_QUOTA, "", "v1", "ResourceQuota", "resourcequotas", Namespaced, Spec, ["hard"]);
kind!(PERSISTENT_VOLUME_CLAIM, "", "v1", "PersistentVolumeClaim", "persistentvolumeclaims", Namespaced, Spec);
kind!(DEPLOYMENT, "apps", "v1", "Deployment", "deployments", Namespaced, Spec, ["selector", "template"]);
kind!(STORAGE_CLASS, "storage.k8s.io", "v1", "StorageClass", "storageclasses", Cluster, TopLevel, ["provisioner"]);
kind!(PROJECT, "project.openshift.io", "v1", "Project", "projects", Cluster, Spec);
kind!(ROUTE, "route.openshift.io", "v1", "Route", "routes", Namespaced, Spec);
kind!(CDI_CONFIG, "cdi.kubevirt.io", "v1beta1", "CDIConfig", "cdiconfigs", Cluster, Spec);
kind!(DATA_VOLUME, "cdi.kubevirt.io", "v1beta1", "DataVolume", "datavolumes", Namespaced, Spec);
kind!(VIRTUAL_MACHINE, "kubevirt.io", "v1", "VirtualMachine", "virtualmachines", Namespaced, Spec);
kind!(PROVIDER, "forklift.konveyor.io", "v1beta1", "Provider", "providers", Namespaced, Spec);
kind!(PLAN, "forklift.konveyor.io", "v1beta1", "Plan", "plans", Namespaced, Spec);
kind!(MIGRATION, "forklift.konveyor.io", "v1beta1", "Migration", "migrations", Namespaced, Spec);

pub static KINDS: &[&KindDescriptor] = &[
    &NAMESPACE,
    &POD,
    &SECRET,
    &CONFIG_MAP,
    &SERVICE,
    &RESOURCE_QUOTA,
    &PERSISTENT_VOLUME_CLAIM,
    &DEPLOYMENT,
    &STORAGE_CLASS,
    &PROJECT,
    &ROUTE,
    &CDI_CONFIG,
    &DATA_VOLUME,
    &VIRTUAL_MACHINE,
    &PROVIDER,
    &PLAN,
    &MIGRATION,
];

/// Find a descriptor by kind, optionally pinned to an apiVersion
pub fn lookup(api_version: Option<&str>, kind: &str) -> Option<&'static KindDescriptor> {
    KINDS.iter().copied().find(|d| {
        d.kind == kind && api_version.map_or(true, |v| v == d.api_version())
    })
}
