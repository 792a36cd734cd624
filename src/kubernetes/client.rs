// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from kubeconfig files, contexts and in-memory documents

use crate::error::{ResourceError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::Path;
use tracing::{debug, info, instrument};

fn options_for(context: Option<&str>) -> KubeConfigOptions {
    KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    }
}

/// Create a client from an optional kubeconfig path and context name.
///
/// With neither set the configuration is inferred: in-cluster service account first,
/// then `$KUBECONFIG` or `~/.kube/config`.
#[instrument]
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let config = match (kubeconfig, context) {
        (Some(path), _) => {
            info!("Loading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                ResourceError::KubeconfigError(format!(
                    "Failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            KConfig::from_custom_kubeconfig(kubeconfig, &options_for(context))
                .await
                .map_err(|e| {
                    ResourceError::KubeconfigError(format!("Failed to create config: {}", e))
                })?
        }
        (None, Some(_)) => KConfig::from_kubeconfig(&options_for(context))
            .await
            .map_err(|e| {
                ResourceError::KubeconfigError(format!("Failed to create config: {}", e))
            })?,
        (None, None) => KConfig::infer().await.map_err(|e| {
            ResourceError::KubeconfigError(format!("Failed to infer config: {}", e))
        })?,
    };

    debug!("Using cluster {}", config.cluster_url);
    Client::try_from(config)
        .map_err(|e| ResourceError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Create a Kubernetes client from a kubeconfig document held in memory
pub async fn create_client_from_kubeconfig(
    kubeconfig: &str,
    context: Option<&str>,
) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig).map_err(|e| {
        ResourceError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e))
    })?;

    let client_config = KConfig::from_custom_kubeconfig(kubeconfig_parsed, &options_for(context))
        .await
        .map_err(|e| ResourceError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| ResourceError::KubeconfigError(format!("Failed to create client: {}", e)))
}
