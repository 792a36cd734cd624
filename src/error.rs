// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Missing required argument: {argument}")]
    MissingRequiredArgument { argument: String },

    #[error("Timed out: {message}{}", describe_last_error(.last_error))]
    TimeoutExpired {
        message: String,
        #[source]
        last_error: Option<Box<ResourceError>>,
    },

    #[error("Watch failed: {0}")]
    WatchError(#[from] kube_runtime::wait::Error),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ResourceError {
    pub fn missing_argument(argument: impl Into<String>) -> Self {
        ResourceError::MissingRequiredArgument {
            argument: argument.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        ResourceError::TimeoutExpired {
            message: message.into(),
            last_error: None,
        }
    }

    /// True for a 404 response from the API server
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }
}

fn describe_last_error(last_error: &Option<Box<ResourceError>>) -> String {
    match last_error {
        Some(err) => format!(
            " (last error: {}: {})",
            crate::polling::ErrorClass::of(err),
            err
        ),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;
