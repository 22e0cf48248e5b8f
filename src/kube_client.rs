// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes client construction.
//!
//! Inside a pod (`KUBERNETES_SERVICE_HOST` is set) the service account
//! credentials are used. Outside a cluster the client is built from a
//! kubeconfig file: the `--kubeconfig` path if given, otherwise
//! `$HOME/.kube/config`, otherwise whatever kube's default inference finds.

use crate::constants::ENV_KUBERNETES_SERVICE_HOST;
use crate::errors::ClientBootstrapError;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where Kubernetes credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSource {
    /// Service account token and CA mounted into the pod
    InCluster,
    /// An explicit kubeconfig file
    Kubeconfig(PathBuf),
    /// kube's own inference (`KUBECONFIG`, then in-cluster)
    Inferred,
}

impl ClientSource {
    /// Pick a source from the process environment.
    #[must_use]
    pub fn detect(kubeconfig: Option<&Path>) -> Self {
        Self::detect_with(kubeconfig, |key| std::env::var_os(key))
    }

    /// Pick a source using an arbitrary environment lookup.
    #[must_use]
    pub fn detect_with<F>(kubeconfig: Option<&Path>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if lookup(ENV_KUBERNETES_SERVICE_HOST).is_some() {
            return Self::InCluster;
        }

        if let Some(path) = kubeconfig {
            return Self::Kubeconfig(path.to_path_buf());
        }

        let home = lookup("HOME")
            .filter(|home| !home.is_empty())
            .or_else(|| lookup("USERPROFILE"));
        if let Some(home) = home {
            let path = PathBuf::from(home).join(".kube").join("config");
            if path.is_file() {
                return Self::Kubeconfig(path);
            }
        }

        Self::Inferred
    }
}

/// Build a Kubernetes client from `source`.
///
/// # Errors
///
/// Returns a [`ClientBootstrapError`] if the credentials cannot be loaded or
/// the client cannot be created. Callers treat this as fatal.
pub async fn build_client(source: &ClientSource) -> Result<Client, ClientBootstrapError> {
    install_crypto_provider();

    let config = match source {
        ClientSource::InCluster => {
            debug!("Loading in-cluster Kubernetes configuration");
            kube::Config::incluster().map_err(ClientBootstrapError::InCluster)?
        }
        ClientSource::Kubeconfig(path) => {
            debug!(path = %path.display(), "Loading kubeconfig");
            let kubeconfig_error = |source| ClientBootstrapError::Kubeconfig {
                path: path.clone(),
                source,
            };
            let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)?
        }
        ClientSource::Inferred => {
            debug!("Inferring Kubernetes configuration");
            kube::Config::infer()
                .await
                .map_err(ClientBootstrapError::Infer)?
        }
    };

    Client::try_from(config).map_err(ClientBootstrapError::Client)
}

/// Install ring as the process-wide rustls provider if none is set yet.
pub fn install_crypto_provider() {
    // Err only means a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[cfg(test)]
#[path = "kube_client_tests.rs"]
mod kube_client_tests;
