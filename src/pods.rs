// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes pod access for the label synchronizer.
//!
//! The synchronizer only needs two operations: list the candidate pods and
//! patch the labels of one pod. [`PodClient`] captures exactly that, so the
//! convergence logic can run against an in-memory double in tests and against
//! the API server through [`KubePodClient`] in production.

use crate::constants::{FIELD_MANAGER, KUBE_LIST_PAGE_SIZE};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use tracing::debug;

/// Pod operations used by the synchronizer.
#[async_trait::async_trait]
pub trait PodClient: Send + Sync {
    /// List all pods in the target namespace matching `label_selector`.
    ///
    /// Pods are returned in the order the server lists them.
    ///
    /// # Errors
    ///
    /// Returns the Kubernetes API error if any page cannot be fetched.
    async fn list_pods(&self, label_selector: &str) -> Result<Vec<Pod>, kube::Error>;

    /// Apply a strategic-merge patch to one pod.
    ///
    /// # Errors
    ///
    /// Returns the Kubernetes API error if the patch is rejected.
    async fn patch_pod(&self, name: &str, patch: &Value) -> Result<(), kube::Error>;
}

/// [`PodClient`] backed by the Kubernetes API for a single namespace.
#[derive(Clone)]
pub struct KubePodClient {
    api: Api<Pod>,
}

impl KubePodClient {
    /// Create a client scoped to `namespace`.
    #[must_use]
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait::async_trait]
impl PodClient for KubePodClient {
    async fn list_pods(&self, label_selector: &str) -> Result<Vec<Pod>, kube::Error> {
        list_all_paginated(&self.api, ListParams::default().labels(label_selector)).await
    }

    async fn patch_pod(&self, name: &str, patch: &Value) -> Result<(), kube::Error> {
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..PatchParams::default()
        };

        self.api
            .patch(name, &params, &Patch::Strategic(patch))
            .await?;
        Ok(())
    }
}

/// List all resources with automatic pagination.
///
/// Fetches resources in pages to reduce memory usage and API server load.
/// Items keep the order in which the server returned them.
///
/// # Arguments
///
/// * `api` - Kubernetes API client for the resource type
/// * `list_params` - Base list parameters (labels, fields, etc.)
///
/// # Errors
///
/// Returns an error if any page request fails.
pub async fn list_all_paginated<K>(
    api: &Api<K>,
    mut list_params: ListParams,
) -> Result<Vec<K>, kube::Error>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match result.metadata.continue_ {
            Some(token) if !token.is_empty() => list_params.continue_token = Some(token),
            _ => break,
        }
    }

    Ok(all_items)
}
