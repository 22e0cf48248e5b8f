// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared fixtures for unit tests.

use crate::labels::PRIMARY_LABEL;
use crate::errors::ResolveError;
use crate::pods::PodClient;
use crate::resolver::{PrimaryIdentity, PrimaryResolver};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Build a candidate pod labeled `role=mongo`, optionally carrying a `primary` label.
pub(crate) fn pod(name: &str, primary: Option<&str>) -> Pod {
    let mut labels = BTreeMap::from([("role".to_string(), "mongo".to_string())]);
    if let Some(value) = primary {
        labels.insert(PRIMARY_LABEL.to_string(), value.to_string());
    }

    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Build a Kubernetes API error with the given HTTP status code.
pub(crate) fn api_error(code: u16, message: &str) -> kube::Error {
    kube::Error::Api(
        kube::core::Status::failure(message, "InternalError")
            .with_code(code)
            .boxed(),
    )
}

/// In-memory [`PodClient`] that applies strategic-merge label patches and
/// records every call.
#[derive(Default)]
pub(crate) struct InMemoryPods {
    pods: Mutex<Vec<Pod>>,
    patches: Mutex<Vec<(String, Value)>>,
    list_calls: AtomicUsize,
    fail_patch_for: Option<String>,
    fail_list: bool,
    list_delay: Option<Duration>,
}

impl InMemoryPods {
    /// Unlabeled pods with the given names, listed in that order.
    pub(crate) fn with_pods(names: &[&str]) -> Self {
        Self::from_pods(names.iter().map(|name| pod(name, None)).collect())
    }

    pub(crate) fn from_pods(pods: Vec<Pod>) -> Self {
        Self {
            pods: Mutex::new(pods),
            ..Self::default()
        }
    }

    /// Reject the patch for `name` with an HTTP 500.
    pub(crate) fn failing_patch_for(mut self, name: &str) -> Self {
        self.fail_patch_for = Some(name.to_string());
        self
    }

    /// Reject every list call with an HTTP 503.
    pub(crate) fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Delay every list call.
    pub(crate) fn slow_list(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Names of patched pods in call order, failed attempts included.
    pub(crate) fn patched_pods(&self) -> Vec<String> {
        self.patches
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Patch bodies keyed by pod name (last patch wins).
    pub(crate) fn patch_bodies(&self) -> BTreeMap<String, Value> {
        self.patches.lock().unwrap().iter().cloned().collect()
    }

    /// Current `primary` label of every pod.
    pub(crate) fn primary_labels(&self) -> BTreeMap<String, Option<String>> {
        self.pods
            .lock()
            .unwrap()
            .iter()
            .map(|pod| {
                let value = pod
                    .metadata
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get(PRIMARY_LABEL))
                    .cloned();
                (pod.metadata.name.clone().unwrap_or_default(), value)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl PodClient for InMemoryPods {
    async fn list_pods(&self, _label_selector: &str) -> Result<Vec<Pod>, kube::Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_list {
            return Err(api_error(503, "apiserver unavailable"));
        }
        Ok(self.pods.lock().unwrap().clone())
    }

    async fn patch_pod(&self, name: &str, patch: &Value) -> Result<(), kube::Error> {
        self.patches
            .lock()
            .unwrap()
            .push((name.to_string(), patch.clone()));

        if self.fail_patch_for.as_deref() == Some(name) {
            return Err(api_error(500, &format!("patch failed for {name}")));
        }

        let mut pods = self.pods.lock().unwrap();
        let pod = pods
            .iter_mut()
            .find(|pod| pod.metadata.name.as_deref() == Some(name))
            .ok_or_else(|| api_error(404, &format!("pods \"{name}\" not found")))?;

        let labels = pod.metadata.labels.get_or_insert_with(BTreeMap::new);
        if let Some(changes) = patch["metadata"]["labels"].as_object() {
            for (key, value) in changes {
                match value {
                    Value::Null => {
                        labels.remove(key);
                    }
                    Value::String(value) => {
                        labels.insert(key.clone(), value.clone());
                    }
                    other => {
                        return Err(api_error(422, &format!("invalid label value {other}")));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolver that always returns the same outcome.
///
/// Counts calls so callers can assert whether resolution happened.
#[derive(Debug)]
pub(crate) struct FixedPrimaryResolver {
    outcome: Result<PrimaryIdentity, ResolveError>,
    calls: AtomicUsize,
}

impl FixedPrimaryResolver {
    /// Always resolve to `primary`.
    #[must_use]
    pub(crate) fn primary(primary: PrimaryIdentity) -> Self {
        Self {
            outcome: Ok(primary),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub(crate) fn failing(error: ResolveError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `resolve` calls so far.
    #[must_use]
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PrimaryResolver for FixedPrimaryResolver {
    async fn resolve(&self) -> Result<PrimaryIdentity, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
