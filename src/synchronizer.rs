// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pod label convergence.
//!
//! # Sync Passes
//!
//! Each call to [`LabelSynchronizer::sync`] runs two passes over one listing:
//!
//! 1. **Detection** (read-only) - list candidate pods and confirm the resolved
//!    primary is among them. If it is not, the sync fails with
//!    [`SyncError::PrimaryNotFound`] and no pod is touched.
//! 2. **Convergence** - patch every candidate, in listing order, with its
//!    desired `primary` label (see [`PrimaryLabel::desired`]).
//!
//! Patches are issued one at a time and the pass stops at the first failure.
//! Pods patched before the failure keep their new labels: every patch is
//! idempotent, so the next cycle finishes the job. Convergence is eventual,
//! not atomic.

use crate::config::Config;
use crate::errors::SyncError;
use crate::label_patch::{current_primary_label, PrimaryLabel};
use crate::labels::PRIMARY_LABEL_TRUE;
use crate::pods::PodClient;
use crate::resolver::PrimaryIdentity;
use kube::ResourceExt;
use std::time::Duration;
use tracing::{debug, info};

/// Settings for one synchronizer, taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Namespace of the candidate pods
    pub namespace: String,
    /// Candidate pod selector
    pub label_selector: String,
    /// Write `primary=false` on non-primary pods instead of removing the label
    pub label_all: bool,
    /// Bound for the whole list+patch pass
    pub request_timeout: Duration,
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self {
            namespace: config.namespace.clone(),
            label_selector: config.label_selector.clone(),
            label_all: config.label_all,
            request_timeout: config.k8s_request_timeout,
        }
    }
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Candidate pods matched by the selector
    pub pods_listed: usize,
    /// Patches issued (no-op patches included)
    pub pods_patched: usize,
    /// Whether the primary pod did not already carry `primary=true`
    pub primary_changed: bool,
}

/// Converges the `primary` label of candidate pods onto the resolved primary.
pub struct LabelSynchronizer<C> {
    pods: C,
    settings: SyncSettings,
}

impl<C: PodClient> LabelSynchronizer<C> {
    /// Create a synchronizer over `pods`.
    #[must_use]
    pub fn new(pods: C, settings: SyncSettings) -> Self {
        Self { pods, settings }
    }

    /// Settings this synchronizer runs with.
    #[must_use]
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Pod client this synchronizer patches through.
    #[must_use]
    pub fn pods(&self) -> &C {
        &self.pods
    }

    /// Run detection then convergence for `primary`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::List`] - candidate pods could not be listed
    /// - [`SyncError::PrimaryNotFound`] - primary absent from candidates, nothing patched
    /// - [`SyncError::Patch`] - a patch failed, earlier pods already patched
    /// - [`SyncError::Timeout`] - the pass exceeded the request timeout
    pub async fn sync(&self, primary: &PrimaryIdentity) -> Result<SyncSummary, SyncError> {
        tokio::time::timeout(self.settings.request_timeout, self.converge(primary))
            .await
            .map_err(|_| SyncError::Timeout {
                namespace: self.settings.namespace.clone(),
                timeout: self.settings.request_timeout,
            })?
    }

    async fn converge(&self, primary: &PrimaryIdentity) -> Result<SyncSummary, SyncError> {
        let settings = &self.settings;

        let pods = self
            .pods
            .list_pods(&settings.label_selector)
            .await
            .map_err(|source| SyncError::List {
                namespace: settings.namespace.clone(),
                selector: settings.label_selector.clone(),
                source,
            })?;
        debug!(
            namespace = %settings.namespace,
            selector = %settings.label_selector,
            count = pods.len(),
            "Found pods"
        );

        if !pods.iter().any(|pod| pod.name_any() == primary.as_str()) {
            return Err(SyncError::PrimaryNotFound {
                primary: primary.to_string(),
                namespace: settings.namespace.clone(),
                selector: settings.label_selector.clone(),
            });
        }

        let mut summary = SyncSummary {
            pods_listed: pods.len(),
            ..SyncSummary::default()
        };

        for pod in &pods {
            let name = pod.name_any();
            let is_primary = name == primary.as_str();
            let desired = PrimaryLabel::desired(is_primary, settings.label_all);

            if is_primary && current_primary_label(pod) != Some(PRIMARY_LABEL_TRUE) {
                info!(pod = %name, namespace = %settings.namespace, "Setting primary to true");
                summary.primary_changed = true;
            }

            let patch = desired.to_patch();
            debug!(pod = %name, patch = %patch, "Patching pod");

            self.pods
                .patch_pod(&name, &patch)
                .await
                .map_err(|source| SyncError::Patch {
                    pod: name.clone(),
                    namespace: settings.namespace.clone(),
                    source,
                })?;
            summary.pods_patched += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
#[path = "synchronizer_tests.rs"]
mod synchronizer_tests;
