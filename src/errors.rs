// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the MongoDB primary labeler.
//!
//! Errors fall into two groups:
//! - **Fatal, pre-loop**: [`ConfigError`] and [`ClientBootstrapError`]. These stop
//!   the process with a non-zero exit code before the reconciliation loop starts.
//! - **Recoverable**: [`ResolveError`] and [`SyncError`], wrapped by
//!   [`ReconcileError`]. The scheduler logs them and retries on the next tick.
//!
//! Every recoverable error carries enough context (address, namespace, selector,
//! pod name) to diagnose the failure without retrying, and exposes a stable
//! `reason()` tag that is emitted as a structured log field.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `LABEL_SELECTOR` is required and was not exported
    #[error("please export LABEL_SELECTOR")]
    MissingLabelSelector,

    /// A boolean variable held something other than an accepted boolean spelling
    #[error("invalid {key} value '{value}': expected a boolean")]
    InvalidBool {
        /// Environment variable name
        key: &'static str,
        /// Raw value found in the environment
        value: String,
    },

    /// A duration variable could not be parsed
    #[error("invalid {key} value '{value}': {reason}")]
    InvalidDuration {
        /// Environment variable name
        key: &'static str,
        /// Raw value found in the environment
        value: String,
        /// Parser explanation
        reason: String,
    },
}

/// Errors raised while constructing the Kubernetes client.
#[derive(Error, Debug)]
pub enum ClientBootstrapError {
    /// In-cluster service account configuration could not be loaded
    #[error("failed to load in-cluster Kubernetes configuration: {0}")]
    InCluster(#[source] kube::config::InClusterError),

    /// A kubeconfig file could not be read or interpreted
    #[error("failed to load kubeconfig from {}: {source}", path.display())]
    Kubeconfig {
        /// Path of the kubeconfig file
        path: PathBuf,
        /// Underlying kubeconfig error
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// Neither in-cluster nor default kubeconfig sources produced a configuration
    #[error("failed to infer Kubernetes configuration: {0}")]
    Infer(#[source] kube::config::InferConfigError),

    /// A client could not be built from an otherwise valid configuration
    #[error("failed to create Kubernetes client: {0}")]
    Client(#[source] kube::Error),
}

/// Errors raised while resolving the replica set primary.
///
/// Connectivity failures (`Connect`, `Ping`, `Timeout`) are kept distinct from
/// resolution failures (`Handshake`, `MissingPrimary`, `InvalidPrimaryHost`,
/// `EmptyIdentity`) for diagnostics.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The client could not be configured or created for the address
    #[error("failed to connect to MongoDB at '{address}': {source}")]
    Connect {
        /// Configured replica set member address
        address: String,
        /// Driver error
        #[source]
        source: mongodb::error::Error,
    },

    /// The member did not answer the liveness ping
    #[error("failed to ping MongoDB at '{address}': {source}")]
    Ping {
        /// Configured replica set member address
        address: String,
        /// Driver error
        #[source]
        source: mongodb::error::Error,
    },

    /// The `hello` command failed or its reply could not be decoded
    #[error("failed to run hello command on MongoDB at '{address}': {reason}")]
    Handshake {
        /// Configured replica set member address
        address: String,
        /// Driver or decoding error text
        reason: String,
    },

    /// The reply named no primary and the answering member is not writable
    #[error("MongoDB at '{address}' did not report a primary")]
    MissingPrimary {
        /// Configured replica set member address
        address: String,
    },

    /// The reported primary address is not of the form `host:port`
    #[error("invalid primary host '{host}': {reason}")]
    InvalidPrimaryHost {
        /// Reported primary address
        host: String,
        /// Why the address was rejected
        reason: String,
    },

    /// The host part yielded an empty pod name
    #[error("unable to derive primary pod name from host '{host}'")]
    EmptyIdentity {
        /// Host part of the reported primary address
        host: String,
    },

    /// The connect/ping/hello exchange exceeded its deadline
    #[error("timed out after {timeout:?} resolving primary from MongoDB at '{address}'")]
    Timeout {
        /// Configured replica set member address
        address: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },
}

impl ResolveError {
    /// Stable reason tag for structured logging.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "MongoConnectFailed",
            Self::Ping { .. } => "MongoPingFailed",
            Self::Handshake { .. } => "MongoHandshakeFailed",
            Self::MissingPrimary { .. } => "PrimaryNotReported",
            Self::InvalidPrimaryHost { .. } => "InvalidPrimaryHost",
            Self::EmptyIdentity { .. } => "EmptyPrimaryIdentity",
            Self::Timeout { .. } => "MongoTimeout",
        }
    }

    /// Returns `true` for failures to reach the replica set at all.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Ping { .. } | Self::Timeout { .. }
        )
    }
}

/// Errors raised while converging pod labels.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Listing candidate pods failed
    #[error("failed to list pods in namespace '{namespace}' with selector '{selector}': {source}")]
    List {
        /// Target namespace
        namespace: String,
        /// Candidate label selector
        selector: String,
        /// Kubernetes API error
        #[source]
        source: kube::Error,
    },

    /// The resolved primary is not among the candidate pods; nothing was patched
    #[error(
        "primary not found: pod '{primary}' is not among pods matching '{selector}' in namespace '{namespace}'"
    )]
    PrimaryNotFound {
        /// Resolved primary identity
        primary: String,
        /// Target namespace
        namespace: String,
        /// Candidate label selector
        selector: String,
    },

    /// Patching one pod failed; pods earlier in listing order were already patched
    #[error("failed to patch primary label on pod '{pod}' in namespace '{namespace}': {source}")]
    Patch {
        /// Pod whose patch failed
        pod: String,
        /// Target namespace
        namespace: String,
        /// Kubernetes API error
        #[source]
        source: kube::Error,
    },

    /// The list+patch pass exceeded the configured request timeout
    #[error("timed out after {timeout:?} syncing primary label in namespace '{namespace}'")]
    Timeout {
        /// Target namespace
        namespace: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },
}

impl SyncError {
    /// Stable reason tag for structured logging.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::List { .. } => "PodListFailed",
            Self::PrimaryNotFound { .. } => "PrimaryNotFound",
            Self::Patch { .. } => "PodPatchFailed",
            Self::Timeout { .. } => "KubernetesTimeout",
        }
    }

    /// Returns `true` if some pods may have been patched before the failure.
    #[must_use]
    pub fn may_have_partially_applied(&self) -> bool {
        matches!(self, Self::Patch { .. } | Self::Timeout { .. })
    }
}

/// Failure of one reconciliation cycle, as seen by the scheduler.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The primary could not be resolved; sync was not attempted
    #[error("resolve primary pod name: {0}")]
    Resolve(#[from] ResolveError),

    /// The primary was resolved but labels could not be converged
    #[error("sync primary label: {0}")]
    Sync(#[from] SyncError),
}

impl ReconcileError {
    /// Stable reason tag for structured logging.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Resolve(e) => e.reason(),
            Self::Sync(e) => e.reason(),
        }
    }

    /// Returns `true` if the cycle may have left some pods patched.
    #[must_use]
    pub fn may_have_partially_applied(&self) -> bool {
        matches!(self, Self::Sync(e) if e.may_have_partially_applied())
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
