// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the MongoDB primary labeler.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Environment Variables
// ============================================================================

/// Label selector for candidate pods (required)
pub const ENV_LABEL_SELECTOR: &str = "LABEL_SELECTOR";

/// Namespace the candidate pods live in
pub const ENV_NAMESPACE: &str = "NAMESPACE";

/// Address of any reachable replica set member
pub const ENV_MONGO_ADDRESS: &str = "MONGO_ADDRESS";

/// Write `primary=false` on non-primary pods instead of removing the label
pub const ENV_LABEL_ALL: &str = "LABEL_ALL";

/// Raise log verbosity to debug
pub const ENV_DEBUG: &str = "DEBUG";

/// Upper bound for one list+patch pass against the Kubernetes API
pub const ENV_K8S_REQUEST_TIMEOUT: &str = "K8S_REQUEST_TIMEOUT";

/// Set by the kubelet in every pod; its presence selects in-cluster credentials
pub const ENV_KUBERNETES_SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";

/// Output format for logs (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Namespace used when `NAMESPACE` is not set
pub const DEFAULT_NAMESPACE: &str = "default";

/// Replica set member address used when `MONGO_ADDRESS` is not set
pub const DEFAULT_MONGO_ADDRESS: &str = "localhost:27017";

/// Default bound for Kubernetes API calls (10 seconds)
pub const DEFAULT_K8S_REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Timing Constants
// ============================================================================

/// Interval between reconciliation cycles (5 seconds)
pub const RECONCILE_INTERVAL_SECS: u64 = 5;

/// Bound for the whole connect/ping/hello exchange with MongoDB (20 seconds)
pub const MONGO_OPERATION_TIMEOUT_SECS: u64 = 20;

/// Headroom between the driver's own deadlines and the outer resolve bound (1 second)
///
/// The driver must give up first so its error, not a bare timeout, is reported.
pub const MONGO_DRIVER_TIMEOUT_MARGIN_MILLIS: u64 = 1_000;

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// Page size for Kubernetes list operations
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

/// Field manager name recorded on pod patches
pub const FIELD_MANAGER: &str = "mongo-labeler";

// ============================================================================
// MongoDB Constants
// ============================================================================

/// Database the handshake and ping commands run against
pub const MONGO_ADMIN_DATABASE: &str = "admin";

/// Application name reported to the MongoDB server
pub const MONGO_APP_NAME: &str = "mongo-labeler";
