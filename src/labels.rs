// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label keys and values written to candidate pods.
//!
//! Downstream selectors (Services, routing rules) match on these, so they are
//! part of the external contract and must not change.

/// Label carrying the replica set role of a pod
pub const PRIMARY_LABEL: &str = "primary";

/// Value for the pod currently elected primary
pub const PRIMARY_LABEL_TRUE: &str = "true";

/// Value for non-primary pods when labeling all pods is enabled
pub const PRIMARY_LABEL_FALSE: &str = "false";
