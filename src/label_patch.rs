// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired `primary` label state for a single pod.
//!
//! The intent is a three-state value rather than an `Option<String>` so that
//! patch construction stays exhaustive. Only [`PrimaryLabel::to_patch`] knows
//! the strategic-merge wire encoding:
//!
//! ```text
//! {"metadata": {"labels": {"primary": "true" | "false" | null}}}
//! ```
//!
//! A `null` value deletes the key under strategic-merge semantics.

use crate::labels::{PRIMARY_LABEL, PRIMARY_LABEL_FALSE, PRIMARY_LABEL_TRUE};
use k8s_openapi::api::core::v1::Pod;
use serde_json::{json, Value};

/// Desired `primary` label mutation for one pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryLabel {
    /// Set `primary="true"`
    True,
    /// Set `primary="false"`
    False,
    /// Remove the `primary` label
    Remove,
}

impl PrimaryLabel {
    /// Compute the desired label for a pod.
    ///
    /// # Arguments
    ///
    /// * `is_primary` - Whether the pod is the resolved primary
    /// * `label_all` - Whether non-primary pods get an explicit `false`
    #[must_use]
    pub fn desired(is_primary: bool, label_all: bool) -> Self {
        match (is_primary, label_all) {
            (true, _) => Self::True,
            (false, true) => Self::False,
            (false, false) => Self::Remove,
        }
    }

    /// Label value this intent leaves on the pod, `None` for removal.
    #[must_use]
    pub fn value(self) -> Option<&'static str> {
        match self {
            Self::True => Some(PRIMARY_LABEL_TRUE),
            Self::False => Some(PRIMARY_LABEL_FALSE),
            Self::Remove => None,
        }
    }

    /// Strategic-merge patch body applying this intent.
    #[must_use]
    pub fn to_patch(self) -> Value {
        json!({
            "metadata": {
                "labels": {
                    PRIMARY_LABEL: self.value(),
                }
            }
        })
    }

    /// Whether the pod already carries the state this intent describes.
    #[must_use]
    pub fn is_satisfied_by(self, pod: &Pod) -> bool {
        current_primary_label(pod) == self.value()
    }
}

/// Current value of the `primary` label on a pod, if any.
#[must_use]
pub fn current_primary_label(pod: &Pod) -> Option<&str> {
    pod.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(PRIMARY_LABEL))
        .map(String::as_str)
}

#[cfg(test)]
#[path = "label_patch_tests.rs"]
mod label_patch_tests;
