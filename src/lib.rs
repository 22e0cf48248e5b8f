// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # mongo-labeler - MongoDB primary labeler for Kubernetes
//!
//! mongo-labeler keeps a `primary` label on the pods of a MongoDB replica set
//! in step with the member that currently holds the primary role, so a
//! Kubernetes `Service` can select `primary=true` and always route writes to
//! the right pod.
//!
//! ## Overview
//!
//! Every few seconds the labeler:
//!
//! 1. Asks MongoDB (`hello`) which member is primary and reduces its host to a
//!    pod name.
//! 2. Lists the pods matching the configured label selector.
//! 3. Checks that the primary is among them before changing anything.
//! 4. Patches each pod whose `primary` label differs from the desired value.
//!
//! ## Modules
//!
//! - [`config`] - Environment configuration
//! - [`resolver`] - Primary discovery against MongoDB
//! - [`synchronizer`] - Label convergence over the pod set
//! - [`scheduler`] - The periodic reconciliation loop
//! - [`pods`] - Kubernetes pod access
//! - [`label_patch`] - Desired label state and patch bodies
//! - [`kube_client`] - Kubernetes client construction
//! - [`errors`] - Error types for every phase
//!
//! ## Example
//!
//! ```rust
//! use mongo_labeler::label_patch::PrimaryLabel;
//!
//! // Only the primary is labeled unless LABEL_ALL is set
//! assert_eq!(PrimaryLabel::desired(true, false), PrimaryLabel::True);
//! assert_eq!(PrimaryLabel::desired(false, false), PrimaryLabel::Remove);
//! assert_eq!(PrimaryLabel::desired(false, true), PrimaryLabel::False);
//! ```

pub mod config;
pub mod constants;
pub mod duration;
pub mod errors;
pub mod kube_client;
pub mod label_patch;
pub mod labels;
pub mod logging;
pub mod pods;
pub mod resolver;
pub mod scheduler;
pub mod synchronizer;

#[cfg(test)]
mod test_support;
