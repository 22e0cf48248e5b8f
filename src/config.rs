// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Environment-sourced configuration.
//!
//! | Variable | Effect | Default |
//! |---|---|---|
//! | `LABEL_SELECTOR` | candidate pod selector | required |
//! | `NAMESPACE` | namespace to list and patch | `default` |
//! | `MONGO_ADDRESS` | replica set member address | `localhost:27017` |
//! | `LABEL_ALL` | write `primary=false` instead of removing the label | `false` |
//! | `DEBUG` | log at debug level | `false` |
//! | `K8S_REQUEST_TIMEOUT` | bound on cluster API calls (e.g. `10s`) | `10s` |
//!
//! Configuration is read once at startup and is immutable afterwards.

use crate::constants::{
    DEFAULT_K8S_REQUEST_TIMEOUT_SECS, DEFAULT_MONGO_ADDRESS, DEFAULT_NAMESPACE, ENV_DEBUG,
    ENV_K8S_REQUEST_TIMEOUT, ENV_LABEL_ALL, ENV_LABEL_SELECTOR, ENV_MONGO_ADDRESS, ENV_NAMESPACE,
};
use crate::duration::parse_duration;
use crate::errors::ConfigError;
use std::time::Duration;
use tracing::Level;

/// Runtime configuration for the labeler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Label selector matching the replica set pods
    pub label_selector: String,
    /// Namespace the pods live in
    pub namespace: String,
    /// Address of any reachable replica set member (`host:port`)
    pub mongo_address: String,
    /// Write `primary=false` on non-primary pods instead of removing the label
    pub label_all: bool,
    /// Log verbosity derived from `DEBUG`
    pub log_level: Level,
    /// Bound for one list+patch pass against the Kubernetes API
    pub k8s_request_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LABEL_SELECTOR` is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a map lookup instead of mutating
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LABEL_SELECTOR` is missing or any value
    /// fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let label_selector = lookup(ENV_LABEL_SELECTOR).ok_or(ConfigError::MissingLabelSelector)?;

        let namespace = lookup(ENV_NAMESPACE).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let mongo_address =
            lookup(ENV_MONGO_ADDRESS).unwrap_or_else(|| DEFAULT_MONGO_ADDRESS.to_string());

        let label_all = match lookup(ENV_LABEL_ALL) {
            Some(value) => parse_bool(ENV_LABEL_ALL, &value)?,
            None => false,
        };

        let debug = match lookup(ENV_DEBUG) {
            Some(value) => parse_bool(ENV_DEBUG, &value)?,
            None => false,
        };

        let k8s_request_timeout = match lookup(ENV_K8S_REQUEST_TIMEOUT) {
            Some(value) => parse_timeout(ENV_K8S_REQUEST_TIMEOUT, &value)?,
            None => Duration::from_secs(DEFAULT_K8S_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            label_selector,
            namespace,
            mongo_address,
            label_all,
            log_level: if debug { Level::DEBUG } else { Level::INFO },
            k8s_request_timeout,
        })
    }
}

/// Parse a boolean.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their `false` counterparts.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBool`] for anything else, including
/// surrounding whitespace.
pub fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_timeout(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDuration {
        key,
        value: value.to_string(),
        reason,
    };

    let timeout = parse_duration(value).map_err(|e| invalid(e.to_string()))?;
    if timeout.is_zero() {
        return Err(invalid("timeout must be greater than zero".to_string()));
    }
    Ok(timeout)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
