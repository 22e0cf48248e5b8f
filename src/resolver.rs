// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Replica set primary resolution.
//!
//! The resolver asks any reachable replica set member who the current primary
//! is and turns the reported `host:port` into the short pod name used for
//! labeling.
//!
//! # Pod Name Derivation
//!
//! The pod name is the first DNS label of the reported host. This relies on the
//! replica set advertising members by their Kubernetes stable network identity:
//!
//! ```text
//! mongo-1.mongo-headless.db.svc.cluster.local:27017  ->  mongo-1
//! ```
//!
//! Members advertised under any other naming scheme (IP addresses, external
//! DNS names) produce a plausible but wrong pod name rather than an error. The
//! detection pass in the synchronizer then reports the primary as not found,
//! so no labels are changed.
//!
//! # Implementations
//!
//! - [`MongoPrimaryResolver`] - Direct connection + `hello` handshake

use crate::constants::{
    MONGO_ADMIN_DATABASE, MONGO_APP_NAME, MONGO_DRIVER_TIMEOUT_MARGIN_MILLIS,
    MONGO_OPERATION_TIMEOUT_SECS,
};
use crate::errors::ResolveError;
use mongodb::bson::{self, doc};
use mongodb::options::ClientOptions;
use mongodb::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Short pod name of the current replica set primary. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryIdentity(String);

impl PrimaryIdentity {
    /// Wrap a pod name, rejecting the empty string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    /// Derive the pod name from a `host:port` member address.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidPrimaryHost`] if the address has no port or is malformed
    /// - [`ResolveError::EmptyIdentity`] if the first DNS label of the host is empty
    pub fn from_host_port(address: &str) -> Result<Self, ResolveError> {
        let host = split_host_port(address).map_err(|reason| ResolveError::InvalidPrimaryHost {
            host: address.to_string(),
            reason: reason.to_string(),
        })?;

        let name = host.split_once('.').map_or(host, |(name, _)| name);
        Self::new(name).ok_or_else(|| ResolveError::EmptyIdentity {
            host: host.to_string(),
        })
    }

    /// The pod name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrimaryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields of the `hello` (legacy `isMaster`) reply used to locate the primary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloReply {
    /// Address of the current primary, as seen by the answering member
    pub primary: Option<String>,
    /// Whether the answering member is itself the writable primary
    pub is_writable_primary: Option<bool>,
    /// Legacy spelling of `isWritablePrimary`
    #[serde(rename = "ismaster")]
    pub is_master: Option<bool>,
    /// Address of the answering member
    pub me: Option<String>,
}

impl HelloReply {
    /// Address of the primary in priority order.
    ///
    /// 1. `primary`, when present and non-empty
    /// 2. `me`, when the answering member reports itself writable
    ///
    /// Some server versions omit `primary` when the handshake is answered by
    /// the primary itself, hence the fallback.
    #[must_use]
    pub fn primary_host(&self) -> Option<&str> {
        if let Some(primary) = self.primary.as_deref().filter(|p| !p.is_empty()) {
            return Some(primary);
        }

        let answered_by_primary =
            self.is_writable_primary == Some(true) || self.is_master == Some(true);
        if answered_by_primary {
            self.me.as_deref().filter(|me| !me.is_empty())
        } else {
            None
        }
    }
}

/// Strategy for finding the current primary.
#[async_trait::async_trait]
pub trait PrimaryResolver: Send + Sync {
    /// Resolve the pod name of the current primary.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] describing why the primary could not be
    /// determined. Implementations must not retry internally.
    async fn resolve(&self) -> Result<PrimaryIdentity, ResolveError>;
}

/// Resolves the primary with a direct connection to one replica set member.
///
/// Every call opens a fresh, non-discovering connection, runs `ping` and
/// `hello` against the admin database, and shuts the client down before
/// returning. The whole exchange is bounded by a single timeout.
#[derive(Debug, Clone)]
pub struct MongoPrimaryResolver {
    address: String,
    timeout: Duration,
}

impl MongoPrimaryResolver {
    /// Create a resolver for `address` (`host:port`) with the default 20s bound.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: Duration::from_secs(MONGO_OPERATION_TIMEOUT_SECS),
        }
    }

    /// Override the bound on the connect/ping/hello exchange.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured member address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Deadline handed to the driver for connecting and server selection.
    ///
    /// Always shorter than the outer bound, so an unreachable member surfaces
    /// as the driver's own error (e.g. connection refused) instead of
    /// [`ResolveError::Timeout`].
    #[must_use]
    pub fn driver_timeout(&self) -> Duration {
        self.timeout
            .saturating_sub(Duration::from_millis(MONGO_DRIVER_TIMEOUT_MARGIN_MILLIS))
            .max(self.timeout / 2)
    }

    /// Connection string for a direct connection to the configured member.
    #[must_use]
    pub fn connection_uri(&self) -> String {
        format!("mongodb://{}/?directConnection=true", self.address)
    }

    async fn connect(&self) -> Result<Client, ResolveError> {
        let connect_error = |source| ResolveError::Connect {
            address: self.address.clone(),
            source,
        };

        let mut options = ClientOptions::parse(self.connection_uri())
            .await
            .map_err(connect_error)?;
        options.direct_connection = Some(true);
        options.app_name = Some(MONGO_APP_NAME.to_string());
        options.connect_timeout = Some(self.driver_timeout());
        options.server_selection_timeout = Some(self.driver_timeout());

        Client::with_options(options).map_err(connect_error)
    }

    async fn query_hello(&self, client: &Client) -> Result<HelloReply, ResolveError> {
        let admin = client.database(MONGO_ADMIN_DATABASE);

        admin
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| ResolveError::Ping {
                address: self.address.clone(),
                source,
            })?;

        let reply = admin
            .run_command(doc! { "hello": 1 })
            .await
            .map_err(|e| ResolveError::Handshake {
                address: self.address.clone(),
                reason: e.to_string(),
            })?;

        bson::from_document(reply).map_err(|e| ResolveError::Handshake {
            address: self.address.clone(),
            reason: format!("unexpected hello reply: {e}"),
        })
    }

    async fn resolve_within_deadline(&self) -> Result<PrimaryIdentity, ResolveError> {
        let client = self.connect().await?;
        let hello = self.query_hello(&client).await;

        // Released on success and error alike
        client.shutdown().await;
        debug!(address = %self.address, "Closed MongoDB connection");

        let hello = hello?;
        debug!(
            address = %self.address,
            primary = ?hello.primary,
            is_writable_primary = ?hello.is_writable_primary,
            ismaster = ?hello.is_master,
            me = ?hello.me,
            "Received hello reply"
        );

        let host = hello
            .primary_host()
            .ok_or_else(|| ResolveError::MissingPrimary {
                address: self.address.clone(),
            })?;

        PrimaryIdentity::from_host_port(host)
    }
}

#[async_trait::async_trait]
impl PrimaryResolver for MongoPrimaryResolver {
    async fn resolve(&self) -> Result<PrimaryIdentity, ResolveError> {
        // Dropping the in-flight future on timeout drops the client with it.
        tokio::time::timeout(self.timeout, self.resolve_within_deadline())
            .await
            .map_err(|_| ResolveError::Timeout {
                address: self.address.clone(),
                timeout: self.timeout,
            })?
    }
}

/// Split `host:port`, returning the host. Brackets around IPv6 hosts are removed.
fn split_host_port(address: &str) -> Result<&str, &'static str> {
    if let Some(rest) = address.strip_prefix('[') {
        let end = rest.find(']').ok_or("missing ']' in address")?;
        let host = &rest[..end];
        let after = &rest[end + 1..];
        return match after.strip_prefix(':') {
            Some(_) => Ok(host),
            None if after.is_empty() => Err("missing port in address"),
            None => Err("unexpected characters after ']' in address"),
        };
    }

    let colon = address.rfind(':').ok_or("missing port in address")?;
    let host = &address[..colon];
    if host.contains(':') {
        return Err("too many colons in address");
    }
    Ok(host)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
