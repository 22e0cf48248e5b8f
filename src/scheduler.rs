// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Periodic reconciliation loop.
//!
//! A single worker resolves the primary and syncs labels once per interval.
//! Each cycle is awaited inline before the next tick is taken, so cycles never
//! overlap and one cycle's detection pass can never interleave with another
//! cycle's patches.
//!
//! Failures from either phase are logged and retried on the next tick. Nothing
//! in the loop terminates the process; only shutdown ends it.

use crate::constants::RECONCILE_INTERVAL_SECS;
use crate::errors::ReconcileError;
use crate::pods::PodClient;
use crate::resolver::PrimaryResolver;
use crate::synchronizer::{LabelSynchronizer, SyncSummary};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, info_span, Instrument};

/// Counters for a finished [`Reconciler::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Cycles started (and completed) before shutdown
    pub cycles: u64,
    /// Cycles that ended in an error
    pub failures: u64,
}

/// Drives resolve + sync on a fixed cadence.
pub struct Reconciler<R, C> {
    resolver: R,
    synchronizer: LabelSynchronizer<C>,
    interval: Duration,
}

impl<R, C> Reconciler<R, C>
where
    R: PrimaryResolver,
    C: PodClient,
{
    /// Create a reconciler with the default 5 second interval.
    #[must_use]
    pub fn new(resolver: R, synchronizer: LabelSynchronizer<C>) -> Self {
        Self {
            resolver,
            synchronizer,
            interval: Duration::from_secs(RECONCILE_INTERVAL_SECS),
        }
    }

    /// Override the interval between cycles.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Interval between cycles.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resolver used by every cycle.
    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Synchronizer used by every cycle.
    #[must_use]
    pub fn synchronizer(&self) -> &LabelSynchronizer<C> {
        &self.synchronizer
    }

    /// Run one cycle: resolve the primary, then sync labels to it.
    ///
    /// Sync is skipped entirely when resolution fails, so a resolver error
    /// never causes a cluster call.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Resolve`] or [`ReconcileError::Sync`] for the
    /// phase that failed.
    pub async fn reconcile_once(&self) -> Result<SyncSummary, ReconcileError> {
        let primary = self.resolver.resolve().await?;
        debug!(primary = %primary, "Resolved replica set primary");

        let summary = self.synchronizer.sync(&primary).await?;
        Ok(summary)
    }

    /// Run cycles until `shutdown` completes.
    ///
    /// The first cycle starts immediately. Shutdown is only observed between
    /// cycles: an in-flight cycle runs to completion or to its own timeouts.
    pub async fn run<F>(&self, shutdown: F) -> RunStats
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut stats = RunStats::default();
        info!(interval = ?self.interval, "Starting reconciliation loop");

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            stats.cycles += 1;
            let span = info_span!("reconcile", cycle = stats.cycles);
            match self.reconcile_once().instrument(span).await {
                Ok(summary) => debug!(
                    cycle = stats.cycles,
                    pods_listed = summary.pods_listed,
                    pods_patched = summary.pods_patched,
                    primary_changed = summary.primary_changed,
                    "Primary label in sync"
                ),
                Err(e) => {
                    stats.failures += 1;
                    error!(
                        cycle = stats.cycles,
                        reason = e.reason(),
                        partially_applied = e.may_have_partially_applied(),
                        error = %e,
                        "Failed to set primary label"
                    );
                }
            }
        }

        info!(
            cycles = stats.cycles,
            failures = stats.failures,
            "Reconciliation loop stopped"
        );
        stats
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
