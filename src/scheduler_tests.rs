// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `scheduler.rs`

#[cfg(test)]
mod tests {
    use super::super::{Reconciler, RunStats};
    use crate::errors::{ReconcileError, ResolveError};
    use crate::resolver::PrimaryIdentity;
    use crate::synchronizer::{LabelSynchronizer, SyncSettings};
    use crate::test_support::{FixedPrimaryResolver, InMemoryPods};
    use std::time::Duration;

    fn synchronizer(pods: InMemoryPods) -> LabelSynchronizer<InMemoryPods> {
        LabelSynchronizer::new(
            pods,
            SyncSettings {
                namespace: "default".to_string(),
                label_selector: "role=mongo".to_string(),
                label_all: true,
                request_timeout: Duration::from_secs(1),
            },
        )
    }

    fn resolving_to(name: &str) -> FixedPrimaryResolver {
        FixedPrimaryResolver::primary(PrimaryIdentity::new(name).unwrap())
    }

    fn mongo_unavailable() -> FixedPrimaryResolver {
        FixedPrimaryResolver::failing(ResolveError::Timeout {
            address: "mongo:27017".to_string(),
            timeout: Duration::from_secs(20),
        })
    }

    #[test]
    fn test_default_interval_is_five_seconds() {
        let reconciler = Reconciler::new(
            resolving_to("mongo-1"),
            synchronizer(InMemoryPods::with_pods(&["mongo-1"])),
        );
        assert_eq!(reconciler.interval(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_reconcile_once_syncs_resolved_primary() {
        let reconciler = Reconciler::new(
            resolving_to("mongo-1"),
            synchronizer(InMemoryPods::with_pods(&["mongo-0", "mongo-1", "mongo-2"])),
        );

        let summary = reconciler.reconcile_once().await.unwrap();

        assert_eq!(summary.pods_patched, 3);
        assert_eq!(reconciler.resolver().calls(), 1);
    }

    #[tokio::test]
    async fn test_resolver_failure_skips_sync() {
        let reconciler = Reconciler::new(
            mongo_unavailable(),
            synchronizer(InMemoryPods::with_pods(&["mongo-0", "mongo-1", "mongo-2"])),
        );

        let err = reconciler.reconcile_once().await.unwrap_err();

        assert!(matches!(err, ReconcileError::Resolve(_)));
        let pods = reconciler.synchronizer().pods();
        assert_eq!(pods.list_calls(), 0, "sync must not run after a resolve failure");
        assert!(pods.patched_pods().is_empty());
    }

    #[tokio::test]
    async fn test_sync_failure_is_reported_as_sync_error() {
        let reconciler = Reconciler::new(
            resolving_to("mongo-9"),
            synchronizer(InMemoryPods::with_pods(&["mongo-0", "mongo-1"])),
        );

        let err = reconciler.reconcile_once().await.unwrap_err();

        assert!(matches!(err, ReconcileError::Sync(_)));
        assert_eq!(err.reason(), "PrimaryNotFound");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_shutdown() {
        let reconciler = Reconciler::new(
            resolving_to("mongo-1"),
            synchronizer(InMemoryPods::with_pods(&["mongo-0", "mongo-1"])),
        );

        // Ticks at 0s, 5s and 10s; shutdown at 12s
        let stats = reconciler
            .run(tokio::time::sleep(Duration::from_secs(12)))
            .await;

        assert_eq!(
            stats,
            RunStats {
                cycles: 3,
                failures: 0,
            }
        );
        assert_eq!(reconciler.synchronizer().pods().list_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_failures() {
        let reconciler = Reconciler::new(
            mongo_unavailable(),
            synchronizer(InMemoryPods::with_pods(&["mongo-0", "mongo-1"])),
        )
        .with_interval(Duration::from_secs(1));

        let stats = reconciler
            .run(tokio::time::sleep(Duration::from_millis(3500)))
            .await;

        assert_eq!(stats.cycles, 4, "ticks at 0s, 1s, 2s and 3s");
        assert_eq!(stats.failures, 4);
        assert_eq!(reconciler.resolver().calls(), 4);
        assert_eq!(reconciler.synchronizer().pods().list_calls(), 0);
    }

    #[tokio::test]
    async fn test_run_exits_immediately_on_completed_shutdown() {
        let reconciler = Reconciler::new(
            resolving_to("mongo-1"),
            synchronizer(InMemoryPods::with_pods(&["mongo-1"])),
        );

        let stats = reconciler.run(std::future::ready(())).await;

        assert_eq!(stats, RunStats::default());
        assert_eq!(reconciler.resolver().calls(), 0);
    }
}
