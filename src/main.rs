// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use mongo_labeler::{
    config::Config,
    kube_client::{build_client, ClientSource},
    logging,
    pods::KubePodClient,
    resolver::MongoPrimaryResolver,
    scheduler::Reconciler,
    synchronizer::{LabelSynchronizer, SyncSettings},
};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Keep the `primary` label on MongoDB pods in step with the replica set primary.
#[derive(Debug, Parser)]
#[command(name = "mongo-labeler", version, about)]
struct Cli {
    /// Path to a kubeconfig file, used when not running inside a cluster
    #[arg(long, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Run a single reconciliation cycle and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("mongo-labeler")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet; report at the default level.
            // Err only means a subscriber is already installed.
            logging::init(tracing::Level::INFO).ok();
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    logging::init(config.log_level)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting MongoDB primary labeler");
    info!(
        namespace = %config.namespace,
        label_selector = %config.label_selector,
        mongo_address = %config.mongo_address,
        label_all = config.label_all,
        k8s_request_timeout = ?config.k8s_request_timeout,
        "Loaded configuration"
    );

    debug!("Initializing Kubernetes client");
    let source = ClientSource::detect(cli.kubeconfig.as_deref());
    let client = match build_client(&source).await {
        Ok(client) => client,
        Err(e) => {
            error!(source = ?source, error = %e, "Failed to create Kubernetes client");
            return Err(e.into());
        }
    };
    debug!(source = ?source, "Kubernetes client initialized successfully");

    let resolver = MongoPrimaryResolver::new(config.mongo_address.clone());
    let pods = KubePodClient::new(client, &config.namespace);
    let synchronizer = LabelSynchronizer::new(pods, SyncSettings::from(&config));
    let reconciler = Reconciler::new(resolver, synchronizer);

    if cli.once {
        let summary = reconciler.reconcile_once().await.map_err(|e| {
            error!(reason = e.reason(), error = %e, "Failed to set primary label");
            anyhow::Error::new(e)
        })?;
        info!(
            pods_listed = summary.pods_listed,
            pods_patched = summary.pods_patched,
            primary_changed = summary.primary_changed,
            "Single reconciliation finished"
        );
        return Ok(());
    }

    reconciler.run(shutdown_signal()).await;
    info!("MongoDB primary labeler stopped");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
