// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use devconsole_operator::{
    config::OperatorConfig,
    constants::{
        ERROR_REQUEUE_DURATION_SECS, KIND_COMPONENT, KIND_DEVOPS_CONSOLE, KIND_ENV_DEPLOYMENT,
        KIND_GIT_SOURCE, KIND_GIT_SOURCE_ANALYSIS, KIND_INSTALLER, NOT_READY_REQUEUE_DURATION_SECS,
        READY_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::{Component, DevopsConsole, EnvDeployment, GitSource, GitSourceAnalysis, Installer},
    metrics,
    openshift::{BuildConfig, Route},
    reconcilers::{
        reconcile_component, reconcile_devopsconsole, reconcile_envdeployment,
        reconcile_gitsource, reconcile_gitsourceanalysis, reconcile_installer,
        status::find_condition,
    },
    server::{start_server, ServerState},
    status_reasons::{is_ready_reason, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY},
    topology::run_topology_loop,
};
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let config = OperatorConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("devconsole-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

fn init_tracing() {
    // Respects RUST_LOG, defaulting to INFO.
    // RUST_LOG_FORMAT=json switches to structured JSON output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    init_tracing();

    info!("Starting devconsole operator");
    debug!(?config, "Loaded operator configuration");

    if config.app_service_image().is_err() {
        info!("APP_SERVICE_IMAGE_NAME is not set, DevopsConsole and Installer resources will fail to reconcile");
    }

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics_port = config.metrics_port;
    let topology_namespace = config.topology_namespace.clone();
    let topology_interval = config.topology_resync_interval();
    let ctx = Arc::new(Context::new(client.clone(), config)?);

    let is_ready = Arc::new(AtomicBool::new(false));
    let server_state = Arc::new(ServerState::new(is_ready.clone()));

    match ctx.config.watch_namespace() {
        Some(ns) => info!(namespace = %ns, "Watching a single namespace"),
        None => info!("Watching all namespaces"),
    }

    info!("Starting all controllers");
    is_ready.store(true, Ordering::SeqCst);

    // Controllers should never exit - if one does, log it and exit the process
    tokio::select! {
        result = run_gitsource_controller(ctx.clone()) => {
            error!("CRITICAL: GitSource controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("GitSource controller exited unexpectedly without error")
        }
        result = run_gitsourceanalysis_controller(ctx.clone()) => {
            error!("CRITICAL: GitSourceAnalysis controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("GitSourceAnalysis controller exited unexpectedly without error")
        }
        result = run_component_controller(ctx.clone()) => {
            error!("CRITICAL: Component controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Component controller exited unexpectedly without error")
        }
        result = run_devopsconsole_controller(ctx.clone()) => {
            error!("CRITICAL: DevopsConsole controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("DevopsConsole controller exited unexpectedly without error")
        }
        result = run_installer_controller(ctx.clone()) => {
            error!("CRITICAL: Installer controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Installer controller exited unexpectedly without error")
        }
        result = run_envdeployment_controller(ctx.clone()) => {
            error!("CRITICAL: EnvDeployment controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("EnvDeployment controller exited unexpectedly without error")
        }
        result = run_topology_loop(client.clone(), topology_namespace, topology_interval) => {
            error!("CRITICAL: topology service loop exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Topology service loop exited unexpectedly without error")
        }
        result = start_server(metrics_port, server_state) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping controllers");
            is_ready.store(false, Ordering::SeqCst);
            Ok(())
        }
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Api for `K` scoped to the watched namespace, or cluster-wide.
fn watched_api<K>(ctx: &Context) -> Api<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
{
    match ctx.config.watch_namespace() {
        Some(ns) => Api::namespaced(ctx.client.clone(), ns),
        None => Api::all(ctx.client.clone()),
    }
}

/// Record the outcome of a reconcile and pick the requeue interval.
fn finish_reconcile(
    kind: &str,
    name: &str,
    started: Instant,
    result: Result<()>,
    settled: bool,
) -> Result<Action, ReconcileError> {
    match result {
        Ok(()) => {
            metrics::record_reconciliation_success(kind, started.elapsed());
            info!("Successfully reconciled {}: {}", kind, name);

            if settled {
                Ok(Action::requeue(Duration::from_secs(
                    READY_REQUEUE_DURATION_SECS,
                )))
            } else {
                debug!("{} {} not settled, requeueing in 30 seconds", kind, name);
                Ok(Action::requeue(Duration::from_secs(
                    NOT_READY_REQUEUE_DURATION_SECS,
                )))
            }
        }
        Err(e) => {
            metrics::record_reconciliation_error(kind, started.elapsed());
            metrics::record_error(kind, "reconcile_error");
            error!("Failed to reconcile {} {}: {:#}", kind, name, e);
            Err(e.into())
        }
    }
}

/// Run the `GitSource` controller
async fn run_gitsource_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting GitSource controller");

    Controller::new(watched_api::<GitSource>(&ctx), Config::default())
        .run(reconcile_gitsource_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `GitSource`
async fn reconcile_gitsource_wrapper(
    source: Arc<GitSource>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_gitsource(&ctx, (*source).clone()).await;
    let settled = source
        .status
        .as_ref()
        .is_some_and(|s| s.connection.state.is_some());
    finish_reconcile(KIND_GIT_SOURCE, &source.name_any(), started, result, settled)
}

/// Run the `GitSourceAnalysis` controller
async fn run_gitsourceanalysis_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting GitSourceAnalysis controller");

    Controller::new(watched_api::<GitSourceAnalysis>(&ctx), Config::default())
        .run(reconcile_gitsourceanalysis_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `GitSourceAnalysis`
async fn reconcile_gitsourceanalysis_wrapper(
    analysis: Arc<GitSourceAnalysis>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_gitsourceanalysis(&ctx, (*analysis).clone()).await;
    let settled = analysis.status.as_ref().is_some_and(|s| s.analyzed);
    finish_reconcile(
        KIND_GIT_SOURCE_ANALYSIS,
        &analysis.name_any(),
        started,
        result,
        settled,
    )
}

/// Run the `Component` controller
///
/// Owned `BuildConfig`s wake the component up so new builds show up in
/// `status.revNumber`.
async fn run_component_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Component controller");

    Controller::new(watched_api::<Component>(&ctx), Config::default())
        .owns(watched_api::<BuildConfig>(&ctx), Config::default())
        .run(reconcile_component_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `Component`
async fn reconcile_component_wrapper(
    component: Arc<Component>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_component(&ctx, (*component).clone()).await;
    finish_reconcile(KIND_COMPONENT, &component.name_any(), started, result, true)
}

/// Run the `DevopsConsole` controller
async fn run_devopsconsole_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting DevopsConsole controller");

    Controller::new(watched_api::<DevopsConsole>(&ctx), Config::default())
        .owns(watched_api::<Deployment>(&ctx), Config::default())
        .run(reconcile_devopsconsole_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `DevopsConsole`
async fn reconcile_devopsconsole_wrapper(
    console: Arc<DevopsConsole>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_devopsconsole(&ctx, (*console).clone()).await;
    finish_reconcile(
        KIND_DEVOPS_CONSOLE,
        &console.name_any(),
        started,
        result,
        true,
    )
}

/// Run the `Installer` controller
///
/// Owned `Route`s wake the installer up once the router assigns a host.
async fn run_installer_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Installer controller");

    Controller::new(watched_api::<Installer>(&ctx), Config::default())
        .owns(watched_api::<Route>(&ctx), Config::default())
        .run(reconcile_installer_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `Installer`
async fn reconcile_installer_wrapper(
    installer: Arc<Installer>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_installer(&ctx, (*installer).clone()).await;
    let settled = installer
        .status
        .as_ref()
        .and_then(|s| s.app_service_url.as_deref())
        .is_some_and(|url| !url.is_empty());
    finish_reconcile(KIND_INSTALLER, &installer.name_any(), started, result, settled)
}

/// Run the `EnvDeployment` controller
async fn run_envdeployment_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting EnvDeployment controller");

    Controller::new(watched_api::<EnvDeployment>(&ctx), Config::default())
        .run(reconcile_envdeployment_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `EnvDeployment`
async fn reconcile_envdeployment_wrapper(
    env_deployment: Arc<EnvDeployment>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_envdeployment(&ctx, (*env_deployment).clone()).await;

    // Check if the bindings resolved to determine requeue interval
    let settled = env_deployment
        .status
        .as_ref()
        .and_then(|status| find_condition(&status.conditions, CONDITION_TYPE_READY))
        .is_some_and(|condition| {
            condition.status == CONDITION_STATUS_TRUE
                && condition.reason.as_deref().is_some_and(is_ready_reason)
        });
    finish_reconcile(
        KIND_ENV_DEPLOYMENT,
        &env_deployment.name_any(),
        started,
        result,
        settled,
    )
}

/// Error policy for all controllers
fn error_policy<K>(_resource: Arc<K>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
