// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `GitSource` reconciliation.
//!
//! A `GitSource` is validated once: the first reconcile moves it to
//! `Initializing`, checks the repository and records the result in
//! `status.connection`. Later reconciles see a connection state and leave the
//! resource alone. Validation failures are reported on status and never fail
//! the reconcile.

use crate::context::Context;
use crate::crd::{Connection, ConnectionFailureReason, GitSource, GitSourceState, GitSourceStatus};
use crate::git::{resolve_credentials, validate_git_source};
use crate::metrics;
use crate::reconcilers::resources::{get_optional, patch_status};
use anyhow::{Context as _, Result};
use kube::ResourceExt;
use serde_json::json;
use tracing::{debug, info, warn};

/// Returns `true` if the source has not been validated yet.
#[must_use]
pub fn needs_validation(status: Option<&GitSourceStatus>) -> bool {
    status.is_none_or(|s| s.connection.state.is_none())
}

/// Reconciles a `GitSource` resource.
///
/// # Errors
///
/// Returns an error if the resource cannot be read or its status cannot be patched.
pub async fn reconcile_gitsource(ctx: &Context, source: GitSource) -> Result<()> {
    let namespace = source
        .namespace()
        .context("GitSource must be namespaced")?;
    let name = source.name_any();

    info!("Reconciling GitSource: {}/{}", namespace, name);

    let Some(current) = get_optional::<GitSource>(&ctx.client, &namespace, &name).await? else {
        debug!("GitSource {}/{} no longer exists", namespace, name);
        return Ok(());
    };

    if !needs_validation(current.status.as_ref()) {
        debug!(
            namespace = %namespace,
            name = %name,
            "GitSource already validated, skipping"
        );
        return Ok(());
    }

    let state = current
        .status
        .as_ref()
        .and_then(|s| s.state)
        .unwrap_or(GitSourceState::Initializing);

    let connection = check_source(ctx, &namespace, &current).await;

    patch_status::<GitSource>(
        &ctx.client,
        &namespace,
        &name,
        json!({
            "state": state,
            "connection": connection,
        }),
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %name,
        ok = connection.is_ok(),
        "Recorded GitSource connection status"
    );
    Ok(())
}

/// Resolve the credentials of a source and probe its repository.
async fn check_source(ctx: &Context, namespace: &str, source: &GitSource) -> Connection {
    let credentials =
        match resolve_credentials(&ctx.client, namespace, source.spec.secret_ref.as_ref()).await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(
                    namespace = %namespace,
                    name = %source.name_any(),
                    "Failed to read git credentials: {e}"
                );
                metrics::record_git_connection_check("unknown", e.metric_label());
                return Connection::failed(
                    ConnectionFailureReason::ConnectionInternalFailure,
                    e.to_string(),
                );
            }
        };

    validate_git_source(&ctx.http_client, &ctx.endpoints, &source.spec, credentials).await
}

#[cfg(test)]
#[path = "gitsource_tests.rs"]
mod gitsource_tests;
