// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `GitSourceAnalysis` reconciliation.
//!
//! The analysis runs once per resource. Whatever happens, `status.analyzed` is
//! set afterwards; failures end up in `status.error` instead of failing the
//! reconcile.

use crate::context::Context;
use crate::crd::{BuildEnvStats, GitSource, GitSourceAnalysis};
use crate::git::{analyze_git_source, resolve_credentials};
use crate::git_errors::GitError;
use crate::metrics;
use crate::reconcilers::resources::{get_optional, patch_status};
use anyhow::{Context as _, Result};
use kube::ResourceExt;
use tracing::{debug, info, warn};

/// Error recorded when the referenced `GitSource` cannot be read.
pub const GIT_SOURCE_FETCH_FAILED_MESSAGE: &str = "Failed to fetch the input source";

/// Reconciles a `GitSourceAnalysis` resource.
///
/// # Errors
///
/// Returns an error if the resource cannot be read or its status cannot be patched.
pub async fn reconcile_gitsourceanalysis(ctx: &Context, analysis: GitSourceAnalysis) -> Result<()> {
    let namespace = analysis
        .namespace()
        .context("GitSourceAnalysis must be namespaced")?;
    let name = analysis.name_any();

    info!("Reconciling GitSourceAnalysis: {}/{}", namespace, name);

    let Some(current) = get_optional::<GitSourceAnalysis>(&ctx.client, &namespace, &name).await?
    else {
        debug!("GitSourceAnalysis {}/{} no longer exists", namespace, name);
        return Ok(());
    };

    let mut status = current.status.clone().unwrap_or_default();
    if status.analyzed {
        debug!(
            namespace = %namespace,
            name = %name,
            git_source = %current.spec.git_source_ref.name,
            "Skipping GitSourceAnalysis as it was already analyzed"
        );
        return Ok(());
    }

    let source_name = &current.spec.git_source_ref.name;
    match get_optional::<GitSource>(&ctx.client, &namespace, source_name).await {
        Ok(Some(source)) => match analyze(ctx, &namespace, &source).await {
            Ok(stats) => {
                status.build_env_statistics = stats;
                status.error = None;
            }
            Err(e) => {
                warn!(
                    namespace = %namespace,
                    name = %name,
                    git_source = %source_name,
                    "Error detecting build types: {e}"
                );
                status.error = Some(e.to_string());
            }
        },
        Ok(None) => {
            warn!(
                namespace = %namespace,
                name = %name,
                git_source = %source_name,
                "GitSource not found"
            );
            status.error = Some(GIT_SOURCE_FETCH_FAILED_MESSAGE.to_string());
        }
        Err(e) => {
            warn!(
                namespace = %namespace,
                name = %name,
                git_source = %source_name,
                "Error reading the GitSource object: {e}"
            );
            status.error = Some(GIT_SOURCE_FETCH_FAILED_MESSAGE.to_string());
        }
    }

    status.analyzed = true;
    metrics::record_git_analysis(status.error.is_none());

    patch_status::<GitSourceAnalysis>(
        &ctx.client,
        &namespace,
        &name,
        serde_json::to_value(&status)?,
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %name,
        build_types = status.build_env_statistics.detected_build_types.len(),
        "GitSourceAnalysis completed"
    );
    Ok(())
}

async fn analyze(
    ctx: &Context,
    namespace: &str,
    source: &GitSource,
) -> Result<BuildEnvStats, GitError> {
    info!(
        namespace = %namespace,
        git_source = %source.name_any(),
        url = %source.spec.url,
        "Analyzing GitSource"
    );

    let credentials =
        resolve_credentials(&ctx.client, namespace, source.spec.secret_ref.as_ref()).await?;
    analyze_git_source(&ctx.http_client, &ctx.endpoints, &source.spec, credentials).await
}

#[cfg(test)]
#[path = "gitsourceanalysis_tests.rs"]
mod gitsourceanalysis_tests;
