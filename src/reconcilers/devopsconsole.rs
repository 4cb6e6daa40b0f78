// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DevopsConsole` reconciliation.

use crate::app_service_resources::build_devops_console_deployment;
use crate::context::Context;
use crate::crd::DevopsConsole;
use crate::reconcilers::resources::{create_if_missing, get_optional};
use anyhow::{Context as _, Result};
use kube::ResourceExt;
use tracing::{debug, info};

/// Reconciles a `DevopsConsole` resource by creating its app-service `Deployment`.
///
/// # Errors
///
/// Returns an error if the app-service image is not configured or the
/// `Deployment` cannot be created.
pub async fn reconcile_devopsconsole(ctx: &Context, console: DevopsConsole) -> Result<()> {
    let namespace = console
        .namespace()
        .context("DevopsConsole must be namespaced")?;
    let name = console.name_any();

    info!("Reconciling DevopsConsole: {}/{}", namespace, name);

    let Some(current) = get_optional::<DevopsConsole>(&ctx.client, &namespace, &name).await?
    else {
        debug!("DevopsConsole {}/{} no longer exists", namespace, name);
        return Ok(());
    };

    let image = ctx.config.app_service_image()?;
    let deployment = create_if_missing(
        &ctx.client,
        &namespace,
        &build_devops_console_deployment(&current, image),
    )
    .await?;

    debug!(
        namespace = %namespace,
        name = %name,
        deployment = %deployment.name_any(),
        "DevopsConsole app-service deployment in place"
    );
    Ok(())
}

#[cfg(test)]
#[path = "devopsconsole_tests.rs"]
mod devopsconsole_tests;
