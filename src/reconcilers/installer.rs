// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Installer` reconciliation.
//!
//! Installs the app-service `Deployment`, a `Service` in front of it and a
//! `Route` exposing the service, then reports the route host as
//! `status.appServiceUrl`.

use crate::app_service_resources::{
    build_installer_deployment, build_installer_route, build_installer_service,
};
use crate::context::Context;
use crate::crd::Installer;
use crate::reconcilers::resources::{create_if_missing, get_optional, patch_status};
use anyhow::{Context as _, Result};
use kube::ResourceExt;
use serde_json::json;
use tracing::{debug, info};

/// Reconciles an `Installer` resource.
///
/// # Errors
///
/// Returns an error if the app-service image is not configured or any of the
/// objects cannot be created.
pub async fn reconcile_installer(ctx: &Context, installer: Installer) -> Result<()> {
    let client = &ctx.client;
    let namespace = installer
        .namespace()
        .context("Installer must be namespaced")?;
    let name = installer.name_any();

    info!("Reconciling Installer: {}/{}", namespace, name);

    let Some(current) = get_optional::<Installer>(client, &namespace, &name).await? else {
        debug!("Installer {}/{} no longer exists", namespace, name);
        return Ok(());
    };

    let image = ctx.config.app_service_image()?;
    create_if_missing(client, &namespace, &build_installer_deployment(&current, image)).await?;

    let service = create_if_missing(client, &namespace, &build_installer_service(&current)).await?;
    let route = create_if_missing(
        client,
        &namespace,
        &build_installer_route(&current, &service.name_any()),
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %name,
        "App-service Deployment, Service and Route in place"
    );

    let current_url = current
        .status
        .as_ref()
        .and_then(|s| s.app_service_url.as_deref())
        .unwrap_or_default();
    let route_host = route.host().unwrap_or_default();
    if route_host == current_url {
        debug!(
            namespace = %namespace,
            name = %name,
            url = %current_url,
            "Installer status already up to date"
        );
        return Ok(());
    }

    patch_status::<Installer>(
        client,
        &namespace,
        &name,
        json!({ "appServiceUrl": route_host }),
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %name,
        url = %route_host,
        "Updated Installer app-service URL"
    );
    Ok(())
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod installer_tests;
