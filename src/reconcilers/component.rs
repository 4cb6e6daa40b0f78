// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Component` reconciliation.
//!
//! Creates the image streams, build and deployment configuration for a
//! component, plus a `Service` and `Route` when a port is requested. Objects
//! that already exist are left untouched.

use crate::component_resources::{
    build_build_config, build_builder_image_stream, build_deployment_config,
    build_output_image_stream, build_route, build_service, revision_of, BuilderImage,
    ComponentError,
};
use crate::constants::OPENSHIFT_NAMESPACE;
use crate::context::Context;
use crate::crd::{Component, GitSource};
use crate::openshift::ImageStream;
use crate::reconcilers::resources::{create_if_missing, get_optional, patch_status};
use anyhow::{Context as _, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{Client, ResourceExt};
use serde_json::json;
use tracing::{debug, info};

/// Reconciles a `Component` resource.
///
/// # Errors
///
/// Returns an error if:
/// - The component does not reference an existing `GitSource`
/// - The build type is empty or unknown
/// - The requested port is out of range
/// - Kubernetes API operations fail
pub async fn reconcile_component(ctx: &Context, component: Component) -> Result<()> {
    let client = &ctx.client;
    let namespace = component
        .namespace()
        .context("Component must be namespaced")?;
    let name = component.name_any();

    info!("Reconciling Component: {}/{}", namespace, name);

    let source = fetch_git_source(client, &namespace, &component).await?;

    create_if_missing(client, &namespace, &build_output_image_stream(&component)).await?;

    if component.spec.build_type.is_empty() {
        return Err(ComponentError::MissingBuildType {
            component: name.clone(),
        }
        .into());
    }
    let builder = ensure_builder_image(client, &namespace, &component).await?;

    let source_secret = match &source.spec.secret_ref {
        Some(secret_ref) => get_optional::<Secret>(client, &namespace, &secret_ref.name)
            .await?
            .map(|_| secret_ref.name.clone()),
        None => None,
    };
    if source.spec.secret_ref.is_some() && source_secret.is_none() {
        debug!(
            namespace = %namespace,
            name = %name,
            "Source secret not found, building without it"
        );
    }

    let build_config = create_if_missing(
        client,
        &namespace,
        &build_build_config(&component, &source, &builder, source_secret.as_deref()),
    )
    .await?;

    create_if_missing(
        client,
        &namespace,
        &build_deployment_config(&component, &source),
    )
    .await?;

    if let Some(port) = component.spec.port {
        create_if_missing(client, &namespace, &build_service(&component, port)?).await?;
        create_if_missing(client, &namespace, &build_route(&component, port)).await?;
    }

    update_revision(client, &namespace, &component, revision_of(&build_config)).await
}

async fn fetch_git_source(
    client: &Client,
    namespace: &str,
    component: &Component,
) -> Result<GitSource> {
    let source_name = &component.spec.git_source_ref;
    if source_name.is_empty() {
        return Err(ComponentError::MissingGitSourceRef {
            component: component.name_any(),
        }
        .into());
    }

    get_optional::<GitSource>(client, namespace, source_name)
        .await?
        .ok_or_else(|| {
            ComponentError::GitSourceNotFound {
                component: component.name_any(),
                name: source_name.clone(),
            }
            .into()
        })
}

/// Use the cluster's builder image stream for the build type, or import one.
async fn ensure_builder_image(
    client: &Client,
    namespace: &str,
    component: &Component,
) -> Result<BuilderImage> {
    let build_type = &component.spec.build_type;

    if get_optional::<ImageStream>(client, OPENSHIFT_NAMESPACE, build_type)
        .await?
        .is_some()
    {
        debug!(
            build_type = %build_type,
            "Using builder ImageStream from the openshift namespace"
        );
        return Ok(BuilderImage {
            name: build_type.clone(),
            namespace: OPENSHIFT_NAMESPACE.to_string(),
        });
    }

    create_if_missing(client, namespace, &build_builder_image_stream(component)?).await?;
    Ok(BuilderImage {
        name: build_type.clone(),
        namespace: namespace.to_string(),
    })
}

async fn update_revision(
    client: &Client,
    namespace: &str,
    component: &Component,
    revision: Option<String>,
) -> Result<()> {
    let Some(revision) = revision else {
        return Ok(());
    };
    let current = component
        .status
        .as_ref()
        .and_then(|s| s.rev_number.as_deref());
    if current == Some(revision.as_str()) {
        return Ok(());
    }

    patch_status::<Component>(
        client,
        namespace,
        &component.name_any(),
        json!({ "revNumber": revision }),
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %component.name_any(),
        revision = %revision,
        "Updated Component revision"
    );
    Ok(())
}

#[cfg(test)]
#[path = "component_tests.rs"]
mod component_tests;
