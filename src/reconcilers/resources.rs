// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic get-or-create and status helpers for namespaced Kubernetes resources.
//!
//! Every object the operator generates is created once and then left alone:
//! an existing object is never updated, and an `AlreadyExists` answer from a
//! concurrent create is treated as success.
//!
//! # Example
//!
//! ```rust,no_run
//! use devconsole_operator::reconcilers::resources::create_if_missing;
//! use k8s_openapi::api::core::v1::Service;
//! use kube::Client;
//! use anyhow::Result;
//!
//! async fn example(client: &Client, namespace: &str, svc: Service) -> Result<()> {
//!     let svc = create_if_missing(client, namespace, &svc).await?;
//!     Ok(())
//! }
//! ```

use crate::metrics;
use anyhow::Result;
use kube::api::{Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt::Debug;
use tracing::{debug, info};

/// Fetch a namespaced resource, returning `None` if it does not exist.
///
/// # Errors
///
/// Returns an error for any API failure other than `NotFound`.
pub async fn get_optional<T>(client: &Client, namespace: &str, name: &str) -> Result<Option<T>>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned,
{
    let api: Api<T> = Api::namespaced(client.clone(), namespace);
    Ok(api.get_opt(name).await?)
}

/// Create a resource unless one with the same name already exists.
///
/// Returns the object stored in the cluster: the existing one, the freshly
/// created one, or the desired object when a concurrent create won the race.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no name in its metadata
/// - API operations fail (other than `AlreadyExists` on create)
pub async fn create_if_missing<T>(client: &Client, namespace: &str, resource: &T) -> Result<T>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned,
{
    let name = resource
        .meta()
        .name
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Resource must have a name"))?;

    let api: Api<T> = Api::namespaced(client.clone(), namespace);

    if let Some(existing) = api.get_opt(name).await? {
        debug!(
            "Skip creating {} {}/{}: already exists",
            T::kind(&()),
            namespace,
            name
        );
        return Ok(existing);
    }

    match api.create(&PostParams::default(), resource).await {
        Ok(created) => {
            info!("Created {} {}/{}", T::kind(&()), namespace, name);
            metrics::record_resource_created(&T::kind(&()));
            Ok(created)
        }
        Err(e) if e.to_string().contains("AlreadyExists") => {
            debug!(
                "{} {}/{} was created concurrently",
                T::kind(&()),
                namespace,
                name
            );
            Ok(resource.clone())
        }
        Err(e) => Err(e.into()),
    }
}

/// Merge-patch the status subresource of a namespaced resource.
///
/// # Errors
///
/// Returns an error if the patch fails.
pub async fn patch_status<T>(
    client: &Client,
    namespace: &str,
    name: &str,
    status: serde_json::Value,
) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned,
{
    let api: Api<T> = Api::namespaced(client.clone(), namespace);
    api.patch_status(
        name,
        &PatchParams::default(),
        &Patch::Merge(json!({ "status": status })),
    )
    .await?;

    debug!(
        namespace = %namespace,
        name = %name,
        kind = %T::kind(&()),
        "Patched status"
    );
    Ok(())
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
