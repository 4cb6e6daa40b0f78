// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `EnvDeployment` reconciliation.
//!
//! An `EnvDeployment` binds a workload to an `Environment`. The reconciler
//! resolves both references and reports the outcome as a `Ready` condition.

use crate::constants::{KIND_DEPLOYMENT, KIND_DEPLOYMENT_CONFIG, KIND_ENVIRONMENT};
use crate::context::Context;
use crate::crd::{EnvDeployment, EnvDeploymentSpec, Environment};
use crate::openshift::DeploymentConfig;
use crate::reconcilers::resources::{get_optional, patch_status};
use crate::reconcilers::status::{conditions_equal, update_condition_in_memory};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY,
    REASON_DEPLOYMENT_NOT_FOUND, REASON_ENVIRONMENT_NOT_FOUND, REASON_RESOLVED,
    REASON_UNSUPPORTED_KIND,
};
use anyhow::{Context as _, Result};
use k8s_openapi::api::apps::v1::Deployment;
use kube::{Client, ResourceExt};
use serde_json::json;
use tracing::{debug, info};

/// Outcome of resolving the references of an `EnvDeployment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { environment: String, deployment: String },
    EnvironmentNotFound { name: String },
    DeploymentNotFound { kind: String, name: String },
    UnsupportedKind { kind: String },
}

impl Resolution {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Resolved { .. } => CONDITION_STATUS_TRUE,
            _ => CONDITION_STATUS_FALSE,
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Resolved { .. } => REASON_RESOLVED,
            Self::EnvironmentNotFound { .. } => REASON_ENVIRONMENT_NOT_FOUND,
            Self::DeploymentNotFound { .. } => REASON_DEPLOYMENT_NOT_FOUND,
            Self::UnsupportedKind { .. } => REASON_UNSUPPORTED_KIND,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Resolved {
                environment,
                deployment,
            } => format!("{deployment} is bound to environment {environment}"),
            Self::EnvironmentNotFound { name } => format!("Environment {name} not found"),
            Self::DeploymentNotFound { kind, name } => format!("{kind} {name} not found"),
            Self::UnsupportedKind { kind } => format!(
                "unsupported kind {kind}: expected {KIND_ENVIRONMENT}, {KIND_DEPLOYMENT} or {KIND_DEPLOYMENT_CONFIG}"
            ),
        }
    }
}

/// Resolve the environment and workload references of an `EnvDeployment`.
///
/// # Errors
///
/// Returns an error for API failures other than `NotFound`.
pub async fn resolve_references(
    client: &Client,
    namespace: &str,
    spec: &EnvDeploymentSpec,
) -> Result<Resolution> {
    let env_ref = &spec.environment_ref;
    if env_ref.kind != KIND_ENVIRONMENT {
        return Ok(Resolution::UnsupportedKind {
            kind: env_ref.kind.clone(),
        });
    }
    if get_optional::<Environment>(client, namespace, &env_ref.name)
        .await?
        .is_none()
    {
        return Ok(Resolution::EnvironmentNotFound {
            name: env_ref.name.clone(),
        });
    }

    let deploy_ref = &spec.deployment_ref;
    let found = match deploy_ref.kind.as_str() {
        KIND_DEPLOYMENT => get_optional::<Deployment>(client, namespace, &deploy_ref.name)
            .await?
            .is_some(),
        KIND_DEPLOYMENT_CONFIG => {
            get_optional::<DeploymentConfig>(client, namespace, &deploy_ref.name)
                .await?
                .is_some()
        }
        other => {
            return Ok(Resolution::UnsupportedKind {
                kind: other.to_string(),
            })
        }
    };

    if !found {
        return Ok(Resolution::DeploymentNotFound {
            kind: deploy_ref.kind.clone(),
            name: deploy_ref.name.clone(),
        });
    }

    Ok(Resolution::Resolved {
        environment: env_ref.name.clone(),
        deployment: format!("{} {}", deploy_ref.kind, deploy_ref.name),
    })
}

/// Reconciles an `EnvDeployment` resource.
///
/// # Errors
///
/// Returns an error if the references cannot be looked up or the status
/// cannot be patched.
pub async fn reconcile_envdeployment(ctx: &Context, env_deployment: EnvDeployment) -> Result<()> {
    let namespace = env_deployment
        .namespace()
        .context("EnvDeployment must be namespaced")?;
    let name = env_deployment.name_any();

    info!("Reconciling EnvDeployment: {}/{}", namespace, name);

    let Some(current) = get_optional::<EnvDeployment>(&ctx.client, &namespace, &name).await?
    else {
        debug!("EnvDeployment {}/{} no longer exists", namespace, name);
        return Ok(());
    };

    let resolution = resolve_references(&ctx.client, &namespace, &current.spec).await?;

    let status = current.status.clone().unwrap_or_default();
    let mut conditions = status.conditions.clone();
    update_condition_in_memory(
        &mut conditions,
        CONDITION_TYPE_READY,
        resolution.status(),
        resolution.reason(),
        &resolution.message(),
    );
    let observed_generation = current.metadata.generation;

    if conditions_equal(&status.conditions, &conditions)
        && status.observed_generation == observed_generation
    {
        debug!(
            namespace = %namespace,
            name = %name,
            "EnvDeployment status unchanged"
        );
        return Ok(());
    }

    patch_status::<EnvDeployment>(
        &ctx.client,
        &namespace,
        &name,
        json!({
            "conditions": conditions,
            "observedGeneration": observed_generation,
        }),
    )
    .await?;

    info!(
        namespace = %namespace,
        name = %name,
        reason = %resolution.reason(),
        "Updated EnvDeployment Ready condition"
    );
    Ok(())
}

#[cfg(test)]
#[path = "envdeployment_tests.rs"]
mod envdeployment_tests;
