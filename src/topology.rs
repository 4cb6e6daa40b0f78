// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster-wide topology service.
//!
//! The operator keeps a `devconsole-app` `Deployment` and `Service` running in
//! the topology namespace. They are checked at startup and again on every
//! resync tick, and recreated when missing.

use crate::constants::{DEFAULT_REPLICAS, TOPOLOGY_APP_NAME, TOPOLOGY_IMAGE, TOPOLOGY_PORT};
use crate::labels::{build_deployment_config_selector, APP_LABEL, K8S_NAME};
use crate::reconcilers::resources::create_if_missing;
use anyhow::Result;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Labels shared by the topology objects.
#[must_use]
pub fn topology_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        (K8S_NAME.to_string(), TOPOLOGY_APP_NAME.to_string()),
        (APP_LABEL.to_string(), TOPOLOGY_APP_NAME.to_string()),
    ])
}

fn topology_meta(namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(TOPOLOGY_APP_NAME.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(topology_labels()),
        ..Default::default()
    }
}

/// `Deployment` running the topology service.
#[must_use]
pub fn build_topology_deployment(namespace: &str) -> Deployment {
    let labels = topology_labels();

    Deployment {
        metadata: topology_meta(namespace),
        spec: Some(DeploymentSpec {
            replicas: Some(DEFAULT_REPLICAS),
            strategy: Some(DeploymentStrategy {
                type_: Some("Recreate".to_string()),
                ..Default::default()
            }),
            selector: LabelSelector {
                match_labels: Some(labels),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(topology_meta(namespace)),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: TOPOLOGY_APP_NAME.to_string(),
                        image: Some(TOPOLOGY_IMAGE.to_string()),
                        ports: Some(vec![ContainerPort {
                            container_port: TOPOLOGY_PORT,
                            protocol: Some("TCP".to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// `Service` in front of the topology deployment.
#[must_use]
pub fn build_topology_service(namespace: &str) -> Service {
    Service {
        metadata: topology_meta(namespace),
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(format!("{TOPOLOGY_APP_NAME}-tcp")),
                port: TOPOLOGY_PORT,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::Int(TOPOLOGY_PORT)),
                ..Default::default()
            }]),
            selector: Some(build_deployment_config_selector(TOPOLOGY_APP_NAME)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Create the topology `Deployment` and `Service` if they are missing.
///
/// The service is still checked when the deployment cannot be created.
///
/// # Errors
///
/// Returns the first API error encountered.
pub async fn ensure_topology_service(client: &Client, namespace: &str) -> Result<()> {
    let deployment = create_if_missing(client, namespace, &build_topology_deployment(namespace))
        .await
        .map(|_| ());
    if let Err(e) = &deployment {
        error!(
            namespace = %namespace,
            "Failed to ensure topology Deployment: {e:#}"
        );
    }

    let service = create_if_missing(client, namespace, &build_topology_service(namespace))
        .await
        .map(|_| ());
    if let Err(e) = &service {
        error!(
            namespace = %namespace,
            "Failed to ensure topology Service: {e:#}"
        );
    }

    deployment.and(service)
}

/// Keep the topology service installed, checking every `interval`.
///
/// Failures are logged and retried on the next tick. The loop never returns.
pub async fn run_topology_loop(client: Client, namespace: String, interval: Duration) -> Result<()> {
    info!(
        namespace = %namespace,
        interval_secs = interval.as_secs(),
        "Starting topology service loop"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if ensure_topology_service(&client, &namespace).await.is_ok() {
            debug!(namespace = %namespace, "Topology service in place");
        }
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod topology_tests;
