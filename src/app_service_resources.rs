// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders for the app-service objects installed by `DevopsConsole` and
//! `Installer` resources.

use crate::constants::{
    APP_SERVICE_CONTAINER_NAME, APP_SERVICE_DEPLOYMENT_NAME, APP_SERVICE_PORT,
    APP_SERVICE_PORT_NAME, APP_SERVICE_ROUTE_NAME, APP_SERVICE_SERVICE_NAME, DEFAULT_REPLICAS,
    DEVOPS_CONSOLE_DEPLOYMENT_SUFFIX,
};
use crate::crd::{DevopsConsole, Installer};
use crate::labels::{build_app_labels, build_owner_references};
use crate::openshift::{Route, RouteSpec, RouteTargetReference};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Command keeping the `DevopsConsole` app-service container idle.
pub const IDLE_COMMAND: [&str; 3] = ["/bin/sh", "-c", "tail -f /dev/null"];

fn object_meta(
    name: &str,
    namespace: Option<String>,
    labels: &BTreeMap<String, String>,
    owner_references: Vec<OwnerReference>,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace,
        labels: Some(labels.clone()),
        owner_references: Some(owner_references),
        ..Default::default()
    }
}

fn app_service_deployment(
    meta: ObjectMeta,
    labels: BTreeMap<String, String>,
    image: &str,
    command: Option<Vec<String>>,
) -> Deployment {
    Deployment {
        metadata: meta,
        spec: Some(DeploymentSpec {
            replicas: Some(DEFAULT_REPLICAS),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: APP_SERVICE_CONTAINER_NAME.to_string(),
                        image: Some(image.to_string()),
                        command,
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

/// Deployment `<name>-deploy` running an idle app-service container.
#[must_use]
pub fn build_devops_console_deployment(console: &DevopsConsole, image: &str) -> Deployment {
    let name = console.name_any();
    let labels = build_app_labels(&name);
    let meta = object_meta(
        &format!("{name}{DEVOPS_CONSOLE_DEPLOYMENT_SUFFIX}"),
        console.namespace(),
        &labels,
        build_owner_references(console),
    );

    app_service_deployment(
        meta,
        labels,
        image,
        Some(IDLE_COMMAND.iter().map(|s| (*s).to_string()).collect()),
    )
}

/// Deployment `appservice-deploy` running the app-service.
#[must_use]
pub fn build_installer_deployment(installer: &Installer, image: &str) -> Deployment {
    let labels = build_app_labels(&installer.name_any());
    let meta = object_meta(
        APP_SERVICE_DEPLOYMENT_NAME,
        installer.namespace(),
        &labels,
        build_owner_references(installer),
    );

    app_service_deployment(meta, labels, image, None)
}

/// Service `appservice-service` in front of the installer's deployment.
#[must_use]
pub fn build_installer_service(installer: &Installer) -> Service {
    let labels = build_app_labels(&installer.name_any());

    Service {
        metadata: object_meta(
            APP_SERVICE_SERVICE_NAME,
            installer.namespace(),
            &labels,
            build_owner_references(installer),
        ),
        spec: Some(ServiceSpec {
            selector: Some(labels),
            ports: Some(vec![ServicePort {
                name: Some(APP_SERVICE_PORT_NAME.to_string()),
                protocol: Some("TCP".to_string()),
                port: APP_SERVICE_PORT,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Route `appservice-route` exposing `service_name`.
#[must_use]
pub fn build_installer_route(installer: &Installer, service_name: &str) -> Route {
    let labels = build_app_labels(&installer.name_any());

    Route {
        metadata: object_meta(
            APP_SERVICE_ROUTE_NAME,
            installer.namespace(),
            &labels,
            build_owner_references(installer),
        ),
        spec: RouteSpec {
            host: None,
            to: RouteTargetReference {
                kind: "Service".to_string(),
                name: service_name.to_string(),
                weight: None,
            },
            port: None,
        },
        status: None,
    }
}

#[cfg(test)]
#[path = "app_service_resources_tests.rs"]
mod app_service_resources_tests;
