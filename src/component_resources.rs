// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Builders for the objects generated from a `Component`.
//!
//! A `Component` named `myapp` produces:
//!
//! - `ImageStream` `myapp` receiving the build output
//! - `ImageStream` `<buildType>` holding the S2I builder image, unless the
//!   cluster already ships one in the `openshift` namespace
//! - `BuildConfig` `myapp` building the `GitSource` with the builder image
//! - `DeploymentConfig` `myapp` rolling out `myapp:latest`
//! - `Service` and `Route` `myapp` when a port is requested
//!
//! Every object is labelled `app: myapp` and owned by the `Component`.

use crate::constants::{
    APPLICATION_CONTAINER_PORT, DEFAULT_REPLICAS, LATEST_TAG, MAX_COMPONENT_PORT,
    MIN_COMPONENT_PORT,
};
use crate::crd::{Component, GitSource};
use crate::labels::{
    build_app_labels, build_deployment_config_selector, build_owner_references,
    build_vcs_annotations,
};
use crate::openshift::{
    BuildConfig, BuildConfigSpec, BuildOutput, BuildSource, BuildStrategy, BuildTriggerPolicy,
    DeploymentConfig, DeploymentConfigSpec, DeploymentStrategy, DeploymentTriggerImageChangeParams,
    DeploymentTriggerPolicy, GitBuildSource, ImageChangeTrigger, ImageLookupPolicy, ImageStream,
    ImageStreamSpec, LocalObjectReference, ObjectReference, Route, RoutePort, RouteSpec,
    RouteTargetReference, SourceBuildStrategy, TagReference,
};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;
use thiserror::Error;

/// Builder images used when the cluster does not provide an image stream for
/// the requested build type.
pub const BUILDER_IMAGES: [(&str, &str); 5] = [
    ("nodejs", "nodeshift/centos7-s2i-nodejs:10.x"),
    (
        "java",
        "registry.access.redhat.com/redhat-openjdk-18/openjdk18-openshift:latest",
    ),
    ("python", "centos/python-36-centos7:latest"),
    ("ruby", "centos/ruby-25-centos7:latest"),
    ("golang", "centos/go-toolset-7-centos7:latest"),
];

/// Errors raised while turning a `Component` into cluster objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("component {component} does not reference a GitSource")]
    MissingGitSourceRef { component: String },

    #[error("GitSource {name} referenced by component {component} not found")]
    GitSourceNotFound { component: String, name: String },

    #[error("component {component} does not set a buildType")]
    MissingBuildType { component: String },

    #[error("unknown build type {build_type}: no ImageStream in the openshift namespace and no builder image known")]
    UnknownBuildType { build_type: String },

    #[error("port {port} is out of range [{MIN_COMPONENT_PORT}-{MAX_COMPONENT_PORT}]")]
    PortOutOfRange { port: i32 },
}

/// Builder image stream a `BuildConfig` builds from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderImage {
    pub name: String,
    pub namespace: String,
}

/// Pull spec of the builder image for a build type, if one is known.
#[must_use]
pub fn builder_image_for(build_type: &str) -> Option<&'static str> {
    BUILDER_IMAGES
        .iter()
        .find(|(t, _)| *t == build_type)
        .map(|(_, image)| *image)
}

fn image_stream_tag(name: &str) -> String {
    format!("{name}:{LATEST_TAG}")
}

fn component_meta(component: &Component) -> ObjectMeta {
    let name = component.name_any();
    ObjectMeta {
        name: Some(name.clone()),
        namespace: component.namespace(),
        labels: Some(build_app_labels(&name)),
        owner_references: Some(build_owner_references(component)),
        ..Default::default()
    }
}

fn with_vcs_annotations(mut meta: ObjectMeta, source: &GitSource) -> ObjectMeta {
    let annotations = build_vcs_annotations(
        &source.spec.url,
        source.spec.git_ref.as_deref().unwrap_or_default(),
    );
    if !annotations.is_empty() {
        meta.annotations = Some(annotations);
    }
    meta
}

/// `ImageStream` receiving the images built for the component.
#[must_use]
pub fn build_output_image_stream(component: &Component) -> ImageStream {
    ImageStream {
        metadata: component_meta(component),
        spec: ImageStreamSpec::default(),
    }
}

/// `ImageStream` importing the builder image for the component's build type.
///
/// # Errors
///
/// Returns [`ComponentError::UnknownBuildType`] if no builder image is known.
pub fn build_builder_image_stream(component: &Component) -> Result<ImageStream, ComponentError> {
    let build_type = &component.spec.build_type;
    let image = builder_image_for(build_type).ok_or_else(|| ComponentError::UnknownBuildType {
        build_type: build_type.clone(),
    })?;

    let mut metadata = component_meta(component);
    metadata.name = Some(build_type.clone());

    Ok(ImageStream {
        metadata,
        spec: ImageStreamSpec {
            lookup_policy: Some(ImageLookupPolicy { local: false }),
            tags: vec![TagReference {
                name: LATEST_TAG.to_string(),
                annotations: None,
                from: Some(ObjectReference::docker_image(image)),
            }],
        },
    })
}

/// S2I `BuildConfig` building the `GitSource` into the component's image stream.
///
/// `source_secret` is set only when the source's secret exists in the namespace.
#[must_use]
pub fn build_build_config(
    component: &Component,
    source: &GitSource,
    builder: &BuilderImage,
    source_secret: Option<&str>,
) -> BuildConfig {
    let name = component.name_any();

    BuildConfig {
        metadata: with_vcs_annotations(component_meta(component), source),
        spec: BuildConfigSpec {
            triggers: vec![
                BuildTriggerPolicy {
                    r#type: "ConfigChange".to_string(),
                    image_change: None,
                },
                BuildTriggerPolicy {
                    r#type: "ImageChange".to_string(),
                    image_change: Some(ImageChangeTrigger::default()),
                },
            ],
            run_policy: None,
            source: BuildSource {
                r#type: "Git".to_string(),
                git: Some(GitBuildSource {
                    uri: source.spec.url.clone(),
                    git_ref: source.spec.git_ref.clone(),
                }),
                context_dir: source.spec.context_dir.clone(),
                source_secret: source_secret.map(|secret| LocalObjectReference {
                    name: secret.to_string(),
                }),
            },
            strategy: BuildStrategy {
                r#type: "Source".to_string(),
                source_strategy: Some(SourceBuildStrategy {
                    from: ObjectReference::image_stream_tag(
                        &image_stream_tag(&builder.name),
                        Some(&builder.namespace),
                    ),
                    incremental: Some(true),
                }),
            },
            output: BuildOutput {
                to: Some(ObjectReference::image_stream_tag(
                    &image_stream_tag(&name),
                    None,
                )),
            },
        },
        status: None,
    }
}

/// `DeploymentConfig` rolling out the latest image of the component.
#[must_use]
pub fn build_deployment_config(component: &Component, source: &GitSource) -> DeploymentConfig {
    let name = component.name_any();
    let labels = build_app_labels(&name);

    DeploymentConfig {
        metadata: with_vcs_annotations(component_meta(component), source),
        spec: DeploymentConfigSpec {
            strategy: DeploymentStrategy {
                r#type: "Recreate".to_string(),
            },
            triggers: vec![
                DeploymentTriggerPolicy {
                    r#type: "ConfigChange".to_string(),
                    image_change_params: None,
                },
                DeploymentTriggerPolicy {
                    r#type: "ImageChange".to_string(),
                    image_change_params: Some(DeploymentTriggerImageChangeParams {
                        automatic: true,
                        container_names: vec![name.clone()],
                        from: ObjectReference::image_stream_tag(&image_stream_tag(&name), None),
                    }),
                },
            ],
            replicas: DEFAULT_REPLICAS,
            selector: labels.clone(),
            template: Some(PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    name: Some(name.clone()),
                    namespace: component.namespace(),
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: name.clone(),
                        image: Some(image_stream_tag(&name)),
                        ports: Some(vec![ContainerPort {
                            container_port: APPLICATION_CONTAINER_PORT,
                            protocol: Some("TCP".to_string()),
                            ..Default::default()
                        }]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            }),
        },
    }
}

/// `Service` exposing `port` of the component's pods.
///
/// # Errors
///
/// Returns [`ComponentError::PortOutOfRange`] for ports outside 1024-65535.
pub fn build_service(component: &Component, port: i32) -> Result<Service, ComponentError> {
    if !(MIN_COMPONENT_PORT..=MAX_COMPONENT_PORT).contains(&port) {
        return Err(ComponentError::PortOutOfRange { port });
    }

    let name = component.name_any();
    Ok(Service {
        metadata: component_meta(component),
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(format!("{name}-tcp")),
                port,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::Int(port)),
                ..Default::default()
            }]),
            selector: Some(build_deployment_config_selector(&name)),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// `Route` exposing the component's `Service`.
#[must_use]
pub fn build_route(component: &Component, port: i32) -> Route {
    Route {
        metadata: component_meta(component),
        spec: RouteSpec {
            host: None,
            to: RouteTargetReference {
                kind: "Service".to_string(),
                name: component.name_any(),
                weight: None,
            },
            port: Some(RoutePort {
                target_port: IntOrString::String(format!("{port}-tcp")),
            }),
        },
        status: None,
    }
}

/// Revision to report on the component for a `BuildConfig`, if it has built.
#[must_use]
pub fn revision_of(build_config: &BuildConfig) -> Option<String> {
    build_config
        .status
        .as_ref()
        .map(|status| status.last_version.to_string())
}

#[cfg(test)]
#[path = "component_resources_tests.rs"]
mod component_resources_tests;
