// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across all reconcilers.
//!
//! This module defines standard Kubernetes labels and OpenShift console annotations
//! to ensure consistency across all resources created by the operator.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the name of the application
pub const K8S_NAME: &str = "app.kubernetes.io/name";

// ============================================================================
// Application Labels
// ============================================================================

/// Label grouping every object generated for a `Component`
pub const APP_LABEL: &str = "app";

/// Selector key OpenShift stamps on pods rolled out by a `DeploymentConfig`
pub const DEPLOYMENT_CONFIG_LABEL: &str = "deploymentconfig";

// ============================================================================
// OpenShift Console Annotations
// ============================================================================

/// Annotation holding the git repository a workload was built from
pub const VCS_URI_ANNOTATION: &str = "app.openshift.io/vcs-uri";

/// Annotation holding the git ref a workload was built from
pub const VCS_REF_ANNOTATION: &str = "app.openshift.io/vcs-ref";

/// Builds the `{app: <name>}` label set shared by generated objects.
#[must_use]
pub fn build_app_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

/// Builds the `{deploymentconfig: <name>}` selector for Services fronting a `DeploymentConfig`.
#[must_use]
pub fn build_deployment_config_selector(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(DEPLOYMENT_CONFIG_LABEL.to_string(), name.to_string())])
}

/// Builds VCS annotations, skipping empty values.
#[must_use]
pub fn build_vcs_annotations(uri: &str, git_ref: &str) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    if !uri.is_empty() {
        annotations.insert(VCS_URI_ANNOTATION.to_string(), uri.to_string());
    }
    if !git_ref.is_empty() {
        annotations.insert(VCS_REF_ANNOTATION.to_string(), git_ref.to_string());
    }
    annotations
}

/// Builds the controller owner reference pointing at `owner`.
///
/// Generated objects are garbage collected with their owner, and the controller
/// is woken up when an owned object changes.
#[must_use]
pub fn build_owner_references<K>(owner: &K) -> Vec<OwnerReference>
where
    K: Resource<DynamicType = ()>,
{
    vec![OwnerReference {
        api_version: K::api_version(&()).to_string(),
        kind: K::kind(&()).to_string(),
        name: owner.name_any(),
        uid: owner.meta().uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }]
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod labels_tests;
