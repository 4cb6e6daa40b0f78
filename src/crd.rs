// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for the developer console.
//!
//! This module defines all Kubernetes Custom Resource Definitions served under
//! `devconsole.openshift.io/v1alpha1`.
//!
//! # Resource Types
//!
//! ## Source
//!
//! - [`GitSource`] - A git repository with optional credentials and proxy settings
//! - [`GitSourceAnalysis`] - A request to detect the build tooling of a [`GitSource`]
//!
//! ## Applications
//!
//! - [`Component`] - An application built from a [`GitSource`] with S2I and deployed
//!   as a `DeploymentConfig`
//!
//! ## Console
//!
//! - [`DevopsConsole`] - Deploys the app-service for a namespace
//! - [`Installer`] - Deploys the app-service behind a `Service` and `Route`
//!
//! ## Environments
//!
//! - [`Environment`] - A named deployment target (cluster and namespace)
//! - [`EnvDeployment`] - Binds a workload to an [`Environment`]
//!
//! # Example: Describing a Git Source
//!
//! ```rust,no_run
//! use devconsole_operator::crd::{GitSourceSpec, SecretRef};
//!
//! let spec = GitSourceSpec {
//!     url: "https://github.com/redhat-developer/devconsole-api".to_string(),
//!     git_ref: Some("master".to_string()),
//!     secret_ref: Some(SecretRef {
//!         name: "github-token".to_string(),
//!     }),
//!     ..Default::default()
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. Common types include: Ready, Available, Progressing, Degraded, Failed.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

// ============================================================================
// GitSource
// ============================================================================

/// Reference to a `Secret` in the same namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
pub struct SecretRef {
    /// Name of the secret.
    pub name: String,
}

/// Lifecycle of a `GitSource`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum GitSourceState {
    /// The source has been observed but not validated yet.
    Initializing,
    /// The source has been validated.
    Ready,
}

/// Outcome of a git connection check.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ConnectionState {
    /// The repository and branch are reachable with the given credentials.
    #[serde(rename = "OK")]
    Ok,
    /// The check failed, see `reason`.
    Failed,
}

/// Reason a git connection check failed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ConnectionFailureReason {
    /// The repository does not exist, is private, or the host cannot be reached.
    RepoNotReachable,
    /// The host rejected the credentials.
    BadCredentials,
    /// The repository exists but the requested ref does not.
    BranchNotFound,
    /// The operator could not perform the check (secret, process or filesystem errors).
    ConnectionInternalFailure,
}

impl ConnectionFailureReason {
    /// Returns the serialized name of the reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepoNotReachable => "RepoNotReachable",
            Self::BadCredentials => "BadCredentials",
            Self::BranchNotFound => "BranchNotFound",
            Self::ConnectionInternalFailure => "ConnectionInternalFailure",
        }
    }
}

impl fmt::Display for ConnectionFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the last connection check against a git repository.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// `OK` or `Failed`. Empty until the first check has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ConnectionState>,

    /// Machine readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConnectionFailureReason>,

    /// Human readable failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Connection {
    /// A successful connection.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            state: Some(ConnectionState::Ok),
            reason: None,
            error: None,
        }
    }

    /// A failed connection with the given reason and message.
    #[must_use]
    pub fn failed(reason: ConnectionFailureReason, error: impl Into<String>) -> Self {
        Self {
            state: Some(ConnectionState::Failed),
            reason: Some(reason),
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the connection check succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.state == Some(ConnectionState::Ok)
    }
}

/// `GitSource` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitSourceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<GitSourceState>,
    #[serde(default)]
    pub connection: Connection,
}

/// `GitSource` describes a git repository the console can build from.
///
/// The operator validates the repository once: it checks that the host accepts the
/// referenced credentials, that the repository exists and that the ref exists, and
/// records the outcome in `status.connection`.
///
/// # Example
///
/// ```yaml
/// apiVersion: devconsole.openshift.io/v1alpha1
/// kind: GitSource
/// metadata:
///   name: nodejs-ex
///   namespace: myproject
/// spec:
///   url: https://github.com/sclorg/nodejs-ex
///   ref: master
///   secretRef:
///     name: github-token
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "GitSource",
    namespaced,
    doc = "GitSource describes a git repository (URL, ref, credentials and proxy settings) that applications are built from."
)]
#[kube(status = "GitSourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct GitSourceSpec {
    /// Repository URL. `https://`, `http://`, `ssh://`, `git://` and scp-like
    /// `git@host:org/repo.git` forms are accepted.
    pub url: String,

    /// Branch or tag to build. Defaults to `master`.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Sub-directory of the repository that holds the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<String>,

    /// Secret holding `username`/`password`, a token in `password`, or
    /// `ssh-privatekey` with an optional `passphrase`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretRef>,
}

impl GitSourceSpec {
    /// The ref to check out, falling back to the default branch.
    #[must_use]
    pub fn git_ref_or_default(&self) -> &str {
        self.git_ref
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(crate::constants::DEFAULT_GIT_REF)
    }
}

// ============================================================================
// GitSourceAnalysis
// ============================================================================

/// Reference to a `GitSource` in the same namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
pub struct GitSourceRef {
    pub name: String,
}

/// A build tool detected at the repository root.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedBuildType {
    /// Build tool name (e.g. `Maven`, `NodeJS`).
    pub name: String,
    /// Language the build tool targets.
    pub language: String,
    /// Root files that triggered the detection.
    #[serde(default)]
    pub detected_files: Vec<String>,
}

/// Build environment statistics of a repository.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildEnvStats {
    #[serde(default)]
    pub detected_build_types: Vec<DetectedBuildType>,
    /// Languages ordered by descending share of the repository.
    #[serde(default)]
    pub sorted_languages: Vec<String>,
}

/// `GitSourceAnalysis` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitSourceAnalysisStatus {
    #[serde(default)]
    pub analyzed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub build_env_statistics: BuildEnvStats,
}

/// `GitSourceAnalysis` requests detection of the build tooling used by a `GitSource`.
///
/// The analysis runs once. Its result is written to `status.buildEnvStatistics`;
/// failures are written to `status.error`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "GitSourceAnalysis",
    plural = "gitsourceanalyses",
    namespaced,
    doc = "GitSourceAnalysis detects the build tools and languages used by the repository of a GitSource."
)]
#[kube(status = "GitSourceAnalysisStatus")]
#[serde(rename_all = "camelCase")]
pub struct GitSourceAnalysisSpec {
    pub git_source_ref: GitSourceRef,
}

// ============================================================================
// Component
// ============================================================================

/// `Component` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    /// Last build number of the component's `BuildConfig`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_number: Option<String>,
}

/// `Component` is an application built from a `GitSource` with source-to-image.
///
/// The operator creates an output `ImageStream`, a builder `ImageStream` when the
/// cluster does not already provide one, a `BuildConfig` and a `DeploymentConfig`.
/// When `port` is set it also exposes the application through a `Service` and a `Route`.
///
/// # Example
///
/// ```yaml
/// apiVersion: devconsole.openshift.io/v1alpha1
/// kind: Component
/// metadata:
///   name: myapp
///   namespace: myproject
/// spec:
///   buildType: nodejs
///   gitSourceRef: nodejs-ex
///   port: 8080
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "Component",
    namespaced,
    doc = "Component builds an application from a GitSource with S2I and deploys it as a DeploymentConfig, optionally exposed by a Service and Route."
)]
#[kube(status = "ComponentStatus")]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    /// Builder image family (`nodejs`, `java`, `python`, `ruby`, `golang`) or the
    /// name of an `ImageStream` in the `openshift` namespace.
    #[serde(default)]
    pub build_type: String,

    /// Name of the `GitSource` to build from.
    #[serde(default)]
    pub git_source_ref: String,

    /// Port to expose through a `Service` and `Route`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1024, max = 65535))]
    pub port: Option<i32>,
}

// ============================================================================
// DevopsConsole / Installer
// ============================================================================

/// Status shared by the console installers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppServiceStatus {
    /// URL the app-service is reachable at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_service_url: Option<String>,
}

/// `DevopsConsole` deploys the app-service into its namespace.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "DevopsConsole",
    namespaced,
    doc = "DevopsConsole deploys the developer console app-service into its namespace."
)]
#[kube(status = "AppServiceStatus")]
pub struct DevopsConsoleSpec {}

/// `Installer` deploys the app-service with a `Service` and `Route` in front of it.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "Installer",
    namespaced,
    doc = "Installer deploys the developer console app-service behind a Service and Route and reports its URL."
)]
#[kube(status = "AppServiceStatus")]
pub struct InstallerSpec {}

// ============================================================================
// Environment / EnvDeployment
// ============================================================================

/// Cluster an `Environment` targets.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
}

/// `Environment` names a deployment target such as `dev`, `stage` or `prod`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "Environment",
    namespaced,
    doc = "Environment names a deployment target made of a cluster and a namespace."
)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSpec {
    /// Environment type (`dev`, `stage`, `prod`, ...).
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Typed reference to another object in the same namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypedObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_group: Option<String>,
    pub kind: String,
    pub name: String,
}

/// `EnvDeployment` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvDeploymentStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `EnvDeployment` binds a `Deployment` or `DeploymentConfig` to an `Environment`.
///
/// # Example
///
/// ```yaml
/// apiVersion: devconsole.openshift.io/v1alpha1
/// kind: EnvDeployment
/// metadata:
///   name: myapp-stage
/// spec:
///   environmentRef:
///     apiGroup: devconsole.openshift.io
///     kind: Environment
///     name: stage
///   deploymentRef:
///     apiGroup: apps.openshift.io
///     kind: DeploymentConfig
///     name: myapp
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "devconsole.openshift.io",
    version = "v1alpha1",
    kind = "EnvDeployment",
    namespaced,
    doc = "EnvDeployment binds a Deployment or DeploymentConfig to an Environment."
)]
#[kube(status = "EnvDeploymentStatus")]
#[serde(rename_all = "camelCase")]
pub struct EnvDeploymentSpec {
    pub environment_ref: TypedObjectReference,
    pub deployment_ref: TypedObjectReference,
}
