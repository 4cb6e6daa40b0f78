// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the devconsole operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all devconsole CRDs
pub const API_GROUP: &str = "devconsole.openshift.io";

/// API version for all devconsole CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "devconsole.openshift.io/v1alpha1";

/// Kind name for `Component` resource
pub const KIND_COMPONENT: &str = "Component";

/// Kind name for `GitSource` resource
pub const KIND_GIT_SOURCE: &str = "GitSource";

/// Kind name for `GitSourceAnalysis` resource
pub const KIND_GIT_SOURCE_ANALYSIS: &str = "GitSourceAnalysis";

/// Kind name for `DevopsConsole` resource
pub const KIND_DEVOPS_CONSOLE: &str = "DevopsConsole";

/// Kind name for `Installer` resource
pub const KIND_INSTALLER: &str = "Installer";

/// Kind name for `Environment` resource
pub const KIND_ENVIRONMENT: &str = "Environment";

/// Kind name for `EnvDeployment` resource
pub const KIND_ENV_DEPLOYMENT: &str = "EnvDeployment";

/// Kind name for Kubernetes `Deployment`
pub const KIND_DEPLOYMENT: &str = "Deployment";

/// Kind name for OpenShift `DeploymentConfig`
pub const KIND_DEPLOYMENT_CONFIG: &str = "DeploymentConfig";

// ============================================================================
// Git Constants
// ============================================================================

/// Branch used when a `GitSource` does not name a ref
pub const DEFAULT_GIT_REF: &str = "master";

/// Smart-HTTP service name for ref advertisement
pub const GIT_UPLOAD_PACK_SERVICE: &str = "git-upload-pack";

/// Timeout for a single provider API request
pub const GIT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Timeout for `git ls-remote` and shallow clones
pub const GIT_COMMAND_TIMEOUT_SECS: u64 = 120;

/// Default GitHub REST API endpoint
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default GitHub web endpoint (used for anonymous file probes)
pub const DEFAULT_GITHUB_URL: &str = "https://github.com";

/// Default Bitbucket REST API endpoint
pub const DEFAULT_BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Default GitLab REST API endpoint for gitlab.com
pub const DEFAULT_GITLAB_API_URL: &str = "https://gitlab.com/api/v4";

/// Page size requested from hosting APIs when listing repository content
pub const GIT_API_PAGE_SIZE: u32 = 100;

/// Upper bound on pages followed when listing a repository root
pub const GIT_API_MAX_PAGES: u32 = 20;

/// Environment variable carrying the secret answered by the askpass helper
pub const GIT_ASKPASS_SECRET_ENV: &str = "DEVCONSOLE_GIT_ASKPASS_SECRET";

/// Username sent with anonymous Basic authentication
pub const ANONYMOUS_USERNAME: &str = "anonymous";

// ============================================================================
// Secret Keys
// ============================================================================

/// Secret key holding a username
pub const SECRET_KEY_USERNAME: &str = "username";

/// Secret key holding a password or access token
pub const SECRET_KEY_PASSWORD: &str = "password";

/// Secret key holding an SSH private key
pub const SECRET_KEY_SSH_PRIVATE_KEY: &str = "ssh-privatekey";

/// Secret key holding the SSH private key passphrase
pub const SECRET_KEY_PASSPHRASE: &str = "passphrase";

// ============================================================================
// Component Build Constants
// ============================================================================

/// Namespace holding the cluster-wide builder image streams
pub const OPENSHIFT_NAMESPACE: &str = "openshift";

/// Tag used for builder and output image streams
pub const LATEST_TAG: &str = "latest";

/// Container port exposed by generated `DeploymentConfig`s
pub const APPLICATION_CONTAINER_PORT: i32 = 8080;

/// Lowest port a `Component` may expose through its `Service`
pub const MIN_COMPONENT_PORT: i32 = 1024;

/// Highest port a `Component` may expose through its `Service`
pub const MAX_COMPONENT_PORT: i32 = 65535;

/// Replica count for generated workloads
pub const DEFAULT_REPLICAS: i32 = 1;

// ============================================================================
// App Service Constants
// ============================================================================

/// Container name of the app-service
pub const APP_SERVICE_CONTAINER_NAME: &str = "app-service";

/// Deployment created by the `Installer` controller
pub const APP_SERVICE_DEPLOYMENT_NAME: &str = "appservice-deploy";

/// Service created by the `Installer` controller
pub const APP_SERVICE_SERVICE_NAME: &str = "appservice-service";

/// Route created by the `Installer` controller
pub const APP_SERVICE_ROUTE_NAME: &str = "appservice-route";

/// Port exposed by the app-service
pub const APP_SERVICE_PORT: i32 = 8080;

/// Name of the app-service port on its `Service`
pub const APP_SERVICE_PORT_NAME: &str = "main";

/// Suffix appended to a `DevopsConsole` name for its Deployment
pub const DEVOPS_CONSOLE_DEPLOYMENT_SUFFIX: &str = "-deploy";

// ============================================================================
// Topology Constants
// ============================================================================

/// Name of the topology Deployment and Service
pub const TOPOLOGY_APP_NAME: &str = "devconsole-app";

/// Namespace the topology service runs in
pub const DEFAULT_TOPOLOGY_NAMESPACE: &str = "openshift-operators";

/// Image of the topology service
pub const TOPOLOGY_IMAGE: &str = "quay.io/redhat-developer/app-service:latest";

/// Port exposed by the topology service
pub const TOPOLOGY_PORT: i32 = 8080;

/// Interval between topology checks
pub const TOPOLOGY_RESYNC_INTERVAL_SECS: u64 = 60;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration for resources that are settled (5 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 300;

/// Requeue duration for resources still converging (30 seconds)
pub const NOT_READY_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8383;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
