// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # devconsole-operator - OpenShift Developer Console Operator
//!
//! Kubernetes operator backing the OpenShift developer console. It turns a few
//! high level Custom Resources into the OpenShift objects needed to build and
//! run applications from git.
//!
//! ## Overview
//!
//! - `GitSource` - a git repository, validated once against its hosting service
//! - `GitSourceAnalysis` - detects the build environment of a `GitSource`
//! - `Component` - builds a `GitSource` with S2I and deploys the result
//! - `DevopsConsole` / `Installer` - install the console app-service
//! - `Environment` / `EnvDeployment` - bind workloads to deployment targets
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`openshift`] - typed OpenShift objects (`ImageStream`, `BuildConfig`, ...)
//! - [`git`] - git URL parsing, credentials, provider probes and build detection
//! - [`reconcilers`] - reconciliation logic for each resource type
//! - [`component_resources`] / [`app_service_resources`] - object builders
//! - [`topology`] - the cluster-wide topology service
//! - [`context`] / [`config`] - shared controller state and configuration
//! - [`metrics`] / [`server`] - Prometheus metrics and health probes
//!
//! ## Example
//!
//! ```rust,no_run
//! use devconsole_operator::crd::{GitSource, GitSourceSpec};
//! use kube::api::ObjectMeta;
//!
//! let source = GitSource {
//!     metadata: ObjectMeta {
//!         name: Some("nodejs-ex".to_string()),
//!         namespace: Some("myproject".to_string()),
//!         ..Default::default()
//!     },
//!     spec: GitSourceSpec {
//!         url: "https://github.com/sclorg/nodejs-ex".to_string(),
//!         git_ref: Some("master".to_string()),
//!         ..Default::default()
//!     },
//!     status: None,
//! };
//! ```

pub mod app_service_resources;
pub mod component_resources;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod git;
pub mod git_errors;
pub mod http_errors;
pub mod labels;
pub mod metrics;
pub mod openshift;
pub mod reconcilers;
pub mod server;
pub mod status_reasons;
pub mod topology;

#[cfg(test)]
mod crd_tests;
