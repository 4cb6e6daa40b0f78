// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! All controllers receive an `Arc<Context>` that contains:
//! - Kubernetes client
//! - HTTP client for git hosting APIs
//! - Git hosting endpoints
//! - Operator configuration

use crate::config::OperatorConfig;
use crate::constants::GIT_HTTP_TIMEOUT_SECS;
use crate::git::HostingEndpoints;
use kube::Client;
use std::time::Duration;

/// `User-Agent` sent on every git hosting request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// HTTP client for git hosting API calls
    pub http_client: reqwest::Client,

    /// Base URLs of GitHub, GitLab and Bitbucket
    pub endpoints: HostingEndpoints,

    /// Operator configuration
    pub config: OperatorConfig,
}

impl Context {
    /// Build the context from a client and the operator configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(client: Client, config: OperatorConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client,
            http_client: build_http_client()?,
            endpoints: config.hosting_endpoints(),
            config,
        })
    }
}

/// HTTP client used for git hosting requests.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    build_http_client_with_proxies(Vec::new())
}

/// HTTP client for git hosting requests routed through `proxies`.
///
/// Carries the same timeout and `User-Agent` as [`build_http_client`]. GitHub
/// answers requests without a `User-Agent` with 403.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_http_client_with_proxies(
    proxies: Vec<reqwest::Proxy>,
) -> Result<reqwest::Client, reqwest::Error> {
    proxies
        .into_iter()
        .fold(reqwest::Client::builder(), reqwest::ClientBuilder::proxy)
        .timeout(Duration::from_secs(GIT_HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
