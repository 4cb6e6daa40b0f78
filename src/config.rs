// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! Every setting can be given as a command line flag or through the
//! environment variable named next to it.

use crate::constants::{
    DEFAULT_BITBUCKET_API_URL, DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_URL,
    DEFAULT_GITLAB_API_URL, DEFAULT_TOPOLOGY_NAMESPACE, METRICS_SERVER_PORT,
    TOPOLOGY_RESYNC_INTERVAL_SECS,
};
use crate::git::HostingEndpoints;
use clap::Parser;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors detected at use time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("APP_SERVICE_IMAGE_NAME must be set")]
    MissingAppServiceImage,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "devconsole-operator",
    about = "Kubernetes operator backing the OpenShift developer console",
    version
)]
pub struct OperatorConfig {
    /// Namespace to watch. Empty watches all namespaces.
    #[arg(long, default_value = "", env = "WATCH_NAMESPACE")]
    pub watch_namespace: String,

    /// Image of the app-service deployed by DevopsConsole and Installer resources.
    #[arg(long, env = "APP_SERVICE_IMAGE_NAME")]
    pub app_service_image: Option<String>,

    /// Port of the metrics and health probe server.
    #[arg(long, default_value_t = METRICS_SERVER_PORT, env = "METRICS_PORT")]
    pub metrics_port: u16,

    #[arg(long, default_value = DEFAULT_GITHUB_API_URL, env = "GITHUB_API_URL")]
    pub github_api_url: String,

    #[arg(long, default_value = DEFAULT_GITHUB_URL, env = "GITHUB_URL")]
    pub github_url: String,

    #[arg(long, default_value = DEFAULT_GITLAB_API_URL, env = "GITLAB_API_URL")]
    pub gitlab_api_url: String,

    #[arg(long, default_value = DEFAULT_BITBUCKET_API_URL, env = "BITBUCKET_API_URL")]
    pub bitbucket_api_url: String,

    /// Namespace the topology service is installed into.
    #[arg(long, default_value = DEFAULT_TOPOLOGY_NAMESPACE, env = "TOPOLOGY_NAMESPACE")]
    pub topology_namespace: String,

    /// Seconds between topology service checks.
    #[arg(long, default_value_t = TOPOLOGY_RESYNC_INTERVAL_SECS, env = "TOPOLOGY_RESYNC_SECS")]
    pub topology_resync_secs: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            watch_namespace: String::new(),
            app_service_image: None,
            metrics_port: METRICS_SERVER_PORT,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            gitlab_api_url: DEFAULT_GITLAB_API_URL.to_string(),
            bitbucket_api_url: DEFAULT_BITBUCKET_API_URL.to_string(),
            topology_namespace: DEFAULT_TOPOLOGY_NAMESPACE.to_string(),
            topology_resync_secs: TOPOLOGY_RESYNC_INTERVAL_SECS,
        }
    }
}

impl OperatorConfig {
    /// The watched namespace, or `None` for all namespaces.
    #[must_use]
    pub fn watch_namespace(&self) -> Option<&str> {
        Some(self.watch_namespace.trim()).filter(|ns| !ns.is_empty())
    }

    /// The app-service image.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAppServiceImage`] when no image is configured.
    pub fn app_service_image(&self) -> Result<&str, ConfigError> {
        self.app_service_image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .ok_or(ConfigError::MissingAppServiceImage)
    }

    #[must_use]
    pub fn hosting_endpoints(&self) -> HostingEndpoints {
        HostingEndpoints {
            github_api_url: self.github_api_url.clone(),
            github_url: self.github_url.clone(),
            gitlab_api_url: self.gitlab_api_url.clone(),
            bitbucket_api_url: self.bitbucket_api_url.clone(),
        }
    }

    #[must_use]
    pub fn topology_resync_interval(&self) -> Duration {
        Duration::from_secs(self.topology_resync_secs.max(1))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
