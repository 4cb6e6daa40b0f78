// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Git repository access.
//!
//! This module validates that a `GitSource` can be reached with its credentials
//! and analyses the repository's build environment.
//!
//! # Module Organization
//!
//! - [`url`] - Repository URL parsing and provider detection
//! - [`credentials`] - Credential selection from Kubernetes Secrets
//! - [`pktline`] - Smart-HTTP ref advertisement parsing
//! - [`providers`] - GitHub, GitLab, Bitbucket, smart-HTTP and `git` CLI backends
//! - [`detector`] - Build tool and language detection
//!
//! # Example
//!
//! ```rust,no_run
//! use devconsole_operator::crd::GitSourceSpec;
//! use devconsole_operator::git::{validate_git_source, GitCredentials, HostingEndpoints};
//!
//! # async fn example() {
//! let spec = GitSourceSpec {
//!     url: "https://github.com/redhat-developer/devconsole-api".to_string(),
//!     ..Default::default()
//! };
//! let connection = validate_git_source(
//!     &reqwest::Client::new(),
//!     &HostingEndpoints::default(),
//!     &spec,
//!     GitCredentials::Anonymous,
//! )
//! .await;
//! println!("{connection:?}");
//! # }
//! ```

pub mod credentials;
pub mod detector;
pub mod pktline;
pub mod providers;
pub mod url;

pub use credentials::{resolve_credentials, GitCredentials};
pub use providers::RepositoryService;
pub use url::{GitEndpoint, GitProvider};

use crate::constants::{
    DEFAULT_BITBUCKET_API_URL, DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_URL, DEFAULT_GITLAB_API_URL,
};
use crate::context::build_http_client_with_proxies;
use crate::crd::{BuildEnvStats, Connection, GitSourceSpec};
use crate::git_errors::GitError;
use crate::metrics;
use providers::{
    bitbucket::BitbucketService, cli::GitCliService, github::GitHubService,
    gitlab::GitLabService, smart_http::SmartHttpService,
};
use tracing::{debug, info, warn};

/// Base URLs of the hosted services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostingEndpoints {
    pub github_api_url: String,
    pub github_url: String,
    pub gitlab_api_url: String,
    pub bitbucket_api_url: String,
}

impl Default for HostingEndpoints {
    fn default() -> Self {
        Self {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_url: DEFAULT_GITHUB_URL.to_string(),
            gitlab_api_url: DEFAULT_GITLAB_API_URL.to_string(),
            bitbucket_api_url: DEFAULT_BITBUCKET_API_URL.to_string(),
        }
    }
}

/// Proxy settings of a `GitSource`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
}

impl ProxySettings {
    #[must_use]
    pub fn from_spec(spec: &GitSourceSpec) -> Self {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            http_proxy: non_empty(&spec.http_proxy),
            https_proxy: non_empty(&spec.https_proxy),
            no_proxy: non_empty(&spec.no_proxy),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.http_proxy.is_none() && self.https_proxy.is_none()
    }

    /// Variables understood by `git` and `curl`.
    #[must_use]
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        if let Some(proxy) = &self.http_proxy {
            vars.push(("http_proxy", proxy.clone()));
        }
        if let Some(proxy) = &self.https_proxy {
            vars.push(("https_proxy", proxy.clone()));
        }
        if let Some(no_proxy) = &self.no_proxy {
            vars.push(("no_proxy", no_proxy.clone()));
        }
        vars
    }

    /// HTTP client honouring these settings. Reuses `shared` when no proxy is set.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Internal`] if a proxy URL is invalid.
    pub fn http_client(
        &self,
        shared: &reqwest::Client,
        repository: &str,
    ) -> Result<reqwest::Client, GitError> {
        if self.is_empty() {
            return Ok(shared.clone());
        }

        let internal = |e: reqwest::Error| GitError::Internal {
            repository: repository.to_string(),
            detail: format!("invalid proxy configuration: {e}"),
        };
        let no_proxy = self
            .no_proxy
            .as_deref()
            .and_then(reqwest::NoProxy::from_string);

        let mut proxies = Vec::new();
        if let Some(proxy) = &self.http_proxy {
            proxies.push(
                reqwest::Proxy::http(proxy)
                    .map_err(internal)?
                    .no_proxy(no_proxy.clone()),
            );
        }
        if let Some(proxy) = &self.https_proxy {
            proxies.push(
                reqwest::Proxy::https(proxy)
                    .map_err(internal)?
                    .no_proxy(no_proxy),
            );
        }
        build_http_client_with_proxies(proxies).map_err(internal)
    }
}

/// What a repository service is going to be asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purpose {
    /// Credential, repository and branch checks
    Validation,
    /// File listing and language detection
    Analysis,
}

/// Pick the backend for a repository.
///
/// | Transport / provider | Validation | Analysis |
/// |----------------------|------------|----------|
/// | SSH, `git://` | `git` CLI | `git` CLI |
/// | GitHub | API, smart-HTTP when anonymous | API, web probes when anonymous |
/// | GitLab, Bitbucket | API, smart-HTTP when anonymous | API |
/// | other HTTP hosts | smart-HTTP | `git` CLI clone |
#[must_use]
pub fn repository_service(
    http: reqwest::Client,
    endpoints: &HostingEndpoints,
    endpoint: GitEndpoint,
    credentials: GitCredentials,
    proxy: ProxySettings,
    purpose: Purpose,
) -> Box<dyn RepositoryService> {
    if endpoint.uses_git_cli() {
        return Box::new(GitCliService::new(endpoint, credentials, proxy));
    }

    let anonymous_validation = purpose == Purpose::Validation && credentials.is_anonymous();

    match endpoint.provider() {
        GitProvider::GitHub if anonymous_validation => Box::new(SmartHttpService::new(
            http,
            endpoint,
            credentials,
            proxy,
            Some(&endpoints.github_url),
        )),
        GitProvider::GitHub => Box::new(GitHubService::new(http, endpoints, endpoint, credentials)),
        GitProvider::GitLab | GitProvider::Bitbucket if anonymous_validation => Box::new(
            SmartHttpService::new(http, endpoint, credentials, proxy, None),
        ),
        GitProvider::GitLab => Box::new(GitLabService::new(http, endpoints, endpoint, credentials)),
        GitProvider::Bitbucket => Box::new(BitbucketService::new(
            http,
            endpoints,
            endpoint,
            credentials,
        )),
        GitProvider::Generic => match purpose {
            Purpose::Validation => Box::new(SmartHttpService::new(
                http,
                endpoint,
                credentials,
                proxy,
                None,
            )),
            Purpose::Analysis => Box::new(GitCliService::new(endpoint, credentials, proxy)),
        },
    }
}

/// Run the credential, repository and branch checks in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first failing check's error.
pub async fn check_connection(
    service: &dyn RepositoryService,
    git_ref: &str,
) -> Result<(), GitError> {
    service.check_credentials().await?;
    service.check_repository().await?;
    service.check_branch(git_ref).await
}

/// Check that a `GitSource` is reachable with the given credentials.
///
/// Never fails: problems are reported in the returned [`Connection`].
pub async fn validate_git_source(
    http: &reqwest::Client,
    endpoints: &HostingEndpoints,
    spec: &GitSourceSpec,
    credentials: GitCredentials,
) -> Connection {
    let git_ref = spec.git_ref_or_default();

    let result = async move {
        let endpoint = GitEndpoint::parse(&spec.url)?;
        let proxy = ProxySettings::from_spec(spec);
        let http = proxy.http_client(http, &spec.url)?;
        let service = repository_service(
            http,
            endpoints,
            endpoint,
            credentials,
            proxy,
            Purpose::Validation,
        );
        let provider = service.provider();
        let outcome = check_connection(service.as_ref(), git_ref).await;
        Ok::<_, GitError>((provider, outcome))
    }
    .await;

    let (provider, outcome) = match result {
        Ok(pair) => pair,
        Err(e) => (GitProvider::Generic, Err(e)),
    };

    match outcome {
        Ok(()) => {
            info!(url = %spec.url, git_ref = %git_ref, provider = %provider, "Git source is reachable");
            metrics::record_git_connection_check(provider.as_str(), "ok");
            Connection::ok()
        }
        Err(e) => {
            warn!(
                url = %spec.url,
                git_ref = %git_ref,
                provider = %provider,
                reason = %e.reason(),
                "Git source validation failed: {e}"
            );
            metrics::record_git_connection_check(provider.as_str(), e.metric_label());
            Connection::failed(e.reason(), e.to_string())
        }
    }
}

/// Detect the build environment of a `GitSource`.
///
/// # Errors
///
/// Returns a [`GitError`] if the URL is invalid or the repository cannot be listed.
pub async fn analyze_git_source(
    http: &reqwest::Client,
    endpoints: &HostingEndpoints,
    spec: &GitSourceSpec,
    credentials: GitCredentials,
) -> Result<BuildEnvStats, GitError> {
    let endpoint = GitEndpoint::parse(&spec.url)?;
    let proxy = ProxySettings::from_spec(spec);
    let http = proxy.http_client(http, &spec.url)?;

    debug!(
        url = %spec.url,
        provider = %endpoint.provider(),
        credentials = credentials.kind(),
        "Analyzing git source"
    );

    let service = repository_service(
        http,
        endpoints,
        endpoint,
        credentials,
        proxy,
        Purpose::Analysis,
    );
    detector::detect_build_environments(service.as_ref(), spec.git_ref_or_default()).await
}
