// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Repository access backends.
//!
//! Each backend answers the same questions about a repository: do the
//! credentials work, does the repository exist, does the ref exist, which files
//! sit at the root and which languages are used.
//!
//! | Backend | Used for |
//! |---------|----------|
//! | [`github::GitHubService`] | github.com |
//! | [`gitlab::GitLabService`] | gitlab.com and self-hosted GitLab |
//! | [`bitbucket::BitbucketService`] | bitbucket.org |
//! | [`smart_http::SmartHttpService`] | any HTTP(S) host, anonymous checks |
//! | [`cli::GitCliService`] | SSH and git:// transports, clone-based listing |

pub mod bitbucket;
pub mod cli;
pub mod github;
pub mod gitlab;
pub mod smart_http;

use crate::git::url::GitProvider;
use crate::git_errors::GitError;
use crate::http_errors::{map_connection_error, map_http_status_to_error, ProbeStage};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Read access to a hosted repository.
#[async_trait::async_trait]
pub trait RepositoryService: Send + Sync {
    /// Provider label used in logs and metrics.
    fn provider(&self) -> GitProvider;

    /// Verify that the host accepts the configured credentials.
    async fn check_credentials(&self) -> Result<(), GitError>;

    /// Verify that the repository exists and is readable.
    async fn check_repository(&self) -> Result<(), GitError>;

    /// Verify that `git_ref` names a branch or tag of the repository.
    async fn check_branch(&self, git_ref: &str) -> Result<(), GitError>;

    /// Names of the files at the repository root for `git_ref`.
    async fn root_files(&self, git_ref: &str) -> Result<Vec<String>, GitError>;

    /// Languages used by the repository, most used first.
    async fn languages(&self, git_ref: &str) -> Result<Vec<String>, GitError>;
}

/// Send a request and classify the response status.
///
/// Returns the response on 2xx.
pub(crate) async fn send_checked(
    http: &HttpClient,
    method: Method,
    url: &str,
    authorization: Option<&str>,
    stage: ProbeStage<'_>,
    target: &str,
) -> Result<reqwest::Response, GitError> {
    let mut request = http.request(method.clone(), url);
    if let Some(value) = authorization {
        request = request.header("Authorization", value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| map_connection_error(target, &e))?;
    let status = response.status();

    debug!(
        method = %method,
        url = %url,
        status = %status,
        "Git hosting API response"
    );

    match map_http_status_to_error(status.as_u16(), stage, target) {
        Some(error) => Err(error),
        None => Ok(response),
    }
}

/// `GET` a URL and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &HttpClient,
    url: &str,
    authorization: Option<&str>,
    stage: ProbeStage<'_>,
    target: &str,
) -> Result<T, GitError> {
    send_checked(http, Method::GET, url, authorization, stage, target)
        .await?
        .json::<T>()
        .await
        .map_err(|e| GitError::Internal {
            repository: target.to_string(),
            detail: format!("unexpected response from {url}: {e}"),
        })
}

/// Probe a URL with `GET`, discarding the body.
pub(crate) async fn probe(
    http: &HttpClient,
    url: &str,
    authorization: Option<&str>,
    stage: ProbeStage<'_>,
    target: &str,
) -> Result<(), GitError> {
    send_checked(http, Method::GET, url, authorization, stage, target)
        .await
        .map(|_| ())
}

/// Percent-encode a single path segment (`/` included).
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
