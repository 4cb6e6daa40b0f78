// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GitLab backend (REST API v4).
//!
//! Projects are addressed by their URL-encoded full path, so nested groups
//! (`group/subgroup/project`) work unchanged.

use super::{encode_segment, get_json, probe, send_checked, RepositoryService};
use crate::constants::{GIT_API_MAX_PAGES, GIT_API_PAGE_SIZE};
use crate::git::credentials::GitCredentials;
use crate::git::detector::sort_languages;
use crate::git::url::{GitEndpoint, GitProvider};
use crate::git::HostingEndpoints;
use crate::git_errors::GitError;
use crate::http_errors::ProbeStage;
use reqwest::{Client as HttpClient, Method};
use serde::Deserialize;
use std::collections::BTreeMap;

const NEXT_PAGE_HEADER: &str = "x-next-page";

#[derive(Debug, Deserialize)]
struct TreeEntry {
    name: String,
}

pub struct GitLabService {
    http: HttpClient,
    api_url: String,
    endpoint: GitEndpoint,
    credentials: GitCredentials,
}

impl GitLabService {
    /// gitlab.com uses the configured API URL; other hosts serve the API under `/api/v4`.
    #[must_use]
    pub fn new(
        http: HttpClient,
        endpoints: &HostingEndpoints,
        endpoint: GitEndpoint,
        credentials: GitCredentials,
    ) -> Self {
        let api_url = if endpoint.host.eq_ignore_ascii_case("gitlab.com") {
            endpoints.gitlab_api_url.trim_end_matches('/').to_string()
        } else {
            format!("{}/api/v4", endpoint.base_url())
        };

        Self {
            http,
            api_url,
            endpoint,
            credentials,
        }
    }

    fn project_url(&self) -> String {
        format!(
            "{}/projects/{}",
            self.api_url,
            encode_segment(self.endpoint.identifier())
        )
    }
}

#[async_trait::async_trait]
impl RepositoryService for GitLabService {
    fn provider(&self) -> GitProvider {
        GitProvider::GitLab
    }

    async fn check_credentials(&self) -> Result<(), GitError> {
        let Some(authorization) = self.credentials.authorization_header() else {
            return Ok(());
        };
        let url = format!("{}/user", self.api_url);
        probe(
            &self.http,
            &url,
            Some(&authorization),
            ProbeStage::Credentials,
            &url,
        )
        .await
    }

    async fn check_repository(&self) -> Result<(), GitError> {
        probe(
            &self.http,
            &self.project_url(),
            self.credentials.authorization_header().as_deref(),
            ProbeStage::Repository,
            self.endpoint.identifier(),
        )
        .await
    }

    async fn check_branch(&self, git_ref: &str) -> Result<(), GitError> {
        let url = format!(
            "{}/repository/branches/{}",
            self.project_url(),
            encode_segment(git_ref)
        );
        probe(
            &self.http,
            &url,
            self.credentials.authorization_header().as_deref(),
            ProbeStage::Branch { branch: git_ref },
            self.endpoint.identifier(),
        )
        .await
    }

    /// Follows `X-Next-Page` for at most [`GIT_API_MAX_PAGES`] pages.
    async fn root_files(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        let authorization = self.credentials.authorization_header();
        let mut files = Vec::new();
        let mut page = 1;

        for _ in 0..GIT_API_MAX_PAGES {
            let url = format!(
                "{}/repository/tree?ref={}&per_page={GIT_API_PAGE_SIZE}&page={page}",
                self.project_url(),
                encode_segment(git_ref)
            );
            let response = send_checked(
                &self.http,
                Method::GET,
                &url,
                authorization.as_deref(),
                ProbeStage::Listing,
                self.endpoint.identifier(),
            )
            .await?;

            let next_page = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());

            let entries: Vec<TreeEntry> =
                response.json().await.map_err(|e| GitError::Internal {
                    repository: self.endpoint.identifier().to_string(),
                    detail: format!("unexpected response from {url}: {e}"),
                })?;
            files.extend(entries.into_iter().map(|e| e.name));

            match next_page {
                Some(next) if next > page => page = next,
                _ => return Ok(files),
            }
        }

        Ok(files)
    }

    async fn languages(&self, _git_ref: &str) -> Result<Vec<String>, GitError> {
        let url = format!("{}/languages", self.project_url());
        let shares: BTreeMap<String, f64> = get_json(
            &self.http,
            &url,
            self.credentials.authorization_header().as_deref(),
            ProbeStage::Listing,
            self.endpoint.identifier(),
        )
        .await?;

        Ok(sort_languages(shares))
    }
}

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod gitlab_tests;
