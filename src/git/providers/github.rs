// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GitHub backend.
//!
//! Authenticated requests use the REST API (`/user`, `/repos/{owner}/{repo}`,
//! `/repos/{owner}/{repo}/branches/{ref}`, `/contents`, `/languages`).
//! Anonymous requests avoid the rate-limited API and probe the web endpoint
//! with `HEAD` requests instead, one per known build manifest.

use super::{encode_segment, get_json, probe, send_checked, RepositoryService};
use crate::git::credentials::GitCredentials;
use crate::git::detector::{manifest_files, sort_languages};
use crate::git::url::{GitEndpoint, GitProvider};
use crate::git::HostingEndpoints;
use crate::git_errors::GitError;
use crate::http_errors::{map_connection_error, map_http_status_to_error, ProbeStage};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
}

pub struct GitHubService {
    http: HttpClient,
    api_url: String,
    web_url: String,
    endpoint: GitEndpoint,
    credentials: GitCredentials,
}

impl GitHubService {
    #[must_use]
    pub fn new(
        http: HttpClient,
        endpoints: &HostingEndpoints,
        endpoint: GitEndpoint,
        credentials: GitCredentials,
    ) -> Self {
        Self {
            http,
            api_url: endpoints.github_api_url.trim_end_matches('/').to_string(),
            web_url: endpoints.github_url.trim_end_matches('/').to_string(),
            endpoint,
            credentials,
        }
    }

    fn repo_api_url(&self) -> String {
        format!("{}/repos/{}", self.api_url, self.endpoint.identifier())
    }

    fn repo_web_url(&self) -> String {
        format!("{}/{}", self.web_url, self.endpoint.identifier())
    }

    fn authorization(&self) -> Option<String> {
        self.credentials.authorization_header()
    }

    /// `HEAD` a file in the web UI. `Ok(false)` means the file does not exist.
    async fn file_exists(&self, git_ref: &str, file: &str) -> Result<bool, GitError> {
        let url = format!("{}/blob/{}/{file}", self.repo_web_url(), encode_segment(git_ref));
        let target = self.endpoint.identifier();

        let response = self
            .http
            .request(Method::HEAD, &url)
            .header("Authorization", GitCredentials::anonymous_header())
            .send()
            .await
            .map_err(|e| map_connection_error(target, &e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status => match map_http_status_to_error(status.as_u16(), ProbeStage::Listing, target) {
                Some(error) => Err(error),
                None => Ok(true),
            },
        }
    }
}

#[async_trait::async_trait]
impl RepositoryService for GitHubService {
    fn provider(&self) -> GitProvider {
        GitProvider::GitHub
    }

    async fn check_credentials(&self) -> Result<(), GitError> {
        let Some(authorization) = self.authorization() else {
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
        let target = self.endpoint.identifier();
        match self.authorization() {
            Some(authorization) => {
                probe(
                    &self.http,
                    &self.repo_api_url(),
                    Some(&authorization),
                    ProbeStage::Repository,
                    target,
                )
                .await
            }
            None => send_checked(
                &self.http,
                Method::HEAD,
                &self.repo_web_url(),
                Some(&GitCredentials::anonymous_header()),
                ProbeStage::Repository,
                target,
            )
            .await
            .map(|_| ()),
        }
    }

    async fn check_branch(&self, git_ref: &str) -> Result<(), GitError> {
        let target = self.endpoint.identifier();
        let stage = ProbeStage::Branch { branch: git_ref };
        match self.authorization() {
            Some(authorization) => {
                let url = format!("{}/branches/{}", self.repo_api_url(), encode_segment(git_ref));
                probe(&self.http, &url, Some(&authorization), stage, target).await
            }
            None => {
                let url = format!("{}/tree/{}", self.repo_web_url(), encode_segment(git_ref));
                send_checked(
                    &self.http,
                    Method::HEAD,
                    &url,
                    Some(&GitCredentials::anonymous_header()),
                    stage,
                    target,
                )
                .await
                .map(|_| ())
            }
        }
    }

    async fn root_files(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        let target = self.endpoint.identifier();

        let Some(authorization) = self.authorization() else {
            self.check_repository().await?;
            let mut found = Vec::new();
            for file in manifest_files() {
                if self.file_exists(git_ref, file).await? {
                    found.push(file.to_string());
                }
            }
            debug!(repository = %target, files = ?found, "Probed GitHub repository anonymously");
            return Ok(found);
        };

        let url = format!(
            "{}/contents?ref={}",
            self.repo_api_url(),
            encode_segment(git_ref)
        );
        let entries: Vec<ContentEntry> = get_json(
            &self.http,
            &url,
            Some(&authorization),
            ProbeStage::Listing,
            target,
        )
        .await?;

        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    async fn languages(&self, _git_ref: &str) -> Result<Vec<String>, GitError> {
        let Some(authorization) = self.authorization() else {
            return Ok(Vec::new());
        };

        let url = format!("{}/languages", self.repo_api_url());
        let bytes: BTreeMap<String, f64> = get_json(
            &self.http,
            &url,
            Some(&authorization),
            ProbeStage::Listing,
            self.endpoint.identifier(),
        )
        .await?;

        Ok(sort_languages(bytes))
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod github_tests;
