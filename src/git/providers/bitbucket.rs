// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bitbucket Cloud backend (REST API 2.0).

use super::{encode_segment, get_json, probe, RepositoryService};
use crate::constants::{GIT_API_MAX_PAGES, GIT_API_PAGE_SIZE};
use crate::git::credentials::GitCredentials;
use crate::git::url::{GitEndpoint, GitProvider};
use crate::git::HostingEndpoints;
use crate::git_errors::GitError;
use crate::http_errors::ProbeStage;
use reqwest::Client as HttpClient;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SourcePage {
    #[serde(default)]
    values: Vec<SourceEntry>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(default)]
    language: String,
}

pub struct BitbucketService {
    http: HttpClient,
    api_url: String,
    endpoint: GitEndpoint,
    credentials: GitCredentials,
}

impl BitbucketService {
    #[must_use]
    pub fn new(
        http: HttpClient,
        endpoints: &HostingEndpoints,
        endpoint: GitEndpoint,
        credentials: GitCredentials,
    ) -> Self {
        Self {
            http,
            api_url: endpoints.bitbucket_api_url.trim_end_matches('/').to_string(),
            endpoint,
            credentials,
        }
    }

    fn repository_url(&self) -> String {
        format!("{}/repositories/{}", self.api_url, self.endpoint.identifier())
    }
}

#[async_trait::async_trait]
impl RepositoryService for BitbucketService {
    fn provider(&self) -> GitProvider {
        GitProvider::Bitbucket
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
            &self.repository_url(),
            self.credentials.authorization_header().as_deref(),
            ProbeStage::Repository,
            self.endpoint.identifier(),
        )
        .await
    }

    async fn check_branch(&self, git_ref: &str) -> Result<(), GitError> {
        let url = format!(
            "{}/refs/branches/{}",
            self.repository_url(),
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

    /// Follows `next` links for at most [`GIT_API_MAX_PAGES`] pages.
    async fn root_files(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        let authorization = self.credentials.authorization_header();
        let mut files = Vec::new();
        let mut url = format!(
            "{}/src/{}/?pagelen={GIT_API_PAGE_SIZE}",
            self.repository_url(),
            encode_segment(git_ref)
        );

        for _ in 0..GIT_API_MAX_PAGES {
            let page: SourcePage = get_json(
                &self.http,
                &url,
                authorization.as_deref(),
                ProbeStage::Listing,
                self.endpoint.identifier(),
            )
            .await?;

            files.extend(
                page.values
                    .into_iter()
                    .filter_map(|entry| entry.path.rsplit('/').next().map(str::to_string))
                    .filter(|name| !name.is_empty()),
            );

            match page.next {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }

        Ok(files)
    }

    /// Bitbucket reports a single language per repository.
    async fn languages(&self, _git_ref: &str) -> Result<Vec<String>, GitError> {
        let repository: Repository = get_json(
            &self.http,
            &self.repository_url(),
            self.credentials.authorization_header().as_deref(),
            ProbeStage::Listing,
            self.endpoint.identifier(),
        )
        .await?;

        Ok(Some(repository.language)
            .filter(|l| !l.is_empty())
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
#[path = "bitbucket_tests.rs"]
mod bitbucket_tests;
