// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Git smart-HTTP backend.
//!
//! A single `GET <repo>.git/info/refs?service=git-upload-pack` answers all three
//! connection questions: the status tells whether the credentials and the
//! repository are fine, and the ref advertisement tells whether the branch
//! exists. The advertisement is fetched once per service instance.
//!
//! Content listing is not part of the protocol, so it is delegated to a
//! shallow clone through [`GitCliService`].

use super::cli::GitCliService;
use super::{send_checked, RepositoryService};
use crate::git::credentials::GitCredentials;
use crate::git::pktline::{has_ref, parse_ref_advertisement, AdvertisedRef};
use crate::git::url::{GitEndpoint, GitProvider};
use crate::git::ProxySettings;
use crate::git_errors::GitError;
use crate::http_errors::ProbeStage;
use reqwest::{Client as HttpClient, Method};
use tokio::sync::OnceCell;
use tracing::debug;

pub struct SmartHttpService {
    http: HttpClient,
    info_refs_url: String,
    endpoint: GitEndpoint,
    credentials: GitCredentials,
    advertisement: OnceCell<Result<Vec<AdvertisedRef>, GitError>>,
    cli: GitCliService,
}

impl SmartHttpService {
    /// `base` overrides the scheme and host the repository path is appended to.
    #[must_use]
    pub fn new(
        http: HttpClient,
        endpoint: GitEndpoint,
        credentials: GitCredentials,
        proxy: ProxySettings,
        base: Option<&str>,
    ) -> Self {
        Self {
            http,
            info_refs_url: endpoint.info_refs_url(base),
            cli: GitCliService::new(endpoint.clone(), credentials.clone(), proxy),
            endpoint,
            credentials,
            advertisement: OnceCell::new(),
        }
    }

    async fn advertised_refs(&self) -> Result<&[AdvertisedRef], GitError> {
        self.advertisement
            .get_or_init(|| self.fetch_advertisement())
            .await
            .as_ref()
            .map(Vec::as_slice)
            .map_err(|e| e.clone())
    }

    async fn fetch_advertisement(&self) -> Result<Vec<AdvertisedRef>, GitError> {
        let target = self.endpoint.raw.as_str();
        let response = send_checked(
            &self.http,
            Method::GET,
            &self.info_refs_url,
            self.credentials.authorization_header().as_deref(),
            ProbeStage::Repository,
            target,
        )
        .await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| GitError::RepositoryNotReachable {
                repository: target.to_string(),
                status: None,
                detail: format!("failed to read ref advertisement: {e}"),
            })?;

        let refs =
            parse_ref_advertisement(&body).map_err(|e| GitError::RepositoryNotReachable {
                repository: target.to_string(),
                status: None,
                detail: format!("not a git smart-HTTP endpoint: {e}"),
            })?;

        debug!(
            repository = %self.endpoint,
            refs = refs.len(),
            "Fetched smart-HTTP ref advertisement"
        );
        Ok(refs)
    }
}

#[async_trait::async_trait]
impl RepositoryService for SmartHttpService {
    fn provider(&self) -> GitProvider {
        self.endpoint.provider()
    }

    async fn check_credentials(&self) -> Result<(), GitError> {
        self.advertised_refs().await.map(|_| ())
    }

    async fn check_repository(&self) -> Result<(), GitError> {
        self.advertised_refs().await.map(|_| ())
    }

    async fn check_branch(&self, git_ref: &str) -> Result<(), GitError> {
        if has_ref(self.advertised_refs().await?, git_ref) {
            Ok(())
        } else {
            Err(GitError::BranchNotFound {
                repository: self.endpoint.raw.clone(),
                branch: git_ref.to_string(),
            })
        }
    }

    async fn root_files(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        self.cli.root_files(git_ref).await
    }

    async fn languages(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        self.cli.languages(git_ref).await
    }
}

#[cfg(test)]
#[path = "smart_http_tests.rs"]
mod smart_http_tests;
