// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Git validation and analysis error types.
//!
//! This module provides the error type returned by every git probe:
//! - URL parsing failures
//! - Credential resolution from Kubernetes secrets
//! - Provider API and smart-HTTP responses
//! - `git` subprocess failures for SSH sources
//!
//! Each error maps to a [`ConnectionFailureReason`] so it can be surfaced on
//! `GitSource` status without failing the reconcile.

use crate::crd::ConnectionFailureReason;
use thiserror::Error;

/// Message used when a referenced secret cannot be read.
pub const SECRET_FETCH_FAILED_MESSAGE: &str = "failed to fetch the secret object";

/// Message used when a secret holds none of the recognized credential keys.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "the provided secret does not contain any of the required parameters: [username,password,ssh-privatekey] or they are empty";

/// Errors that can occur while validating or analyzing a git repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GitError {
    /// The repository URL could not be parsed
    #[error("invalid git URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as written in the `GitSource`
        url: String,
        /// Why parsing failed
        reason: String,
    },

    /// The referenced secret could not be read from the API server
    #[error("failed to fetch the secret object")]
    SecretFetchFailed {
        /// Name of the secret
        name: String,
        /// Underlying API error
        detail: String,
    },

    /// The secret exists but carries no usable credential
    #[error("the provided secret does not contain any of the required parameters: [username,password,ssh-privatekey] or they are empty")]
    MissingCredentials {
        /// Name of the secret
        name: String,
    },

    /// The host rejected the credentials (HTTP 401/403 or SSH authentication failure)
    #[error("authentication to {endpoint} failed: {detail}")]
    BadCredentials {
        /// Host or URL that rejected the credentials
        endpoint: String,
        /// Response status or git output
        detail: String,
    },

    /// The repository does not exist, is not visible, or the host cannot be reached
    #[error("repository {repository} is not reachable: {detail}")]
    RepositoryNotReachable {
        /// Repository URL or identifier
        repository: String,
        /// HTTP status, when the host answered
        status: Option<u16>,
        /// Response status, transport error or git output
        detail: String,
    },

    /// The repository exists but the requested branch or tag does not
    #[error("branch '{branch}' not found in repository {repository}")]
    BranchNotFound {
        /// Repository URL or identifier
        repository: String,
        /// Requested ref
        branch: String,
    },

    /// The operator could not run the check (process spawn, temp files, decoding)
    #[error("internal failure while checking {repository}: {detail}")]
    Internal {
        /// Repository URL or identifier
        repository: String,
        /// What went wrong
        detail: String,
    },
}

impl GitError {
    /// Map the error to the reason surfaced on `GitSource` status.
    #[must_use]
    pub fn reason(&self) -> ConnectionFailureReason {
        match self {
            Self::InvalidUrl { .. } | Self::RepositoryNotReachable { .. } => {
                ConnectionFailureReason::RepoNotReachable
            }
            Self::BadCredentials { .. } | Self::MissingCredentials { .. } => {
                ConnectionFailureReason::BadCredentials
            }
            Self::BranchNotFound { .. } => ConnectionFailureReason::BranchNotFound,
            Self::SecretFetchFailed { .. } | Self::Internal { .. } => {
                ConnectionFailureReason::ConnectionInternalFailure
            }
        }
    }

    /// Returns `true` if the host answered that the repository does not exist.
    #[must_use]
    pub fn is_repository_not_found(&self) -> bool {
        matches!(
            self,
            Self::RepositoryNotReachable {
                status: Some(404),
                ..
            }
        )
    }

    /// Short label for metrics.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::SecretFetchFailed { .. } => "secret_fetch_failed",
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::BadCredentials { .. } => "bad_credentials",
            Self::RepositoryNotReachable { .. } => "repo_not_reachable",
            Self::BranchNotFound { .. } => "branch_not_found",
            Self::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
#[path = "git_errors_tests.rs"]
mod git_errors_tests;
