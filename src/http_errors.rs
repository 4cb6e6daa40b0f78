// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP status mapping for git hosting probes.
//!
//! Provider REST APIs and git smart-HTTP endpoints answer every probe with an
//! HTTP status. This module turns those statuses into [`GitError`]s so that all
//! providers classify failures the same way.
//!
//! # Usage
//!
//! ```rust
//! use devconsole_operator::crd::ConnectionFailureReason;
//! use devconsole_operator::http_errors::{map_http_status_to_error, ProbeStage};
//!
//! let error = map_http_status_to_error(401, ProbeStage::Credentials, "https://api.github.com/user")
//!     .expect("401 is an error");
//! assert_eq!(error.reason(), ConnectionFailureReason::BadCredentials);
//!
//! assert!(map_http_status_to_error(200, ProbeStage::Repository, "owner/repo").is_none());
//! ```

use crate::git_errors::GitError;

/// The step of a connection check a response belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeStage<'a> {
    /// Checking that the host accepts the credentials (`/user` style endpoints)
    Credentials,
    /// Checking that the repository exists
    Repository,
    /// Checking that the branch or tag exists
    Branch {
        /// Requested ref, reported in [`GitError::BranchNotFound`]
        branch: &'a str,
    },
    /// Listing repository content
    Listing,
}

/// Map an HTTP status code to a git error.
///
/// # Arguments
///
/// * `status_code` - HTTP status code of the response
/// * `stage` - The probe the response answers
/// * `target` - Repository identifier or URL used in the error message
///
/// # Returns
///
/// `None` for 2xx responses, otherwise the matching [`GitError`].
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Stage | Error |
/// |-----------|-------|-------|
/// | 2xx | any | none |
/// | 401 | any | `BadCredentials` |
/// | 403 | any | `BadCredentials` |
/// | 404 | branch | `BranchNotFound` |
/// | 404 | other | `RepositoryNotReachable` (status 404) |
/// | Other | any | `RepositoryNotReachable` |
#[must_use]
pub fn map_http_status_to_error(
    status_code: u16,
    stage: ProbeStage<'_>,
    target: &str,
) -> Option<GitError> {
    match status_code {
        200..=299 => None,
        401 => Some(GitError::BadCredentials {
            endpoint: target.to_string(),
            detail: "authentication required (401)".into(),
        }),
        403 => Some(GitError::BadCredentials {
            endpoint: target.to_string(),
            detail: "access forbidden (403)".into(),
        }),
        404 => Some(match stage {
            ProbeStage::Branch { branch } => GitError::BranchNotFound {
                repository: target.to_string(),
                branch: branch.to_string(),
            },
            _ => GitError::RepositoryNotReachable {
                repository: target.to_string(),
                status: Some(404),
                detail: "not found (404)".into(),
            },
        }),
        _ => Some(GitError::RepositoryNotReachable {
            repository: target.to_string(),
            status: Some(status_code),
            detail: format!("unexpected HTTP status ({status_code})"),
        }),
    }
}

/// Map a transport error (DNS, TCP, TLS, timeout) to a git error.
///
/// Use this when no HTTP status was received at all.
#[must_use]
pub fn map_connection_error(target: &str, error: &reqwest::Error) -> GitError {
    let detail = if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };

    GitError::RepositoryNotReachable {
        repository: target.to_string(),
        status: None,
        detail,
    }
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
