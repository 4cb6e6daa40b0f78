// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credentials used to reach a git repository.
//!
//! Credentials come from a Kubernetes Secret in the namespace of the `GitSource`.
//! The Secret's keys decide which kind of credential is used:
//!
//! | Keys present | Credential |
//! |--------------|------------|
//! | no Secret referenced | anonymous |
//! | `ssh-privatekey` (optional `passphrase`) | SSH key |
//! | `username` + `password` | basic auth |
//! | `password` only | bearer token |
//! | anything else | error |

use crate::constants::{
    ANONYMOUS_USERNAME, SECRET_KEY_PASSPHRASE, SECRET_KEY_PASSWORD, SECRET_KEY_SSH_PRIVATE_KEY,
    SECRET_KEY_USERNAME,
};
use crate::crd::SecretRef;
use crate::git_errors::GitError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::fmt;
use tracing::debug;

/// Authentication material for a repository.
#[derive(Clone, PartialEq, Eq)]
pub enum GitCredentials {
    /// No Secret referenced
    Anonymous,
    /// Username and password
    Basic { username: String, password: String },
    /// Personal access token sent as a bearer token
    Token { token: String },
    /// SSH private key in PEM/OpenSSH format
    SshKey {
        private_key: String,
        passphrase: Option<String>,
    },
}

impl fmt::Debug for GitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Token { .. } => f.debug_struct("Token").field("token", &"<redacted>").finish(),
            Self::SshKey { passphrase, .. } => f
                .debug_struct("SshKey")
                .field("private_key", &"<redacted>")
                .field("has_passphrase", &passphrase.is_some())
                .finish(),
        }
    }
}

impl GitCredentials {
    /// Build credentials from the content of a Secret.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::MissingCredentials`] when the Secret holds none of the
    /// supported key combinations.
    pub fn from_secret(secret: &Secret) -> Result<Self, GitError> {
        let name = secret.metadata.name.clone().unwrap_or_default();

        if let Some(private_key) = secret_value(secret, SECRET_KEY_SSH_PRIVATE_KEY) {
            return Ok(Self::SshKey {
                private_key,
                passphrase: secret_value(secret, SECRET_KEY_PASSPHRASE),
            });
        }

        match (
            secret_value(secret, SECRET_KEY_USERNAME),
            secret_value(secret, SECRET_KEY_PASSWORD),
        ) {
            (Some(username), Some(password)) => Ok(Self::Basic { username, password }),
            (None, Some(token)) => Ok(Self::Token { token }),
            _ => Err(GitError::MissingCredentials { name }),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Short name of the credential kind, safe to log.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Basic { .. } => "basic",
            Self::Token { .. } => "token",
            Self::SshKey { .. } => "ssh-key",
        }
    }

    /// `Authorization` header value for HTTP requests.
    ///
    /// Anonymous and SSH credentials send no header.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Self::Basic { username, password } => Some(basic_header(username, password)),
            Self::Token { token } => Some(format!("Bearer {token}")),
            Self::Anonymous | Self::SshKey { .. } => None,
        }
    }

    /// `Authorization` header identifying an anonymous user (`anonymous:`).
    #[must_use]
    pub fn anonymous_header() -> String {
        basic_header(ANONYMOUS_USERNAME, "")
    }

    /// The secret a password prompt should answer with, if any.
    #[must_use]
    pub fn prompt_secret(&self) -> Option<&str> {
        match self {
            Self::Basic { password, .. } => Some(password),
            Self::Token { token } => Some(token),
            Self::SshKey { passphrase, .. } => passphrase.as_deref(),
            Self::Anonymous => None,
        }
    }
}

fn basic_header(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

/// Read a Secret key from `data`, falling back to `stringData`. Blank values count as absent.
fn secret_value(secret: &Secret, key: &str) -> Option<String> {
    let from_data = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|value| String::from_utf8_lossy(&value.0).into_owned());

    let value = from_data.or_else(|| {
        secret
            .string_data
            .as_ref()
            .and_then(|data| data.get(key))
            .cloned()
    })?;

    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Resolve the credentials referenced by a `GitSource`.
///
/// # Errors
///
/// Returns [`GitError::SecretFetchFailed`] when the Secret cannot be read and
/// [`GitError::MissingCredentials`] when it holds no usable credential.
pub async fn resolve_credentials(
    client: &Client,
    namespace: &str,
    secret_ref: Option<&SecretRef>,
) -> Result<GitCredentials, GitError> {
    let Some(secret_ref) = secret_ref.filter(|r| !r.name.is_empty()) else {
        return Ok(GitCredentials::Anonymous);
    };

    let api: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = api
        .get(&secret_ref.name)
        .await
        .map_err(|e| GitError::SecretFetchFailed {
            name: secret_ref.name.clone(),
            detail: e.to_string(),
        })?;

    let credentials = GitCredentials::from_secret(&secret)?;
    debug!(
        namespace = %namespace,
        secret = %secret_ref.name,
        kind = credentials.kind(),
        "Resolved git credentials"
    );
    Ok(credentials)
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
