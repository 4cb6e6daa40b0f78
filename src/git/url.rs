// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Git repository URL parsing.
//!
//! Accepts the URL forms git itself accepts for remotes:
//!
//! - `https://host[:port]/owner/repo[.git]`
//! - `http://host[:port]/owner/repo[.git]`
//! - `ssh://[user@]host[:port]/owner/repo[.git]`
//! - `git://host[:port]/owner/repo[.git]`
//! - scp-like `[user@]host:owner/repo[.git]`

use crate::git_errors::GitError;
use std::fmt;
use url::Url;

/// Transport used to reach a repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GitScheme {
    Http,
    Https,
    Ssh,
    Git,
}

impl GitScheme {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ssh => "ssh",
            Self::Git => "git",
        }
    }

    /// Returns `true` for transports that go through the `git` binary rather than HTTP.
    #[must_use]
    pub fn uses_git_cli(&self) -> bool {
        matches!(self, Self::Ssh | Self::Git)
    }
}

/// Hosting service behind a repository URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GitProvider {
    GitHub,
    GitLab,
    Bitbucket,
    Generic,
}

impl GitProvider {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Generic => "generic",
        }
    }

    /// Classify a host name.
    #[must_use]
    pub fn from_host(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        match host {
            "github.com" => Self::GitHub,
            "bitbucket.org" => Self::Bitbucket,
            h if h == "gitlab.com" || h.contains("gitlab") => Self::GitLab,
            _ => Self::Generic,
        }
    }
}

impl fmt::Display for GitProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed repository URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitEndpoint {
    /// The URL as written by the user
    pub raw: String,
    pub scheme: GitScheme,
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    /// Repository path without leading slash and `.git` suffix, e.g. `owner/repo`
    pub repository_path: String,
}

impl GitEndpoint {
    /// Parse a repository URL.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::InvalidUrl`] if the URL is empty, uses an unsupported
    /// scheme, has no host or repository path, or has a host or user starting
    /// with `-`.
    pub fn parse(raw: &str) -> Result<Self, GitError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "URL is empty"));
        }

        if trimmed.contains("://") {
            Self::parse_url(trimmed)
        } else {
            Self::parse_scp_like(trimmed)
        }
    }

    fn parse_url(raw: &str) -> Result<Self, GitError> {
        let url = Url::parse(raw).map_err(|e| invalid(raw, &e.to_string()))?;

        let scheme = match url.scheme() {
            "https" => GitScheme::Https,
            "http" => GitScheme::Http,
            "ssh" | "git+ssh" | "ssh+git" => GitScheme::Ssh,
            "git" => GitScheme::Git,
            other => return Err(invalid(raw, &format!("unsupported scheme '{other}'"))),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid(raw, "missing host"))?
            .to_string();

        let user = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        reject_option_like(raw, &host, user.as_deref())?;

        let repository_path = normalize_path(url.path());
        if repository_path.is_empty() {
            return Err(invalid(raw, "missing repository path"));
        }

        Ok(Self {
            raw: raw.to_string(),
            scheme,
            host,
            port: url.port(),
            user,
            repository_path,
        })
    }

    fn parse_scp_like(raw: &str) -> Result<Self, GitError> {
        let (authority, path) = raw
            .split_once(':')
            .ok_or_else(|| invalid(raw, "unsupported URL format"))?;

        if authority.contains('/') || authority.is_empty() {
            return Err(invalid(raw, "unsupported URL format"));
        }

        let (user, host) = match authority.split_once('@') {
            Some((user, host)) => (Some(user.to_string()).filter(|u| !u.is_empty()), host),
            None => (None, authority),
        };
        if host.is_empty() {
            return Err(invalid(raw, "missing host"));
        }
        reject_option_like(raw, host, user.as_deref())?;

        let repository_path = normalize_path(path);
        if repository_path.is_empty() {
            return Err(invalid(raw, "missing repository path"));
        }

        Ok(Self {
            raw: raw.to_string(),
            scheme: GitScheme::Ssh,
            host: host.to_string(),
            port: None,
            user,
            repository_path,
        })
    }

    #[must_use]
    pub fn provider(&self) -> GitProvider {
        GitProvider::from_host(&self.host)
    }

    /// Repository identifier used by hosting APIs (`owner/repo`).
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.repository_path
    }

    /// Returns `true` if the repository is reached through SSH or the git protocol.
    #[must_use]
    pub fn uses_git_cli(&self) -> bool {
        self.scheme.uses_git_cli()
    }

    /// `scheme://host[:port]` for HTTP(S) endpoints.
    #[must_use]
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{port}", self.scheme.as_str(), self.host),
            None => format!("{}://{}", self.scheme.as_str(), self.host),
        }
    }

    /// Smart-HTTP ref advertisement URL, rooted at `base` (defaults to [`Self::base_url`]).
    #[must_use]
    pub fn info_refs_url(&self, base: Option<&str>) -> String {
        let base = base.map_or_else(|| self.base_url(), |b| b.trim_end_matches('/').to_string());
        format!(
            "{base}/{}.git/info/refs?service={}",
            self.repository_path,
            crate::constants::GIT_UPLOAD_PACK_SERVICE
        )
    }
}

impl fmt::Display for GitEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    path.trim_end_matches('/').to_string()
}

fn invalid(url: &str, reason: &str) -> GitError {
    GitError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Hosts and users starting with `-` would be read as options by `git`.
fn reject_option_like(raw: &str, host: &str, user: Option<&str>) -> Result<(), GitError> {
    if host.starts_with('-') {
        return Err(invalid(raw, "host must not start with '-'"));
    }
    if user.is_some_and(|u| u.starts_with('-')) {
        return Err(invalid(raw, "user must not start with '-'"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "url_tests.rs"]
mod url_tests;
