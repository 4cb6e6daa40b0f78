// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Backend driving the `git` binary.
//!
//! Used for SSH and `git://` remotes, and for listing content of HTTP remotes
//! that have no hosting API. Connection checks run `git ls-remote`; content
//! listing runs a shallow single-branch clone into a temporary directory.
//!
//! Credentials never appear on the command line:
//! - SSH keys are written to a `0600` file referenced from `GIT_SSH_COMMAND`
//! - passwords and passphrases are answered by an askpass helper reading an
//!   environment variable
//! - HTTP authorization headers are passed through `GIT_CONFIG_*` variables

use super::RepositoryService;
use crate::constants::{GIT_ASKPASS_SECRET_ENV, GIT_COMMAND_TIMEOUT_SECS};
use crate::git::credentials::GitCredentials;
use crate::git::detector::{language_for_extension, sort_languages};
use crate::git::pktline::{has_ref, parse_ls_remote, AdvertisedRef};
use crate::git::url::{GitEndpoint, GitProvider};
use crate::git::ProxySettings;
use crate::git_errors::GitError;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

const SSH_BASE_COMMAND: &str = "ssh -o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null";

/// Content of a shallow checkout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckoutSummary {
    pub files: Vec<String>,
    /// Bytes of source per language
    pub language_bytes: BTreeMap<String, f64>,
}

/// Environment for one `git` invocation. Keeps the key and askpass files alive.
pub struct GitEnvironment {
    _dir: TempDir,
    pub vars: Vec<(String, String)>,
}

pub struct GitCliService {
    endpoint: GitEndpoint,
    credentials: GitCredentials,
    proxy: ProxySettings,
    timeout: Duration,
    remote_refs: OnceCell<Result<Vec<AdvertisedRef>, GitError>>,
    checkout: Mutex<Option<(String, CheckoutSummary)>>,
}

impl GitCliService {
    #[must_use]
    pub fn new(endpoint: GitEndpoint, credentials: GitCredentials, proxy: ProxySettings) -> Self {
        Self {
            endpoint,
            credentials,
            proxy,
            timeout: Duration::from_secs(GIT_COMMAND_TIMEOUT_SECS),
            remote_refs: OnceCell::new(),
            checkout: Mutex::new(None),
        }
    }

    async fn remote_refs(&self) -> Result<&[AdvertisedRef], GitError> {
        self.remote_refs
            .get_or_init(|| self.ls_remote())
            .await
            .as_ref()
            .map(Vec::as_slice)
            .map_err(|e| e.clone())
    }

    async fn ls_remote(&self) -> Result<Vec<AdvertisedRef>, GitError> {
        let env = prepare_environment(&self.endpoint, &self.credentials, &self.proxy).await?;
        let mut command = Command::new("git");
        command.args(ls_remote_args(&self.endpoint));

        let stdout = self.run(command, &env, None).await?;
        let refs = parse_ls_remote(&stdout);
        debug!(
            repository = %self.endpoint,
            refs = refs.len(),
            "Listed remote refs"
        );
        Ok(refs)
    }

    async fn checkout(&self, git_ref: &str) -> Result<CheckoutSummary, GitError> {
        let mut cached = self.checkout.lock().await;
        if let Some((cached_ref, summary)) = cached.as_ref() {
            if cached_ref == git_ref {
                return Ok(summary.clone());
            }
        }

        let env = prepare_environment(&self.endpoint, &self.credentials, &self.proxy).await?;
        let workdir = TempDir::new().map_err(|e| self.internal(&e))?;
        let clone_path = workdir.path().join("checkout");

        let mut command = Command::new("git");
        command.args(clone_args(&self.endpoint, git_ref, &clone_path));
        self.run(command, &env, Some(git_ref)).await?;

        let summary = tokio::task::spawn_blocking(move || summarize_checkout(&clone_path))
            .await
            .map_err(|e| self.internal(&e))?
            .map_err(|e| self.internal(&e))?;

        debug!(
            repository = %self.endpoint,
            git_ref = %git_ref,
            files = summary.files.len(),
            "Summarized shallow checkout"
        );
        *cached = Some((git_ref.to_string(), summary.clone()));
        Ok(summary)
    }

    async fn run(
        &self,
        mut command: Command,
        env: &GitEnvironment,
        git_ref: Option<&str>,
    ) -> Result<String, GitError> {
        command.envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command.kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| GitError::RepositoryNotReachable {
                repository: self.endpoint.raw.clone(),
                status: None,
                detail: format!("git timed out after {}s", self.timeout.as_secs()),
            })?
            .map_err(|e| self.internal(&e))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            repository = %self.endpoint,
            status = %output.status,
            "git command failed: {}",
            stderr.trim()
        );
        Err(classify_git_failure(&self.endpoint.raw, git_ref, &stderr))
    }

    fn internal(&self, error: &dyn std::fmt::Display) -> GitError {
        GitError::Internal {
            repository: self.endpoint.raw.clone(),
            detail: error.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RepositoryService for GitCliService {
    fn provider(&self) -> GitProvider {
        self.endpoint.provider()
    }

    async fn check_credentials(&self) -> Result<(), GitError> {
        self.remote_refs().await.map(|_| ())
    }

    async fn check_repository(&self) -> Result<(), GitError> {
        self.remote_refs().await.map(|_| ())
    }

    async fn check_branch(&self, git_ref: &str) -> Result<(), GitError> {
        if has_ref(self.remote_refs().await?, git_ref) {
            Ok(())
        } else {
            Err(GitError::BranchNotFound {
                repository: self.endpoint.raw.clone(),
                branch: git_ref.to_string(),
            })
        }
    }

    async fn root_files(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        Ok(self.checkout(git_ref).await?.files)
    }

    async fn languages(&self, git_ref: &str) -> Result<Vec<String>, GitError> {
        Ok(sort_languages(self.checkout(git_ref).await?.language_bytes))
    }
}

/// Build the environment `git` runs with for these credentials.
///
/// # Errors
///
/// Returns [`GitError::Internal`] if the temporary key or askpass files cannot be written.
pub async fn prepare_environment(
    endpoint: &GitEndpoint,
    credentials: &GitCredentials,
    proxy: &ProxySettings,
) -> Result<GitEnvironment, GitError> {
    let internal = |e: std::io::Error| GitError::Internal {
        repository: endpoint.raw.clone(),
        detail: format!("failed to prepare git credentials: {e}"),
    };

    let dir = TempDir::new().map_err(internal)?;
    let mut vars = vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())];
    vars.extend(
        proxy
            .env_vars()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v)),
    );

    if endpoint.uses_git_cli() {
        let mut ssh_command = SSH_BASE_COMMAND.to_string();
        match credentials {
            GitCredentials::SshKey { private_key, .. } => {
                let key_path =
                    write_private_file(dir.path(), "id_key", &normalize_key(private_key), 0o600)
                        .await
                        .map_err(internal)?;
                ssh_command.push_str(&format!(" -i {} -o IdentitiesOnly=yes", key_path.display()));
            }
            GitCredentials::Basic { username, .. } => {
                ssh_command.push_str(" -o PreferredAuthentications=password,keyboard-interactive");
                if endpoint.user.is_none() {
                    ssh_command.push_str(&format!(" -l {username}"));
                }
            }
            GitCredentials::Token { .. } => {
                ssh_command.push_str(" -o PreferredAuthentications=password,keyboard-interactive");
            }
            GitCredentials::Anonymous => ssh_command.push_str(" -o BatchMode=yes"),
        }
        vars.push(("GIT_SSH_COMMAND".to_string(), ssh_command));
    } else if let Some(authorization) = credentials.authorization_header() {
        vars.push(("GIT_CONFIG_COUNT".to_string(), "1".to_string()));
        vars.push(("GIT_CONFIG_KEY_0".to_string(), "http.extraHeader".to_string()));
        vars.push((
            "GIT_CONFIG_VALUE_0".to_string(),
            format!("Authorization: {authorization}"),
        ));
    }

    if let Some(secret) = credentials.prompt_secret() {
        let script = format!("#!/bin/sh\nprintf '%s\\n' \"${GIT_ASKPASS_SECRET_ENV}\"\n");
        let askpass = write_private_file(dir.path(), "askpass.sh", &script, 0o700)
            .await
            .map_err(internal)?;
        let askpass = askpass.display().to_string();
        vars.push(("GIT_ASKPASS".to_string(), askpass.clone()));
        vars.push(("SSH_ASKPASS".to_string(), askpass));
        vars.push(("SSH_ASKPASS_REQUIRE".to_string(), "force".to_string()));
        vars.push((GIT_ASKPASS_SECRET_ENV.to_string(), secret.to_string()));
    }

    Ok(GitEnvironment { _dir: dir, vars })
}

async fn write_private_file(
    dir: &Path,
    name: &str,
    content: &str,
    mode: u32,
) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    tokio::fs::write(&path, content).await?;
    let mut perms = tokio::fs::metadata(&path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(&path, perms).await?;
    Ok(path)
}

/// OpenSSH rejects keys without a trailing newline.
fn normalize_key(key: &str) -> String {
    let mut key = key.trim().replace("\r\n", "\n");
    key.push('\n');
    key
}

/// Map `git` stderr output to a git error.
#[must_use]
pub fn classify_git_failure(repository: &str, git_ref: Option<&str>, stderr: &str) -> GitError {
    let lower = stderr.to_ascii_lowercase();
    let detail = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("git command failed")
        .trim()
        .to_string();

    if let Some(branch) = git_ref {
        if (lower.contains("remote branch") && lower.contains("not found"))
            || lower.contains("couldn't find remote ref")
        {
            return GitError::BranchNotFound {
                repository: repository.to_string(),
                branch: branch.to_string(),
            };
        }
    }

    if lower.contains("permission denied")
        || lower.contains("authentication failed")
        || lower.contains("could not read username")
        || lower.contains("could not read password")
        || lower.contains("invalid username or password")
    {
        return GitError::BadCredentials {
            endpoint: repository.to_string(),
            detail,
        };
    }

    let not_found = lower.contains("repository not found")
        || lower.contains("does not appear to be a git repository")
        || lower.contains("not found");

    GitError::RepositoryNotReachable {
        repository: repository.to_string(),
        status: not_found.then_some(404),
        detail,
    }
}

/// List root entries and measure source bytes per language in a checkout.
fn summarize_checkout(root: &Path) -> std::io::Result<CheckoutSummary> {
    let mut summary = CheckoutSummary::default();

    for entry in std::fs::read_dir(root)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name != ".git" {
            summary.files.push(name);
        }
    }
    summary.files.sort();

    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if entry.file_name() != ".git" {
                    pending.push(entry.path());
                }
            } else if file_type.is_file() {
                let path = entry.path();
                let language = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(language_for_extension);
                if let Some(language) = language {
                    #[allow(clippy::cast_precision_loss)]
                    let size = entry.metadata()?.len() as f64;
                    *summary
                        .language_bytes
                        .entry(language.to_string())
                        .or_insert(0.0) += size;
                }
            }
        }
    }

    Ok(summary)
}

/// `git ls-remote` arguments. The repository follows `--` so it is never read as an option.
fn ls_remote_args(endpoint: &GitEndpoint) -> Vec<OsString> {
    ["ls-remote", "--heads", "--tags", "--", endpoint.raw.as_str()]
        .into_iter()
        .map(OsString::from)
        .collect()
}

/// Shallow single-branch `git clone` arguments.
fn clone_args(endpoint: &GitEndpoint, git_ref: &str, destination: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "clone",
        "--depth",
        "1",
        "--single-branch",
        "--no-tags",
        "--branch",
        git_ref,
        "--",
        endpoint.raw.as_str(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(destination.as_os_str().to_owned());
    args
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
