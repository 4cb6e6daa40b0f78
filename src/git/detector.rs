// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Build environment detection.
//!
//! A repository's build tools are recognised from the manifest files at its
//! root. Languages come from the hosting service (or from a checkout) and are
//! ordered by how much of the repository they make up.

use crate::crd::{BuildEnvStats, DetectedBuildType};
use crate::git::providers::RepositoryService;
use crate::git_errors::GitError;
use tracing::{debug, info};

/// A build tool and the root files that reveal it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildTool {
    pub name: &'static str,
    pub language: &'static str,
    pub files: &'static [&'static str],
}

/// Known build tools, in reporting order.
pub const BUILD_TOOLS: &[BuildTool] = &[
    BuildTool {
        name: "Maven",
        language: "Java",
        files: &["pom.xml"],
    },
    BuildTool {
        name: "Gradle",
        language: "Java",
        files: &["build.gradle", "build.gradle.kts", "gradlew"],
    },
    BuildTool {
        name: "Golang",
        language: "Go",
        files: &["main.go", "go.mod", "Gopkg.toml", "glide.yaml"],
    },
    BuildTool {
        name: "Ruby",
        language: "Ruby",
        files: &["Gemfile", "Rakefile", "config.ru"],
    },
    BuildTool {
        name: "NodeJS",
        language: "JavaScript",
        files: &["package.json"],
    },
    BuildTool {
        name: "Python",
        language: "Python",
        files: &["requirements.txt", "setup.py", "Pipfile", "pyproject.toml"],
    },
    BuildTool {
        name: "PHP",
        language: "PHP",
        files: &["composer.json"],
    },
];

/// Every manifest file name in [`BUILD_TOOLS`].
pub fn manifest_files() -> impl Iterator<Item = &'static str> {
    BUILD_TOOLS.iter().flat_map(|tool| tool.files.iter().copied())
}

/// Match root file names against [`BUILD_TOOLS`].
#[must_use]
pub fn detect_build_tools<S: AsRef<str>>(files: &[S]) -> Vec<DetectedBuildType> {
    BUILD_TOOLS
        .iter()
        .filter_map(|tool| {
            let detected: Vec<String> = tool
                .files
                .iter()
                .filter(|manifest| files.iter().any(|f| f.as_ref() == **manifest))
                .map(|manifest| (*manifest).to_string())
                .collect();

            (!detected.is_empty()).then(|| DetectedBuildType {
                name: tool.name.to_string(),
                language: tool.language.to_string(),
                detected_files: detected,
            })
        })
        .collect()
}

/// Order languages by descending weight, then by name.
#[must_use]
pub fn sort_languages<I>(weights: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut weights: Vec<(String, f64)> = weights.into_iter().collect();
    weights.sort_by(|(a_name, a), (b_name, b)| b.total_cmp(a).then_with(|| a_name.cmp(b_name)));
    weights.into_iter().map(|(name, _)| name).collect()
}

/// Language of a source file extension.
#[must_use]
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    let language = match extension.to_ascii_lowercase().as_str() {
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "scala" => "Scala",
        "groovy" => "Groovy",
        "go" => "Go",
        "rb" => "Ruby",
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "py" => "Python",
        "php" => "PHP",
        "rs" => "Rust",
        "c" | "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" => "C++",
        "cs" => "C#",
        "swift" => "Swift",
        "sh" | "bash" => "Shell",
        "html" | "htm" => "HTML",
        "css" | "scss" => "CSS",
        _ => return None,
    };
    Some(language)
}

/// Detect the build tools and languages of a repository.
///
/// A repository that answers "not found" while listing yields empty
/// statistics instead of an error.
///
/// # Errors
///
/// Returns the listing error for any other failure.
pub async fn detect_build_environments(
    service: &dyn RepositoryService,
    git_ref: &str,
) -> Result<BuildEnvStats, GitError> {
    let files = match service.root_files(git_ref).await {
        Ok(files) => files,
        Err(e) if e.is_repository_not_found() => {
            info!(
                provider = %service.provider(),
                git_ref = %git_ref,
                "Repository not found while listing files, reporting no build environment"
            );
            return Ok(BuildEnvStats::default());
        }
        Err(e) => return Err(e),
    };

    let sorted_languages = match service.languages(git_ref).await {
        Ok(languages) => languages,
        Err(e) if e.is_repository_not_found() => Vec::new(),
        Err(e) => return Err(e),
    };

    let detected_build_types = detect_build_tools(&files);
    debug!(
        provider = %service.provider(),
        files = files.len(),
        build_types = detected_build_types.len(),
        languages = ?sorted_languages,
        "Detected build environment"
    );

    Ok(BuildEnvStats {
        detected_build_types,
        sorted_languages,
    })
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod detector_tests;
