// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition types and reasons for devconsole resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition
//! has a particular status. Only `EnvDeployment` reports conditions; the git
//! resources use the dedicated `Connection` status instead.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   observedGeneration: 3
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: EnvironmentNotFound
//!       message: "Environment stage not found in namespace myproject"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Encompassing condition for the overall state of a resource.
pub const CONDITION_TYPE_READY: &str = "Ready";

// ============================================================================
// Condition Status Values
// ============================================================================

pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// EnvDeployment Reasons
// ============================================================================

/// Both the `Environment` and the workload were found.
pub const REASON_RESOLVED: &str = "Resolved";

/// `environmentRef` points to an `Environment` that does not exist.
pub const REASON_ENVIRONMENT_NOT_FOUND: &str = "EnvironmentNotFound";

/// `deploymentRef` points to a `Deployment` or `DeploymentConfig` that does not exist.
pub const REASON_DEPLOYMENT_NOT_FOUND: &str = "DeploymentNotFound";

/// A reference names a kind the operator cannot resolve.
///
/// `environmentRef` must name an `Environment`; `deploymentRef` must name a
/// `Deployment` or a `DeploymentConfig`.
pub const REASON_UNSUPPORTED_KIND: &str = "UnsupportedKind";

/// Returns `true` if the reason describes a healthy resource.
#[must_use]
pub fn is_ready_reason(reason: &str) -> bool {
    reason == REASON_RESOLVED
}

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;
