// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for the devconsole resources.
//!
//! Each reconciler is driven by a `kube::runtime::Controller` in `main.rs`.
//! Reconcilers re-read their resource, create whatever generated objects are
//! missing and report the outcome on the status subresource.
//!
//! # Reconciliation Architecture
//!
//! 1. **Fetch** - Re-read the resource; a deleted resource is a no-op
//! 2. **Create** - Get-or-create the generated objects; existing ones are kept
//! 3. **Status** - Patch status only when it changed
//!
//! # Available Reconcilers
//!
//! ## Git
//!
//! - [`reconcile_gitsource`] - Validates repository access once per `GitSource`
//! - [`reconcile_gitsourceanalysis`] - Detects the build environment of a `GitSource`
//!
//! ## Applications
//!
//! - [`reconcile_component`] - Builds and deploys a `GitSource` with S2I
//! - [`reconcile_envdeployment`] - Binds a workload to an `Environment`
//!
//! ## Console
//!
//! - [`reconcile_devopsconsole`] - Runs the app-service `Deployment`
//! - [`reconcile_installer`] - Installs and exposes the app-service
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use devconsole_operator::context::Context;
//! use devconsole_operator::crd::Component;
//! use devconsole_operator::reconcilers::reconcile_component;
//!
//! async fn reconcile(ctx: &Context, component: Component) -> anyhow::Result<()> {
//!     reconcile_component(ctx, component).await
//! }
//! ```

pub mod component;
pub mod devopsconsole;
pub mod envdeployment;
pub mod gitsource;
pub mod gitsourceanalysis;
pub mod installer;
pub mod resources;
pub mod status;

#[cfg(test)]
pub(crate) mod api_mock;
#[cfg(test)]
mod status_tests;

pub use component::reconcile_component;
pub use devopsconsole::reconcile_devopsconsole;
pub use envdeployment::reconcile_envdeployment;
pub use gitsource::reconcile_gitsource;
pub use gitsourceanalysis::reconcile_gitsourceanalysis;
pub use installer::reconcile_installer;
