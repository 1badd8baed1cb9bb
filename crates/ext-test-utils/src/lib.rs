//! Shared test utilities for the extension manager workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`catalog`]: the reference module set used across scenario tests
//! - [`hooks`]: [`RecordingHooks`](hooks::RecordingHooks) that log calls and fail on demand
//! - [`validators`]: a stored-content uninstall validator
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace) for on-disk setups

pub mod catalog;
pub mod hooks;
pub mod validators;
pub mod workspace;
