//! Unit tests for the dokpod CLI
//!
//! Service-level tests through the public library API with in-memory
//! doubles for every port. No network, no processes.

mod helpers;
mod lifecycle_actions;
mod status_resolution;
