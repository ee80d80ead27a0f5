//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the Dokploy HTTP client,
//! network probes, process execution, key and settings files, and logging.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod assets;
pub mod command_runner;
pub mod config;
pub mod dokploy;
pub mod keys;
pub mod logging;
pub mod prober;
pub mod sleeper;
