//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod ssh;
pub mod template;
pub mod workspace;

pub use config::{PollPolicy, ProviderSettings, RawSettings};
pub use error::{AllocationError, ConfigError, PlatformError, WorkspaceError};
pub use lifecycle::{PlatformStatus, Provisional};
pub use workspace::{ConnectionInfo, PortClaim, PortRange, Workspace};
