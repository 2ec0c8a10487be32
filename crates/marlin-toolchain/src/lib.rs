//! Host toolchain resolution for the marlin build driver.
//!
//! Resolves the default native C compiler for the host environment into an
//! immutable [`Toolchain`] descriptor: the compiler invocation string, a
//! coarse classification (MSVC-like vs generic), the host platform family,
//! and baseline compile flags. The descriptor is computed once at pipeline
//! start and passed to every stage as an argument.

pub mod descriptor;
pub mod error;

pub use descriptor::{CompilerKind, HostPlatform, Toolchain};
pub use error::{Result, ToolchainError};
