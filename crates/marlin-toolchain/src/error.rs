//! Error types for toolchain resolution.

/// Errors that can occur while resolving the host toolchain.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// No candidate compiler could be spawned on this host.
    #[error("no usable C compiler found (searched: {})", searched.join(", "))]
    NoUsableCompiler {
        /// The candidate executables that were probed, in order.
        searched: Vec<String>,
    },
}

/// Result type for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;
