//! The error type of the crate.

use ash::vk;

use crate::instance::CapabilityKind;

/// The broad category a failure falls into. Callers branch on this
/// instead of matching on every [`Error`] variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A buffer sized from a platform-reported count couldn't be
    /// reserved.
    Allocation,
    /// The platform (loader, driver or layer) reported a failure.
    Platform,
    /// The platform reported nothing usable: no capabilities of a kind,
    /// no physical devices or no requested name matched.
    Empty,
    /// The caller passed an argument that can't be used.
    Precondition,
    /// Reading a file from disk failed.
    Io,
}

/// All the errors this crate may return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Vulkan library couldn't be loaded.
    #[error("Couldn't load the Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),
    /// A reservation for `what` failed.
    #[error("Couldn't allocate {what}: {source}")]
    Allocation {
        /// What was being allocated.
        what: &'static str,
        /// The allocator failure.
        #[source]
        source: std::collections::TryReserveError,
    },
    /// A platform call returned a non-success status.
    #[error("{call} failed: {result}")]
    Platform {
        /// The name of the platform call.
        call: &'static str,
        /// The status it returned.
        result: vk::Result,
    },
    /// The platform reported a different number of entries when filling
    /// the buffer than it did when asked for the count.
    #[error("{call} reported {first} entries, then {second}")]
    CountChanged {
        /// The name of the platform call.
        call: &'static str,
        /// The count reported by the counting query.
        first: u32,
        /// The count reported by the filling query.
        second: u32,
    },
    /// The platform had more entries to write than the buffer sized from
    /// its own count could hold.
    #[error("{call} had more than {capacity} entries to write")]
    Incomplete {
        /// The name of the platform call.
        call: &'static str,
        /// The count reported by the counting query, and the size of the
        /// buffer.
        capacity: u32,
    },
    /// The platform reported nothing of `0`.
    #[error("The platform reports no {0}.")]
    Empty(&'static str),
    /// None of the requested names were available.
    #[error("None of the requested {kind}s are available: {requested:?}")]
    NoMatch {
        /// What was requested.
        kind: CapabilityKind,
        /// The names that were requested.
        requested: Vec<String>,
    },
    /// An argument was null-equivalent or empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A name couldn't be turned into a C string.
    #[error("The name {0:?} contains an interior nul byte.")]
    InvalidName(String),
    /// A shader module file couldn't be read.
    #[error("Couldn't read the shader module {path:?}: {source}")]
    Shader {
        /// The path of the file.
        path: std::path::PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::Loading(_)
            | Self::Platform { .. }
            | Self::CountChanged { .. }
            | Self::Incomplete { .. } => ErrorKind::Platform,
            Self::Empty(_) | Self::NoMatch { .. } => ErrorKind::Empty,
            Self::InvalidArgument(_) | Self::InvalidName(_) => ErrorKind::Precondition,
            Self::Shader { .. } => ErrorKind::Io,
        }
    }

    #[cfg_attr(not(feature = "compute"), allow(dead_code))]
    pub(crate) fn platform(call: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Platform { call, result }
    }
}

/// The result type used throughout the crate.
pub type Result<T = (), E = Error> = std::result::Result<T, E>;
