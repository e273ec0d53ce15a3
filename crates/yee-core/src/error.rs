//! Error types for configuration, communication, backends and the solver.
//!
//! Every fallible operation in the workspace returns one of these. None of
//! them is recoverable mid-update: a caller that cannot propagate an error
//! escalates it with [`OrAbort`](crate::fatal::OrAbort).

use std::panic::Location;

use crate::id::{Rank, Side, AXES};

// ── ConfigError ────────────────────────────────────────────────────

/// Invalid or inconsistent configuration detected before any update runs.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A required parameter is absent.
    #[error("missing required parameter `{name}`")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },
    /// A parameter is present but has the wrong type or an out-of-range value.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Two individually valid options cannot be used together.
    #[error("`{first}` cannot be combined with `{second}`: {reason}")]
    UnsupportedCombination {
        /// First conflicting option.
        first: String,
        /// Second conflicting option.
        second: String,
        /// Why they conflict.
        reason: String,
    },
    /// A grid geometry violates its structural invariants.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// What is wrong with it.
        reason: String,
    },
    /// The global grid cannot be split across the requested rank grid.
    #[error("invalid decomposition: {reason}")]
    InvalidDecomposition {
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidParameter`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// ── TopologyError ──────────────────────────────────────────────────

/// Failure of the inter-subdomain communication layer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// A received payload does not have the locally expected length.
    #[error(
        "rank {rank}: packet from rank {from} ({axis}/{side}) has {actual} words, expected {expected}"
    )]
    PacketSizeMismatch {
        /// Receiving rank.
        rank: Rank,
        /// Sending rank.
        from: Rank,
        /// Exchange axis.
        axis: usize,
        /// Face of the receiver the packet arrived on.
        side: Side,
        /// Expected payload length.
        expected: usize,
        /// Actual payload length.
        actual: usize,
    },
    /// A message arrived out of protocol order.
    #[error("rank {rank}: expected `{expected}` from rank {from}, got `{actual}`")]
    TagMismatch {
        /// Receiving rank.
        rank: Rank,
        /// Sending rank.
        from: Rank,
        /// Expected message tag.
        expected: String,
        /// Received message tag.
        actual: String,
    },
    /// The neighbour relation of a rank set is not symmetric.
    #[error("rank {rank} lists {neighbor} as its {side} neighbour on axis {axis}, but not vice versa")]
    InconsistentNeighbors {
        /// Rank whose neighbour entry is unmatched.
        rank: Rank,
        /// The neighbour it names.
        neighbor: Rank,
        /// Axis of the entry.
        axis: usize,
        /// Side of the entry.
        side: Side,
    },
    /// A field handed to an exchange is not shaped like the subdomain.
    #[error("rank {rank}: field extent {field:?} does not match the subdomain extent {subdomain:?}")]
    ExtentMismatch {
        /// Local rank.
        rank: Rank,
        /// Array extent of the field, guards included.
        field: [u32; AXES],
        /// Array extent of the communicator's subdomain.
        subdomain: [u32; AXES],
    },
    /// The peer's end of the channel has been dropped.
    #[error("rank {rank}: peer rank {peer} disconnected")]
    Disconnected {
        /// Local rank.
        rank: Rank,
        /// Peer rank.
        peer: Rank,
    },
    /// A receive did not complete within the transport's timeout.
    #[error("rank {rank}: timed out after {millis} ms waiting for rank {peer}")]
    Timeout {
        /// Local rank.
        rank: Rank,
        /// Peer rank.
        peer: Rank,
        /// Timeout in milliseconds.
        millis: u64,
    },
    /// A rank thread panicked.
    #[error("rank {rank} panicked: {message}")]
    RankPanicked {
        /// The rank whose thread panicked.
        rank: Rank,
        /// Panic payload, when it was a string.
        message: String,
    },
    /// A rank thread could not be started.
    #[error("failed to spawn thread for rank {rank}: {reason}")]
    ThreadSpawnFailed {
        /// Rank whose thread failed to start.
        rank: Rank,
        /// OS error text.
        reason: String,
    },
    /// The execution backend failed while preparing a transfer.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// ── BackendError ───────────────────────────────────────────────────

/// What an execution backend failed to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// A worker pool could not be constructed.
    ThreadPool(String),
    /// A buffer of the requested extent cannot be allocated.
    AllocationFailed {
        /// Number of elements requested.
        elements: usize,
    },
}

/// Failure of an execution backend, tagged with the source location of the
/// call that triggered it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("backend error at {}:{}: {}", .location.file(), .location.line(), .kind)]
pub struct BackendError {
    /// What failed.
    pub kind: BackendErrorKind,
    /// Where the failing call was made.
    pub location: &'static Location<'static>,
}

impl BackendError {
    /// Build an error located at the caller.
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        Self {
            kind,
            location: Location::caller(),
        }
    }
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThreadPool(reason) => write!(f, "thread pool construction failed: {reason}"),
            Self::AllocationFailed { elements } => {
                write!(f, "cannot allocate {elements} elements")
            }
        }
    }
}

// ── RegistryError ──────────────────────────────────────────────────

/// Failure to register or resolve a named data component.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The name is already taken.
    #[error("data component `{name}` is already registered")]
    Duplicate {
        /// Component name.
        name: String,
    },
    /// No component of that name exists.
    #[error("no data component named `{name}`")]
    NotFound {
        /// Component name.
        name: String,
    },
    /// The component exists but holds a different type.
    #[error("data component `{name}` does not hold a `{expected}`")]
    TypeMismatch {
        /// Component name.
        name: String,
        /// Requested type name.
        expected: &'static str,
    },
    /// A thread panicked while holding the component's lock.
    #[error("data component `{name}` is poisoned")]
    Poisoned {
        /// Component name.
        name: String,
    },
}

// ── SolverError ────────────────────────────────────────────────────

/// Any failure surfaced by the field solver.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// An update or diagnostic was requested before `init()`.
    #[error("field solver used before init()")]
    NotInitialized,
    /// `init()` was called on an already initialised solver.
    #[error("field solver is already initialised")]
    AlreadyInitialized,
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Communication error.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// Backend error.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Registry error.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
