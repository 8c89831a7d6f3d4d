//! Error types for graph construction and request handling.
//!
//! This module separates the two reportable fault classes from §7 of the
//! design: configuration faults (raised once, at graph-build time) and
//! request faults (raised per call, with no counter mutation). The third
//! class — internal invariants — never surfaces here; those are
//! `debug_assert!`s at the point of violation.

use thiserror::Error;

/// Faults detected while building a [`crate::sim::Graph`] from a
/// [`crate::config::GraphDescription`].
///
/// All of these are fatal: the builder refuses to construct a
/// `Simulator` when any of them fire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `cl_size` is not a power of two.
    #[error("cache `{name}`: cl_size {cl_size} is not a power of two")]
    LineSizeNotPowerOfTwo {
        /// Name of the offending cache node.
        name: String,
        /// The offending line size.
        cl_size: usize,
    },

    /// `sets` is not a power of two (required for the mask-based set index).
    #[error("cache `{name}`: sets {sets} is not a power of two")]
    SetsNotPowerOfTwo {
        /// Name of the offending cache node.
        name: String,
        /// The offending set count.
        sets: usize,
    },

    /// `ways` is zero.
    #[error("cache `{name}`: ways must be at least 1")]
    ZeroWays {
        /// Name of the offending cache node.
        name: String,
    },

    /// Line size must be monotone non-decreasing toward memory along
    /// `load_from` and `store_to`.
    #[error(
        "cache `{name}` (cl_size={cl_size}) has a smaller cl_size than its \
         neighbour `{neighbour}` (cl_size={neighbour_cl_size}) along `{edge}`"
    )]
    LineSizeNotMonotone {
        /// Name of the cache whose line size is too small.
        name: String,
        /// That cache's line size.
        cl_size: usize,
        /// Name of the neighbour along the offending edge.
        neighbour: String,
        /// The neighbour's line size.
        neighbour_cl_size: usize,
        /// Which edge (`load_from` or `store_to`) was checked.
        edge: &'static str,
    },

    /// `victims_to` requires identical `cl_size` on both ends.
    #[error(
        "cache `{name}` (cl_size={cl_size}) and its victim cache `{victim}` \
         (cl_size={victim_cl_size}) must share the same cl_size"
    )]
    VictimLineSizeMismatch {
        /// Name of the source cache.
        name: String,
        /// Source cache's line size.
        cl_size: usize,
        /// Name of the victim cache.
        victim: String,
        /// Victim cache's line size.
        victim_cl_size: usize,
    },

    /// The (`write_back`, `write_allocate`, `write_combining`) triple is not
    /// one of the four legal combinations in §3.
    #[error(
        "cache `{name}`: write policy (write_back={write_back}, \
         write_allocate={write_allocate}, write_combining={write_combining}) \
         is not a supported combination"
    )]
    InvalidWritePolicy {
        /// Name of the offending cache node.
        name: String,
        /// Requested `write_back` flag.
        write_back: bool,
        /// Requested `write_allocate` flag.
        write_allocate: bool,
        /// Requested `write_combining` flag.
        write_combining: bool,
    },

    /// Write-combining requires a `subblock_size` that evenly divides
    /// `cl_size`.
    #[error(
        "cache `{name}`: subblock_size {subblock_size} does not divide \
         cl_size {cl_size}"
    )]
    SubblockSizeDoesNotDivide {
        /// Name of the offending cache node.
        name: String,
        /// The requested subblock size.
        subblock_size: usize,
        /// The cache's line size.
        cl_size: usize,
    },

    /// Write-combining was requested without a `subblock_size`.
    #[error("cache `{name}`: write_combining requires a subblock_size")]
    MissingSubblockSize {
        /// Name of the offending cache node.
        name: String,
    },

    /// An edge names a cache that is not present in the description.
    #[error("cache `{name}`: `{edge}` refers to unknown cache `{target}`")]
    UnknownEdgeTarget {
        /// Name of the cache with the dangling edge.
        name: String,
        /// Which edge (`load_from`, `store_to`, `victims_to`).
        edge: &'static str,
        /// The unresolved target name.
        target: String,
    },

    /// Zero or more than one node has no incoming edge, so the first level
    /// is ambiguous or undefined.
    #[error(
        "graph has {count} candidate first levels (expected exactly one): {candidates:?}"
    )]
    AmbiguousFirstLevel {
        /// Number of nodes with no incoming edge.
        count: usize,
        /// Their names.
        candidates: Vec<String>,
    },

    /// The description is empty.
    #[error("graph description has no cache nodes")]
    EmptyGraph,

    /// The edges form a cycle.
    #[error("graph contains a cycle reaching back to `{name}`")]
    Cycle {
        /// Name of a cache on the cycle.
        name: String,
    },
}

/// Faults raised by the request-trace API ([`crate::sim::Simulator`]).
///
/// Unlike [`ConfigError`], these are raised on a specific call and leave
/// all counters untouched. Note that a zero-length request is *not* a
/// fault (§8: "a no-op on all counters"), and "iterable expected where
/// scalar was given" cannot arise here: the request surface accepts both
/// through one generic address-sequence parameter, so there is no
/// runtime branch to reject.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// `non_temporal=true` was passed to a store; non-temporal stores are
    /// explicitly out of scope (§1 Non-goals).
    #[error("non-temporal stores are not supported")]
    NonTemporalUnsupported,
}
