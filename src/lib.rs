//! A trace-driven, functional simulator of a multi-level CPU cache
//! hierarchy.
//!
//! The crate consumes a graph description of caches wired together by
//! `load_from`/`store_to`/`victims_to` edges, and a trace of
//! `(address, length)` load/store operations, and reports per-level
//! hit/miss/eviction counters plus a cache-content query for
//! visualisation. Configuration parsing off disk, the command-line
//! driver, VTK file placement, and perfcounter post-processing are
//! left to callers — this crate owns only the simulation core and the
//! VTK *encoding* (not where the file goes).
//!
//! The entry point is [`sim::Simulator`]:
//!
//! ```
//! use std::collections::BTreeMap;
//! use cachesim_core::config::{CacheNodeDescription, ReplacementPolicyKind};
//! use cachesim_core::sim::Simulator;
//!
//! let mut description = BTreeMap::new();
//! description.insert(
//!     "L1".to_string(),
//!     CacheNodeDescription {
//!         sets: 64,
//!         ways: 8,
//!         cl_size: 64,
//!         replacement_policy: ReplacementPolicyKind::Lru,
//!         write_back: true,
//!         write_allocate: true,
//!         write_combining: false,
//!         subblock_size: None,
//!         swap_on_load: false,
//!         load_from: None,
//!         store_to: None,
//!         victims_to: None,
//!     },
//! );
//!
//! let mut sim = Simulator::from_description(&description).unwrap();
//! sim.load(&0u64, 64);
//! assert_eq!(sim.stats()[0].miss_count, 1);
//! ```

pub mod common;
pub mod config;
pub mod core;
pub mod sim;
pub mod vis;

pub use common::error::{ConfigError, RequestError};
pub use config::{CacheNodeDescription, GraphDescription, ReplacementPolicyKind};
pub use sim::{AddressSeq, Graph, LevelStats, Simulator};
