//! Cache replacement policies.
//!
//! Implements the four victim-selection algorithms named in §3/§4.2:
//! FIFO, LRU, MRU, and RR. Each set's ordering state lives in the policy
//! object, indexed by set number — the policy is a single closed enum
//! dispatch (via [`AnyPolicy`]) rather than a `dyn` trait object, per the
//! REDESIGN note in §9 favouring a tagged variant over indirect dispatch.

/// First-In, First-Out replacement policy.
pub mod fifo;
/// Least Recently Used replacement policy.
pub mod lru;
/// Most Recently Used replacement policy.
pub mod mru;
/// Round-robin/random replacement policy, seeded for determinism.
pub mod rr;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use rr::RrPolicy;

/// Common interface implemented by each replacement policy.
pub trait ReplacementPolicy {
    /// Updates ordering state when `way` of `set` is accessed (hit) or
    /// just installed (miss refill).
    fn update(&mut self, set: usize, way: usize);

    /// Selects the way to evict from `set` when it is full.
    fn get_victim(&mut self, set: usize) -> usize;
}

/// A replacement policy, dispatched through a single closed enum instead
/// of `Box<dyn ReplacementPolicy>`.
#[derive(Debug, Clone)]
pub enum AnyPolicy {
    /// First-In, First-Out.
    Fifo(FifoPolicy),
    /// Least Recently Used.
    Lru(LruPolicy),
    /// Most Recently Used.
    Mru(MruPolicy),
    /// Round-robin/random, seeded.
    Rr(RrPolicy),
}

impl ReplacementPolicy for AnyPolicy {
    fn update(&mut self, set: usize, way: usize) {
        match self {
            Self::Fifo(p) => p.update(set, way),
            Self::Lru(p) => p.update(set, way),
            Self::Mru(p) => p.update(set, way),
            Self::Rr(p) => p.update(set, way),
        }
    }

    fn get_victim(&mut self, set: usize) -> usize {
        match self {
            Self::Fifo(p) => p.get_victim(set),
            Self::Lru(p) => p.get_victim(set),
            Self::Mru(p) => p.get_victim(set),
            Self::Rr(p) => p.get_victim(set),
        }
    }
}
