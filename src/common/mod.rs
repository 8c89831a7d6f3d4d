//! Common types shared across the cache engine: address translation and
//! error enums.

/// Byte-address-to-cache-line translation ([`AddressCodec`]).
pub mod addr;
/// Configuration and request error types.
pub mod error;

pub use addr::AddressCodec;
pub use error::{ConfigError, RequestError};
