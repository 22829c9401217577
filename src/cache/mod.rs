//! Response caching for API reads.
//!
//! This module provides the `ResponseCache`: a TTL-expiring store of JSON
//! responses keyed by request identity. Reads go through the cache; writes
//! bypass it and invalidate the keys they affect.

pub mod response;

pub use response::ResponseCache;
