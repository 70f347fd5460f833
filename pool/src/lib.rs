//! Display pool balancing.
//!
//! The projector shows a grid of encrypted QR payloads. To stop an observer
//! from inferring attendance by counting codes, the pool is padded with
//! decoys up to a minimum size. A decoy is a syntactically perfect payload
//! encrypted under a key that no longer exists, so it can never be scanned
//! successfully and can never be told apart from a real entry.

pub mod balancer;
pub mod decoy;

pub use balancer::{PoolBalancer, PoolError};
pub use decoy::decoy_entry;
