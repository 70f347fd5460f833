//! In-memory backend for the rollcall storage traits.
//!
//! Mutex-guarded hash maps with lazy TTL expiry. This is the backend used
//! by small deployments and by every test; a Redis backend would implement
//! the same traits against `SETEX`/`TTL`/set membership.

pub mod memory;

pub use memory::MemoryStore;
