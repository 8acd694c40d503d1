//! In-memory session store for Trellis
//!
//! Sessions live in a process-wide map and are lost on restart. The lock on
//! the map is held only for the synchronous part of each operation, so
//! different sessions never wait on each other's oracle calls.

pub mod repositories;
pub use repositories::{InMemorySessionStore, SessionMap};
