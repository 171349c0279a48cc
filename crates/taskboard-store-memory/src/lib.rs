//! In-memory backend for Taskboard.
//!
//! All state lives behind one [`tokio::sync::RwLock`]. Mutations hold the
//! write lock for their whole guard-then-apply sequence, so no reader ever
//! observes a partially applied operation.

mod state;
mod store;

pub use store::MemoryStore;

#[cfg(test)]
mod tests;
