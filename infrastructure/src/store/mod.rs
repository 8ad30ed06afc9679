//! Store adapters

mod memory;
#[cfg(test)]
mod scenarios;

pub use memory::{MemoryRepository, MemoryStore, MemoryTransaction};
