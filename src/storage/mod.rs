//! Snapshot persistence
//!
//! - `engine`: the `Storage` trait
//! - `disk`: snapshot file with write-then-rename saves
//! - `memory`: snapshot bytes kept in memory
//! - `snapshot`: the binary codec shared by both

pub mod disk;
pub mod engine;
pub mod memory;
pub mod snapshot;

pub use disk::DiskStorage;
pub use engine::Storage;
pub use memory::MemoryStorage;
