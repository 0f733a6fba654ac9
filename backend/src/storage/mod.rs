//! Storage abstraction and the in-memory reference backend.

pub mod memory;
pub mod traits;

pub use memory::MemoryConnection;
pub use traits::{Connection, ShiftStorage, TaskStorage};
