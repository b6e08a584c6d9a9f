//! Value types shared across the crate.

pub mod operation;
pub mod perception;

pub use operation::{Operation, OPERATION_MARKER};
pub use perception::{Entity, Perception, PerceptionContext, SELF_OBJECT};
