//! The agent side of the bridge.
//!
//! [`Agent`] owns at most one equipped reasoning process and exposes the
//! per-tick API a simulation drives. Received operations are stored through
//! an [`OperationPolicy`] into the shared [`OperationState`]; perceptions are
//! produced by a [`Sensor`].

pub mod core;
pub mod policy;
pub mod sensor;
pub mod state;

pub use self::core::Agent;
pub use policy::{DefaultPolicy, ExclusivePolicy, OperationPolicy};
pub use sensor::{NullSensor, RelativePositionSensor, Sensor};
pub use state::{OperationState, OperationTable};
