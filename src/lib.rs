//! # nars-bridge
//!
//! Drives simulated agents with an external NARS reasoner running as a child
//! process. The agent writes perceptions, goals and reinforcement as logic
//! sentences to the reasoner's stdin and reads back the operations it decides
//! to execute.
//!
//! Four backend dialects are built in (OpenNARS, ONA, the older ONA build and
//! NARS-Python); each is described by a [`DialectProfile`] so further
//! dialects can be added without touching the bridge.
//!
//! ```no_run
//! use std::sync::Arc;
//! use nars_bridge::{Agent, BridgeConfig, DialectKind, Operation};
//!
//! # async fn run() -> nars_bridge::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let profile = Arc::new(DialectKind::Ona.profile(&config));
//! let mut agent = Agent::launch("good", config, profile)?.with_negative_goal("bad");
//! agent.register_basic_operation(&Operation::new("left"));
//! agent.praise();
//! if agent.take(&Operation::new("left")) {
//!     // move left
//! }
//! agent.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod bridge;
pub mod dialect;
pub mod types;
pub mod utilities;

pub use agent::{Agent, DefaultPolicy, ExclusivePolicy, OperationPolicy, OperationState, Sensor};
pub use bridge::{CommandQueue, ProcessState, ReaderLoop, ReasoningProcess};
pub use dialect::{DialectKind, DialectProfile, OperationPattern, SentenceTemplates};
pub use types::{Entity, Operation, Perception, PerceptionContext};
pub use utilities::{BridgeConfig, BridgeError, Result};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
