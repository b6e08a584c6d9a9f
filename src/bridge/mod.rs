//! Process plumbing between an agent and its reasoning backend.
//!
//! - **Supervisor** (`ReasoningProcess`): spawns and tears down the backend.
//! - **Command queue** (`CommandQueue`): non-blocking outbound buffer whose
//!   writer loop performs the blocking pipe writes.
//! - **Reader loop** (`ReaderLoop`): turns backend output into canonical
//!   operations and hands them to a callback.
//!
//! The writer and reader run as tokio tasks for as long as the owning agent
//! stays equipped. Ordering is FIFO within each direction; nothing orders
//! inbound operations relative to outbound sentences.

pub mod command_queue;
pub mod reader;
pub mod supervisor;

pub use command_queue::CommandQueue;
pub use reader::{OperationHandler, ReaderLoop, ReaderStats};
pub use supervisor::{ProcessState, ProcessStreams, ReasoningProcess};
