//! # rehost-membrane
//!
//! The layer between opaque addresses used by re-hosted code and memory
//! owned by the host. Everything above this crate addresses memory through
//! [`Ptr`] values resolved by an [`AddressSpace`].
//!
//! # Architecture
//!
//! ```text
//! generated code -> rehost-abi entry -> AddressSpace (resolve + bounds) -> rehost-core on slices
//! ```
//!
//! Also hosts the ambient pieces every other crate shares: configuration,
//! structured JSONL logging and diagnostic counters.

pub mod arena;
pub mod config;
pub mod log;
pub mod metrics;
pub mod ptr;

pub use arena::{AddressSpace, Allocation, FreeResult, Span, global_space};
pub use log::{LogEntry, LogLevel};
pub use metrics::{MembraneMetrics, MetricsSnapshot, global_metrics};
pub use ptr::{Ptr, WORD_SIZE};
