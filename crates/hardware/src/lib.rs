//! Cycle-accurate multi-core memory hierarchy simulator.
//!
//! This crate models, cycle by cycle, the path of memory requests from CPU
//! cores down to DDR and back:
//! 1. **Caches:** Per-core private L1s over one shared L2, N-way set
//!    associative with tree-PLRU replacement and configurable write
//!    policies.
//! 2. **Interconnect:** A bounded-bandwidth delay queue with seedable
//!    jitter between the L2 and the controller.
//! 3. **DDR:** A controller that reorders requests by row-hit,
//!    read-over-write, and age under per-bank timing constraints, and a
//!    banked memory with per-bank row-buffer state machines.
//! 4. **Cores:** Trace-driven front-ends that stall on same-address
//!    hazards and resume when fills complete.
//! 5. **Simulation:** `Simulator` (owns the clock and every component),
//!    configuration, and statistics.
//!
//! Everything runs single-threaded on a discrete global clock; given the
//! same traces, configuration, and seed, every cycle's events reproduce
//! exactly.

/// Cache modeling: PLRU, levels, and the L1/L2 hierarchy.
pub mod cache;
/// Common types: addresses, requests, errors, RNG.
pub mod common;
/// Simulator configuration (defaults, hierarchical structures, validation).
pub mod config;
/// Trace-driven core front-end.
pub mod core;
/// Simulation driver: global clock and the per-cycle loop.
pub mod sim;
/// System-side components: interconnect, DDR controller, DDR memory.
pub mod soc;
/// Statistics snapshots and the end-of-run report.
pub mod stats;

/// Read/write discriminator for trace entries and requests.
pub use crate::common::request::AccessKind;
/// Construction-time and trace-boundary errors.
pub use crate::common::error::{ConfigError, TraceError};
/// Root configuration type; use `SimConfig::default()` or deserialize from JSON.
pub use crate::config::SimConfig;
/// A core's trace and its entries.
pub use crate::core::{Trace, TraceOp};
/// Top-level simulator; owns the clock and every component.
pub use crate::sim::simulator::Simulator;
/// End-of-run statistics report.
pub use crate::stats::{CacheStats, SimReport};
