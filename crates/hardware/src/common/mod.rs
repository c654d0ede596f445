//! Common types shared across the simulator.
//!
//! This module collects the vocabulary the components exchange:
//! 1. **Addresses:** DDR bank/row mapping shared by controller and DDR.
//! 2. **Requests:** Memory requests, fill continuations, DDR commands.
//! 3. **Errors:** Configuration and trace-boundary error enums.
//! 4. **RNG:** The seedable generator used for interconnect jitter.

/// DDR address-to-bank/row mapping.
pub mod addr;

/// Configuration and trace-loading error types.
pub mod error;

/// Memory requests, fill continuations, and DDR commands.
pub mod request;

/// Seedable xorshift pseudo-random generator.
pub mod rng;

pub use addr::DdrMap;
pub use error::{ConfigError, TraceError};
pub use request::{AccessKind, DdrCommand, FillSlot, Level, MemoryRequest};
pub use rng::XorShiftRng;
