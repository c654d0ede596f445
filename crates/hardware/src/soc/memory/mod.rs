//! The DDR subsystem: controller-side arbitration and the banked memory.

/// Request arbitration and timing accounting.
pub mod controller;

/// Per-bank state machines and the completion queue.
pub mod ddr;

pub use controller::{BankTiming, DdrController};
pub use ddr::{Bank, BankState, DdrMemory};
