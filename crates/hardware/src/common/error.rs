//! Error types for simulator construction and trace loading.
//!
//! Misconfiguration is rejected fail-fast, before any component is built.
//! Trace input is validated at the system boundary; entries themselves are
//! well-formed by construction (unsigned addresses, typed access kinds), so
//! the remaining check is that the addressed core exists.

use thiserror::Error;

/// A configuration the simulator refuses to build.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// PLRU victim selection requires a power-of-two associativity.
    #[error("{level}: associativity must be a power of two, got {ways}")]
    AssocNotPowerOfTwo {
        /// Cache level name.
        level: &'static str,
        /// Offending way count.
        ways: usize,
    },

    /// The cache size does not split into an integral number of sets.
    #[error("{level}: size {size_bytes} B is not divisible by line_bytes * ways ({line_bytes} * {ways})")]
    SizeNotDivisible {
        /// Cache level name.
        level: &'static str,
        /// Configured total size in bytes.
        size_bytes: usize,
        /// Configured line size in bytes.
        line_bytes: usize,
        /// Configured way count.
        ways: usize,
    },

    /// A cache line cannot be zero bytes.
    #[error("{level}: line size must be positive")]
    ZeroLineSize {
        /// Cache level name.
        level: &'static str,
    },

    /// The cache must hold at least one set.
    #[error("{level}: size {size_bytes} B holds no complete set of {ways} lines")]
    ZeroSets {
        /// Cache level name.
        level: &'static str,
        /// Configured total size in bytes.
        size_bytes: usize,
        /// Configured way count.
        ways: usize,
    },

    /// The DDR needs at least one bank.
    #[error("number of DDR banks must be positive")]
    ZeroBanks,

    /// The DDR row stride maps addresses to rows and cannot be zero.
    #[error("DDR row stride must be positive")]
    ZeroRowStride,

    /// The interconnect must forward at least one request per cycle.
    #[error("interconnect bandwidth must be positive")]
    ZeroBandwidth,

    /// A system without cores cannot issue accesses.
    #[error("at least one core is required")]
    ZeroCores,
}

/// A trace rejected at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// The trace addresses a core the system does not have.
    #[error("no core with id {core_id}; the system has {num_cores} cores")]
    UnknownCore {
        /// Requested core id.
        core_id: usize,
        /// Number of cores actually configured.
        num_cores: usize,
    },
}
