//! Configuration system for the memory hierarchy simulator.
//!
//! This module defines all configuration structures used to parameterize an
//! experiment. It provides:
//! 1. **Defaults:** The nominal experiment constants (cache geometry,
//!    interconnect, DDR timing).
//! 2. **Structures:** Hierarchical config for cores, caches, interconnect,
//!    and DDR.
//! 3. **Validation:** Fail-fast checks run before any component is built.
//!
//! Configuration is supplied via JSON scenario files or `SimConfig::default()`.

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
///
/// These values define the nominal experiment configuration when not
/// explicitly overridden.
mod defaults {
    /// Number of simulated cores.
    pub const NUM_CORES: usize = 2;

    /// Total L1 size in bytes.
    pub const L1_SIZE: usize = 32;

    /// L1 line size in bytes.
    pub const L1_LINE: usize = 4;

    /// L1 associativity.
    pub const L1_WAYS: usize = 2;

    /// Total shared L2 size in bytes.
    pub const L2_SIZE: usize = 1024;

    /// L2 line size in bytes.
    pub const L2_LINE: usize = 4;

    /// L2 associativity.
    pub const L2_WAYS: usize = 16;

    /// Base interconnect traversal delay in cycles.
    pub const IC_DELAY: u64 = 5;

    /// Requests the interconnect forwards per cycle at most.
    pub const IC_BANDWIDTH: usize = 4;

    /// Number of independently addressable DDR banks.
    pub const NUM_BANKS: usize = 4;

    /// Bytes per DDR row (`row = addr / ROW_STRIDE`).
    pub const ROW_STRIDE: u64 = 16;

    /// Row-to-column delay: cycles from activation to column access.
    pub const T_RCD: u64 = 15;

    /// Row precharge: cycles to close an open row.
    pub const T_RP: u64 = 15;

    /// Column access strobe: cycles from column address to data.
    pub const T_CAS: u64 = 15;

    /// Row cycle: minimum cycles between activations of one bank.
    pub const T_RC: u64 = 60;

    /// Write recovery: cycles after a write before the bank turns around.
    pub const T_WR: u64 = 15;

    /// Read-to-precharge spacing in cycles.
    pub const T_RTP: u64 = 8;

    /// Column-to-column delay: minimum cycles between commands to one bank.
    pub const T_CCD: u64 = 4;
}

/// Root configuration for one experiment.
///
/// # Examples
///
/// Deserializing from JSON (typical scenario-file usage):
///
/// ```
/// use memsim_core::config::SimConfig;
///
/// let json = r#"{
///     "cores": 2,
///     "l1": { "size_bytes": 32, "line_bytes": 4, "ways": 2 },
///     "l2": { "size_bytes": 1024, "line_bytes": 4, "ways": 16 },
///     "interconnect": { "delay": 5, "bandwidth": 4 },
///     "ddr": { "num_banks": 4, "row_stride": 16 },
///     "seed": 0
/// }"#;
///
/// let config: SimConfig = serde_json::from_str(json).unwrap();
/// config.validate().unwrap();
/// assert_eq!(config.l2.ways, 16);
/// assert_eq!(config.ddr.t_cas, 15);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Number of cores, each with a private L1.
    #[serde(default = "SimConfig::default_cores")]
    pub cores: usize,

    /// Per-core private L1 configuration.
    #[serde(default = "CacheConfig::default_l1")]
    pub l1: CacheConfig,

    /// Shared L2 configuration.
    #[serde(default = "CacheConfig::default_l2")]
    pub l2: CacheConfig,

    /// Interconnect fabric configuration.
    #[serde(default)]
    pub interconnect: InterconnectConfig,

    /// DDR geometry and timing constants.
    #[serde(default)]
    pub ddr: DdrConfig,

    /// Seed for the interconnect jitter generator.
    #[serde(default)]
    pub seed: u64,
}

impl SimConfig {
    fn default_cores() -> usize {
        defaults::NUM_CORES
    }

    /// Checks the configuration against the construction-time error rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: non-power-of-two
    /// associativity, a size that does not split into whole sets, zero
    /// lines/banks/bandwidth/cores, or a zero row stride.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cores == 0 {
            return Err(ConfigError::ZeroCores);
        }
        self.l1.validate("L1")?;
        self.l2.validate("L2")?;
        if self.interconnect.bandwidth == 0 {
            return Err(ConfigError::ZeroBandwidth);
        }
        if self.ddr.num_banks == 0 {
            return Err(ConfigError::ZeroBanks);
        }
        if self.ddr.row_stride == 0 {
            return Err(ConfigError::ZeroRowStride);
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cores: defaults::NUM_CORES,
            l1: CacheConfig::default_l1(),
            l2: CacheConfig::default_l2(),
            interconnect: InterconnectConfig::default(),
            ddr: DdrConfig::default(),
            seed: 0,
        }
    }
}

/// Individual cache level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways); must be a power of two.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Write-back on hit when true, write-through when false.
    #[serde(default = "CacheConfig::default_write_back")]
    pub write_back: bool,

    /// Allocate a line on write miss when true, bypass when false.
    #[serde(default = "CacheConfig::default_write_allocate")]
    pub write_allocate: bool,
}

impl CacheConfig {
    fn default_size() -> usize {
        defaults::L1_SIZE
    }

    fn default_line() -> usize {
        defaults::L1_LINE
    }

    fn default_ways() -> usize {
        defaults::L1_WAYS
    }

    fn default_write_back() -> bool {
        true
    }

    fn default_write_allocate() -> bool {
        true
    }

    /// The nominal private L1: 32 B, 4 B lines, 2-way.
    pub fn default_l1() -> Self {
        Self {
            size_bytes: defaults::L1_SIZE,
            line_bytes: defaults::L1_LINE,
            ways: defaults::L1_WAYS,
            write_back: true,
            write_allocate: true,
        }
    }

    /// The nominal shared L2: 1 KiB, 4 B lines, 16-way.
    pub fn default_l2() -> Self {
        Self {
            size_bytes: defaults::L2_SIZE,
            line_bytes: defaults::L2_LINE,
            ways: defaults::L2_WAYS,
            write_back: true,
            write_allocate: true,
        }
    }

    /// Number of sets this geometry yields.
    pub fn num_sets(&self) -> usize {
        self.size_bytes / (self.line_bytes * self.ways)
    }

    fn validate(&self, level: &'static str) -> Result<(), ConfigError> {
        if self.line_bytes == 0 {
            return Err(ConfigError::ZeroLineSize { level });
        }
        if !self.ways.is_power_of_two() {
            return Err(ConfigError::AssocNotPowerOfTwo {
                level,
                ways: self.ways,
            });
        }
        if self.size_bytes % (self.line_bytes * self.ways) != 0 {
            return Err(ConfigError::SizeNotDivisible {
                level,
                size_bytes: self.size_bytes,
                line_bytes: self.line_bytes,
                ways: self.ways,
            });
        }
        if self.num_sets() == 0 {
            return Err(ConfigError::ZeroSets {
                level,
                size_bytes: self.size_bytes,
                ways: self.ways,
            });
        }
        Ok(())
    }
}

/// Interconnect fabric configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InterconnectConfig {
    /// Base traversal delay in cycles; jitter of 0..=2 is added per request.
    #[serde(default = "InterconnectConfig::default_delay")]
    pub delay: u64,

    /// Maximum requests forwarded to the controller per cycle.
    #[serde(default = "InterconnectConfig::default_bandwidth")]
    pub bandwidth: usize,
}

impl InterconnectConfig {
    fn default_delay() -> u64 {
        defaults::IC_DELAY
    }

    fn default_bandwidth() -> usize {
        defaults::IC_BANDWIDTH
    }
}

impl Default for InterconnectConfig {
    fn default() -> Self {
        Self {
            delay: defaults::IC_DELAY,
            bandwidth: defaults::IC_BANDWIDTH,
        }
    }
}

/// DDR geometry and timing configuration.
///
/// All timings are in simulator cycles. `row_hit_latency` may be left
/// unset, in which case a row-buffer hit costs `t_cas`.
#[derive(Debug, Clone, Deserialize)]
pub struct DdrConfig {
    /// Number of independently addressable banks.
    #[serde(default = "DdrConfig::default_num_banks")]
    pub num_banks: usize,

    /// Bytes per row; `row = addr / row_stride`.
    #[serde(default = "DdrConfig::default_row_stride")]
    pub row_stride: u64,

    /// Row-to-column delay.
    #[serde(default = "DdrConfig::default_t_rcd")]
    pub t_rcd: u64,

    /// Row precharge latency.
    #[serde(default = "DdrConfig::default_t_rp")]
    pub t_rp: u64,

    /// Column access strobe latency.
    #[serde(default = "DdrConfig::default_t_cas")]
    pub t_cas: u64,

    /// Row cycle time.
    #[serde(default = "DdrConfig::default_t_rc")]
    pub t_rc: u64,

    /// Write recovery time; also the write→read turnaround penalty.
    #[serde(default = "DdrConfig::default_t_wr")]
    pub t_wr: u64,

    /// Read-to-precharge spacing.
    #[serde(default = "DdrConfig::default_t_rtp")]
    pub t_rtp: u64,

    /// Column-to-column delay between commands to the same bank.
    #[serde(default = "DdrConfig::default_t_ccd")]
    pub t_ccd: u64,

    /// Latency of a row-buffer hit; defaults to `t_cas` when unset.
    #[serde(default)]
    pub row_hit_latency: Option<u64>,
}

impl DdrConfig {
    fn default_num_banks() -> usize {
        defaults::NUM_BANKS
    }

    fn default_row_stride() -> u64 {
        defaults::ROW_STRIDE
    }

    fn default_t_rcd() -> u64 {
        defaults::T_RCD
    }

    fn default_t_rp() -> u64 {
        defaults::T_RP
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_rc() -> u64 {
        defaults::T_RC
    }

    fn default_t_wr() -> u64 {
        defaults::T_WR
    }

    fn default_t_rtp() -> u64 {
        defaults::T_RTP
    }

    fn default_t_ccd() -> u64 {
        defaults::T_CCD
    }

    /// The effective row-buffer hit latency.
    pub fn effective_row_hit_latency(&self) -> u64 {
        self.row_hit_latency.unwrap_or(self.t_cas)
    }
}

impl Default for DdrConfig {
    fn default() -> Self {
        Self {
            num_banks: defaults::NUM_BANKS,
            row_stride: defaults::ROW_STRIDE,
            t_rcd: defaults::T_RCD,
            t_rp: defaults::T_RP,
            t_cas: defaults::T_CAS,
            t_rc: defaults::T_RC,
            t_wr: defaults::T_WR,
            t_rtp: defaults::T_RTP,
            t_ccd: defaults::T_CCD,
            row_hit_latency: None,
        }
    }
}
