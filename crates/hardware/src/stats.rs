//! Simulation statistics collection and reporting.
//!
//! Hit/miss counters live on the cache levels themselves; this module
//! defines the snapshot types and the end-of-run report.

/// Hit/miss counters for one cache level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Accesses satisfied at the level.
    pub hits: u64,
    /// Accesses forwarded (or allocated) past the level.
    pub misses: u64,
}

impl CacheStats {
    /// Total accesses routed through the level.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that missed; 0 when the level saw no traffic.
    pub fn miss_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses() as f64
        }
    }
}

/// End-of-run statistics: per-core L1s and the shared L2.
#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    /// Cycles simulated.
    pub cycles: u64,
    /// One entry per core's private L1, indexed by core id.
    pub l1: Vec<CacheStats>,
    /// The shared L2.
    pub l2: CacheStats,
}

impl SimReport {
    /// Prints the report to stdout.
    pub fn print(&self) {
        let print_level = |name: &str, stats: &CacheStats| {
            println!(
                "  {:<6} accesses: {:<10} | hits: {:<10} | misses: {:<10} | miss_rate: {:.2}%",
                name,
                stats.accesses(),
                stats.hits,
                stats.misses,
                stats.miss_rate() * 100.0
            );
        };
        println!("\n==========================================================");
        println!("MEMORY HIERARCHY SIMULATION STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("----------------------------------------------------------");
        for (core, stats) in self.l1.iter().enumerate() {
            print_level(&format!("L1#{core}"), stats);
        }
        print_level("L2", &self.l2);
        println!("==========================================================");
    }
}
