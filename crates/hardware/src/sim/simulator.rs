//! Simulator: owns every component and the global clock side-by-side.
//!
//! The clock is a plain value passed into each component's tick; there is
//! no process-global cycle counter. Within a cycle the tick order is fixed:
//! cores, then interconnect, then controller, then DDR. That order makes
//! shared-L2 ties resolve by core id and keeps DDR results invisible to
//! the caches until the following cycle.

use crate::cache::hierarchy::CacheHierarchy;
use crate::common::error::{ConfigError, TraceError};
use crate::common::request::AccessKind;
use crate::common::rng::XorShiftRng;
use crate::config::SimConfig;
use crate::core::{Core, Trace};
use crate::soc::interconnect::Interconnect;
use crate::soc::memory::controller::DdrController;
use crate::soc::memory::ddr::DdrMemory;
use crate::stats::SimReport;

/// Top-level simulator: cores, caches, interconnect, controller, DDR.
#[derive(Debug)]
pub struct Simulator {
    clock: u64,
    /// The trace-replaying cores, indexed by core id.
    pub cores: Vec<Core>,
    /// Per-core L1s over the shared L2.
    pub caches: CacheHierarchy,
    /// Fabric between the L2 and the controller.
    pub interconnect: Interconnect,
    /// The DDR memory controller.
    pub controller: DdrController,
    /// The banked DDR memory.
    pub ddr: DdrMemory,
}

impl Simulator {
    /// Builds a simulator from the given configuration.
    ///
    /// # Errors
    ///
    /// Fails fast with a [`ConfigError`] before any component is built if
    /// the configuration is rejected.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            clock: 0,
            cores: (0..config.cores).map(Core::new).collect(),
            caches: CacheHierarchy::new(config),
            interconnect: Interconnect::new(&config.interconnect, XorShiftRng::new(config.seed)),
            controller: DdrController::new(&config.ddr),
            ddr: DdrMemory::new(&config.ddr),
        })
    }

    /// Installs a trace on the given core.
    ///
    /// # Errors
    ///
    /// Rejects traces addressed to a core the system does not have.
    pub fn load_trace(&mut self, core_id: usize, trace: Trace) -> Result<(), TraceError> {
        let num_cores = self.cores.len();
        let core = self
            .cores
            .get_mut(core_id)
            .ok_or(TraceError::UnknownCore { core_id, num_cores })?;
        core.load_instr(trace);
        Ok(())
    }

    /// The current global cycle.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Runs the loop for `cycles` cycles.
    pub fn simulate(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Advances the whole system by one cycle.
    pub fn step(&mut self) {
        let now = self.clock;

        for core_id in 0..self.cores.len() {
            let Some(op) = self.cores[core_id].tick(now) else {
                continue;
            };
            match op.kind {
                AccessKind::Write => {
                    for req in self.caches.write(core_id, op.addr, now) {
                        self.interconnect.request(req, now);
                    }
                }
                AccessKind::Read => {
                    let issue = self.caches.read(core_id, op.addr, now);
                    let completed = issue.completed;
                    for req in issue.requests {
                        self.interconnect.request(req, now);
                    }
                    if completed {
                        self.cores[core_id].finish_read(op.addr);
                    }
                }
            }
        }

        for req in self.interconnect.tick(now) {
            self.controller.request(req, now);
        }

        let (completed, command) = self.controller.tick(now);
        if let Some(command) = command {
            self.ddr.request(command, now);
        }
        for req in completed {
            let (core_id, addr, writebacks) = self.caches.complete(req, now);
            for writeback in writebacks {
                self.interconnect.request(writeback, now);
            }
            self.cores[core_id].finish_read(addr);
        }

        self.ddr.tick(now);
        self.clock += 1;
    }

    /// Snapshot of the per-level statistics.
    pub fn report(&self) -> SimReport {
        SimReport {
            cycles: self.clock,
            l1: (0..self.cores.len())
                .map(|core| self.caches.l1(core).stats())
                .collect(),
            l2: self.caches.l2().stats(),
        }
    }
}
