//! The multi-level cache: per-core private L1s over one shared L2.
//!
//! The hierarchy routes accesses between levels and the interconnect. A
//! read descends L1 → L2, reserving a fill slot at each missing level; if
//! the L2 also misses, the request leaves for memory carrying those slots
//! as its continuation stack. [`CacheHierarchy::complete`] unwinds the
//! stack when the controller reports the data back: L2 fill, then L1 fill,
//! then the issuing core is woken. Dirty victims displaced along the way
//! are written to the next level down, which may in turn emit memory-bound
//! write requests; the recursion is bounded by the two levels.

use crate::cache::level::{CacheLevel, ReadOutcome, WriteOutcome};
use crate::common::request::{AccessKind, FillSlot, Level, MemoryRequest};
use crate::config::SimConfig;

/// Outcome of a read issued into the hierarchy.
#[derive(Debug)]
pub struct ReadIssue {
    /// The read completed synchronously this cycle (a cache hit).
    pub completed: bool,
    /// Requests bound for the interconnect: the miss itself and/or victim
    /// write-backs surfaced by a same-cycle fill.
    pub requests: Vec<MemoryRequest>,
}

/// Per-core L1 caches stacked over the shared L2.
#[derive(Debug)]
pub struct CacheHierarchy {
    l1: Vec<CacheLevel>,
    l2: CacheLevel,
}

impl CacheHierarchy {
    /// Builds the hierarchy for a validated configuration.
    pub fn new(config: &SimConfig) -> Self {
        Self {
            l1: (0..config.cores)
                .map(|core| CacheLevel::new("L1", Some(core), &config.l1))
                .collect(),
            l2: CacheLevel::new("L2", None, &config.l2),
        }
    }

    /// The private L1 of `core`.
    pub fn l1(&self, core: usize) -> &CacheLevel {
        &self.l1[core]
    }

    /// The shared L2.
    pub fn l2(&self) -> &CacheLevel {
        &self.l2
    }

    fn level_mut(&mut self, level: Level) -> &mut CacheLevel {
        match level {
            Level::L1(core) => &mut self.l1[core],
            Level::L2 => &mut self.l2,
        }
    }

    /// Issues a read from `core`.
    ///
    /// An L1 hit completes immediately. An L1 miss probes the L2: a hit
    /// there fills the reserved L1 slot in the same cycle (surfacing any
    /// dirty victim into the L2); a miss builds the memory-bound request
    /// with both fill slots on its continuation stack.
    pub fn read(&mut self, core: usize, addr: u64, now: u64) -> ReadIssue {
        let mut requests = Vec::new();
        let ReadOutcome::Miss { set, way, tag } = self.l1[core].read_access(addr, now) else {
            return ReadIssue {
                completed: true,
                requests,
            };
        };
        match self.l2.read_access(addr, now) {
            ReadOutcome::Hit => {
                if let Some(victim) = self.l1[core].fill(set, way, tag, now) {
                    self.write_at(Level::L2, core, victim, now, &mut requests);
                }
                ReadIssue {
                    completed: true,
                    requests,
                }
            }
            ReadOutcome::Miss {
                set: l2_set,
                way: l2_way,
                tag: l2_tag,
            } => {
                let fills = vec![
                    FillSlot {
                        level: Level::L1(core),
                        set,
                        way,
                        tag,
                    },
                    FillSlot {
                        level: Level::L2,
                        set: l2_set,
                        way: l2_way,
                        tag: l2_tag,
                    },
                ];
                requests.push(MemoryRequest::read(core, now, addr, fills));
                ReadIssue {
                    completed: false,
                    requests,
                }
            }
        }
    }

    /// Issues a write from `core`, returning any memory-bound requests
    /// (policy bypasses and dirty victim write-backs).
    pub fn write(&mut self, core: usize, addr: u64, now: u64) -> Vec<MemoryRequest> {
        let mut requests = Vec::new();
        self.write_at(Level::L1(core), core, addr, now, &mut requests);
        requests
    }

    fn write_at(
        &mut self,
        level: Level,
        core: usize,
        addr: u64,
        now: u64,
        out: &mut Vec<MemoryRequest>,
    ) {
        match self.level_mut(level).write_access(addr, now) {
            WriteOutcome::Done | WriteOutcome::Allocated { writeback: None } => {}
            WriteOutcome::Propagate | WriteOutcome::Bypass => {
                self.write_below(level, core, addr, now, out);
            }
            WriteOutcome::Allocated {
                writeback: Some(victim),
            } => self.write_below(level, core, victim, now, out),
        }
    }

    fn write_below(
        &mut self,
        level: Level,
        core: usize,
        addr: u64,
        now: u64,
        out: &mut Vec<MemoryRequest>,
    ) {
        match level {
            Level::L1(_) => self.write_at(Level::L2, core, addr, now, out),
            Level::L2 => out.push(MemoryRequest::write(core, now, addr)),
        }
    }

    /// Unwinds a completed read: fills the reserved slots top-down (L2
    /// first, then the issuing core's L1), routing displaced dirty victims
    /// to the level below each fill. Returns the `(core, addr)` to wake and
    /// any new memory-bound write requests.
    ///
    /// Each fill slot runs exactly once, here, after the lower level's data
    /// has arrived.
    pub fn complete(
        &mut self,
        mut req: MemoryRequest,
        now: u64,
    ) -> (usize, u64, Vec<MemoryRequest>) {
        debug_assert_eq!(req.kind, AccessKind::Read, "writes carry no continuation");
        let mut requests = Vec::new();
        while let Some(slot) = req.fills.pop() {
            if let Some(victim) = self
                .level_mut(slot.level)
                .fill(slot.set, slot.way, slot.tag, now)
            {
                self.write_below(slot.level, req.core_id, victim, now, &mut requests);
            }
        }
        (req.core_id, req.addr, requests)
    }

    /// Asserts the structural invariants of every level.
    pub fn check_invariants(&self) {
        for l1 in &self.l1 {
            l1.check_invariants();
        }
        self.l2.check_invariants();
    }
}
