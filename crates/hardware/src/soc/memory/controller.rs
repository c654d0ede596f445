//! DDR memory controller: queueing, arbitration, and timing accounting.
//!
//! The controller holds arriving requests in an arrival-ordered queue and
//! schedules at most one DDR command per cycle. Scheduling works in two
//! steps:
//! 1. **Candidates:** requests whose target bank has finished precharging
//!    and is past the column-to-column window (`tCCD`) since its last
//!    command.
//! 2. **Rank:** row-buffer hits first, then reads over writes, then oldest
//!    arrival.
//!
//! A row hit costs `row_hit_latency`; a row miss (or closed bank) pays the
//! full `tRP + tRCD + tCAS` and starts the bank's precharge window. A
//! direction change on a bank adds the turnaround penalty: `tWR` for
//! write→read, `tWR + 2` for read→write.
//!
//! The controller keeps ownership of scheduled requests; on each tick it
//! first drains the in-flight list and hands completed reads back so their
//! fill chains can run, then schedules. Completed writes need no callback
//! and simply retire.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::common::addr::DdrMap;
use crate::common::request::{AccessKind, DdrCommand, MemoryRequest};
use crate::config::DdrConfig;

/// DDR timing constants, captured from configuration.
///
/// `t_rc` and `t_rtp` are part of the configured constant set although the
/// arbitration rules here do not consume them.
#[derive(Debug, Clone, Copy)]
pub struct DdrTiming {
    /// Row-to-column delay.
    pub t_rcd: u64,
    /// Row precharge latency.
    pub t_rp: u64,
    /// Column access strobe latency.
    pub t_cas: u64,
    /// Row cycle time.
    pub t_rc: u64,
    /// Write recovery time.
    pub t_wr: u64,
    /// Read-to-precharge spacing.
    pub t_rtp: u64,
    /// Column-to-column delay.
    pub t_ccd: u64,
}

impl DdrTiming {
    fn from_config(config: &DdrConfig) -> Self {
        Self {
            t_rcd: config.t_rcd,
            t_rp: config.t_rp,
            t_cas: config.t_cas,
            t_rc: config.t_rc,
            t_wr: config.t_wr,
            t_rtp: config.t_rtp,
            t_ccd: config.t_ccd,
        }
    }
}

/// Controller-side timing state for one bank.
#[derive(Debug, Clone, Default)]
pub struct BankTiming {
    /// Row currently held open in the bank's row buffer.
    pub open_row: Option<u64>,
    /// Cycle at which the bank's precharge finishes.
    pub precharge_ready: u64,
    /// Cycle of the last command issued to the bank.
    pub last_command: Option<u64>,
    /// Direction of the last command issued to the bank.
    pub last_kind: Option<AccessKind>,
}

/// The DDR memory controller.
#[derive(Debug)]
pub struct DdrController {
    timing: DdrTiming,
    row_hit_latency: u64,
    map: DdrMap,
    queue: BTreeMap<(u64, u64), MemoryRequest>,
    seq: u64,
    banks: Vec<BankTiming>,
    inflight: Vec<MemoryRequest>,
    /// Total commands scheduled to the DDR.
    pub scheduled_commands: u64,
}

impl DdrController {
    /// Creates the controller for a validated DDR configuration.
    pub fn new(config: &DdrConfig) -> Self {
        Self {
            timing: DdrTiming::from_config(config),
            row_hit_latency: config.effective_row_hit_latency(),
            map: DdrMap::new(config.num_banks, config.row_stride),
            queue: BTreeMap::new(),
            seq: 0,
            banks: vec![BankTiming::default(); config.num_banks],
            inflight: Vec::new(),
            scheduled_commands: 0,
        }
    }

    /// Accepts a request from the interconnect.
    pub fn request(&mut self, req: MemoryRequest, now: u64) {
        trace!(cycle = now, addr = req.addr, kind = ?req.kind, "controller enqueue");
        let _ = self.queue.insert((now, self.seq), req);
        self.seq += 1;
    }

    /// The timing constants in effect.
    pub fn timing(&self) -> DdrTiming {
        self.timing
    }

    /// Controller-side state of `bank`.
    pub fn bank(&self, bank: usize) -> &BankTiming {
        &self.banks[bank]
    }

    /// Number of requests waiting for a bank.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Number of requests scheduled to the DDR and not yet complete.
    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    /// Advances the controller one cycle.
    ///
    /// Returns the reads whose completion time has arrived (their fill
    /// chains must run this cycle) and at most one newly scheduled command
    /// for the DDR. An empty candidate set is a normal idle cycle.
    pub fn tick(&mut self, now: u64) -> (Vec<MemoryRequest>, Option<DdrCommand>) {
        let completed = self.drain_completions(now);
        let command = self.schedule(now);
        (completed, command)
    }

    fn drain_completions(&mut self, now: u64) -> Vec<MemoryRequest> {
        let mut done = Vec::new();
        let mut i = 0;
        while i < self.inflight.len() {
            if self.inflight[i].completion_time.is_some_and(|t| t <= now) {
                let req = self.inflight.remove(i);
                match req.kind {
                    AccessKind::Read => {
                        trace!(cycle = now, addr = req.addr, "read complete");
                        done.push(req);
                    }
                    AccessKind::Write => {
                        trace!(cycle = now, addr = req.addr, "write retired");
                    }
                }
            } else {
                i += 1;
            }
        }
        done
    }

    /// Picks and schedules the best eligible request, if any.
    fn schedule(&mut self, now: u64) -> Option<DdrCommand> {
        // Rank eligible requests by (row miss, is write, arrival, seq):
        // the lexicographic minimum is the row-hitting, reading, oldest one.
        let mut best: Option<((bool, bool, u64, u64), (u64, u64))> = None;
        for (&(arrival, seq), req) in &self.queue {
            let bank = &self.banks[self.map.bank(req.addr)];
            if bank.precharge_ready > now {
                continue;
            }
            if bank.last_command.is_some_and(|t| now < t + self.timing.t_ccd) {
                continue;
            }
            let row_hit = bank.open_row == Some(self.map.row(req.addr));
            let rank = (!row_hit, req.kind == AccessKind::Write, arrival, seq);
            if best.map_or(true, |(r, _)| rank < r) {
                best = Some((rank, (arrival, seq)));
            }
        }
        let (_, key) = best?;

        let mut req = self.queue.remove(&key)?;
        let bank_idx = self.map.bank(req.addr);
        let row = self.map.row(req.addr);
        let bank = &mut self.banks[bank_idx];

        let mut delay = if bank.open_row == Some(row) {
            self.row_hit_latency
        } else {
            bank.precharge_ready = now + self.timing.t_rp;
            bank.open_row = Some(row);
            self.timing.t_rp + self.timing.t_rcd + self.timing.t_cas
        };
        if let Some(last) = bank.last_kind {
            if last != req.kind {
                delay += match req.kind {
                    AccessKind::Read => self.timing.t_wr,
                    AccessKind::Write => self.timing.t_wr + 2,
                };
            }
        }

        let completion = now + delay;
        bank.last_command = Some(now);
        bank.last_kind = Some(req.kind);
        req.completion_time = Some(completion);
        self.scheduled_commands += 1;
        debug!(
            cycle = now,
            addr = req.addr,
            kind = ?req.kind,
            bank = bank_idx,
            row,
            delay,
            completion,
            "ddr schedule"
        );

        let command = DdrCommand {
            kind: req.kind,
            addr: req.addr,
            completion_time: completion,
        };
        self.inflight.push(req);
        Some(command)
    }
}
