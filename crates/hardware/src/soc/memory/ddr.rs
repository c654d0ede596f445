//! Banked DDR memory.
//!
//! Each bank runs a small state machine; the controller drives it with
//! commands, and the DDR validates legality and advances on its own tick:
//!
//! ```text
//! IDLE ──activate──▶ READING / WRITING ──complete──▶ ROW ACTIVE
//!   ▲                                                   │
//!   └─────────────── PRECHARGING ◀──────────────────────┘ (row switch)
//! ```
//!
//! A command to an idle bank, or to a bank holding a different row,
//! activates the requested row and starts the access; with the matching
//! row already active the access starts directly. A command in any other
//! state is a simulator-integrity bug: it is logged, the command is
//! dropped (its callback never fires), and a debug assertion elevates it
//! in test builds.

use std::collections::{BTreeMap, HashMap};

use tracing::{error, trace};

use crate::common::addr::DdrMap;
use crate::common::request::{AccessKind, DdrCommand};
use crate::config::DdrConfig;

/// State of one DDR bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankState {
    /// No row open.
    Idle,
    /// A row is open and the bank is ready for column access.
    RowActive,
    /// A read burst is in progress.
    Reading,
    /// A write burst is in progress.
    Writing,
    /// The open row is being closed.
    Precharging,
}

/// One bank: state machine, open row, and precharge timer.
#[derive(Debug, Clone)]
pub struct Bank {
    /// Current FSM state.
    pub state: BankState,
    /// Row held in the row buffer, if any.
    pub open_row: Option<u64>,
    /// Cycle at which an in-progress precharge completes.
    pub timer: u64,
}

impl Default for Bank {
    fn default() -> Self {
        Self {
            state: BankState::Idle,
            open_row: None,
            timer: 0,
        }
    }
}

/// The banked DDR memory.
#[derive(Debug)]
pub struct DdrMemory {
    map: DdrMap,
    /// Per-bank state, indexed by bank number.
    pub banks: Vec<Bank>,
    completions: BTreeMap<(u64, u64), DdrCommand>,
    seq: u64,
    last_write: HashMap<u64, u64>,
    /// Commands dropped because they arrived in an incompatible bank state.
    pub dropped_commands: u64,
}

impl DdrMemory {
    /// Creates the memory for a validated DDR configuration.
    pub fn new(config: &DdrConfig) -> Self {
        Self {
            map: DdrMap::new(config.num_banks, config.row_stride),
            banks: vec![Bank::default(); config.num_banks],
            completions: BTreeMap::new(),
            seq: 0,
            last_write: HashMap::new(),
            dropped_commands: 0,
        }
    }

    /// Cycle at which the most recent write to `addr` completed, if any.
    ///
    /// This is the observable face of the data backing: requests carry no
    /// payload, so the stored "value" is the completion stamp.
    pub fn last_write_cycle(&self, addr: u64) -> Option<u64> {
        self.last_write.get(&addr).copied()
    }

    /// Accepts a scheduled command from the controller.
    pub fn request(&mut self, command: DdrCommand, now: u64) {
        let bank_idx = self.map.bank(command.addr);
        let row = self.map.row(command.addr);
        let bank = &mut self.banks[bank_idx];
        let accessing = match command.kind {
            AccessKind::Read => BankState::Reading,
            AccessKind::Write => BankState::Writing,
        };
        match bank.state {
            BankState::Idle => {
                bank.open_row = Some(row);
                bank.state = accessing;
            }
            BankState::RowActive | BankState::Reading | BankState::Writing => {
                if bank.open_row != Some(row) {
                    bank.open_row = Some(row);
                }
                bank.state = accessing;
            }
            BankState::Precharging => {
                error!(
                    cycle = now,
                    addr = command.addr,
                    bank = bank_idx,
                    state = ?bank.state,
                    "command in incompatible bank state, dropped"
                );
                self.dropped_commands += 1;
                debug_assert!(false, "DDR command while bank is precharging");
                return;
            }
        }
        trace!(
            cycle = now,
            addr = command.addr,
            bank = bank_idx,
            row,
            kind = ?command.kind,
            completion = command.completion_time,
            "ddr access start"
        );
        let _ = self
            .completions
            .insert((command.completion_time, self.seq), command);
        self.seq += 1;
    }

    /// Advances the DDR one cycle: retires due completions (the bank
    /// returns to row-active, the row stays open) and finishes elapsed
    /// precharges (the bank goes idle and the row closes).
    pub fn tick(&mut self, now: u64) {
        loop {
            let key = match self.completions.keys().next() {
                Some(&key) if key.0 <= now => key,
                _ => break,
            };
            let Some(command) = self.completions.remove(&key) else {
                break;
            };
            let bank_idx = self.map.bank(command.addr);
            let bank = &mut self.banks[bank_idx];
            debug_assert!(
                bank.open_row.is_some(),
                "bank completing an access must hold an open row"
            );
            if matches!(bank.state, BankState::Reading | BankState::Writing) {
                bank.state = BankState::RowActive;
            }
            if command.kind == AccessKind::Write {
                let _ = self.last_write.insert(command.addr, key.0);
            }
            trace!(cycle = now, addr = command.addr, bank = bank_idx, "ddr complete");
        }
        for (bank_idx, bank) in self.banks.iter_mut().enumerate() {
            if bank.state == BankState::Precharging && bank.timer <= now {
                bank.state = BankState::Idle;
                bank.open_row = None;
                trace!(cycle = now, bank = bank_idx, "precharge complete");
            }
        }
    }

    /// Asserts the per-bank invariant: a bank mid-access holds an open row.
    pub fn check_invariants(&self) {
        for bank in &self.banks {
            if matches!(bank.state, BankState::Reading | BankState::Writing) {
                assert!(bank.open_row.is_some(), "accessing bank without open row");
            }
        }
    }
}
