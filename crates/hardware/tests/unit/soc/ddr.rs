//! DDR Bank FSM Tests.
//!
//! Verifies the per-bank state machine: activation on command, return to
//! row-active on completion, precharge back to idle, the write stamp
//! store, and rejection of commands in incompatible states.

use memsim_core::common::request::{AccessKind, DdrCommand};
use memsim_core::config::DdrConfig;
use memsim_core::soc::memory::ddr::{BankState, DdrMemory};

fn ddr() -> DdrMemory {
    DdrMemory::new(&DdrConfig::default())
}

fn read_cmd(addr: u64, completion: u64) -> DdrCommand {
    DdrCommand {
        kind: AccessKind::Read,
        addr,
        completion_time: completion,
    }
}

fn write_cmd(addr: u64, completion: u64) -> DdrCommand {
    DdrCommand {
        kind: AccessKind::Write,
        addr,
        completion_time: completion,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Activation and completion
// ══════════════════════════════════════════════════════════

/// A command to an idle bank opens the row and starts the access; on
/// completion the bank parks at row-active with the row still open.
#[test]
fn idle_bank_activates_then_parks() {
    let mut mem = ddr();
    mem.request(read_cmd(0, 45), 0);

    assert_eq!(mem.banks[0].state, BankState::Reading);
    assert_eq!(mem.banks[0].open_row, Some(0));

    mem.tick(44);
    assert_eq!(mem.banks[0].state, BankState::Reading);

    mem.tick(45);
    assert_eq!(mem.banks[0].state, BankState::RowActive);
    assert_eq!(mem.banks[0].open_row, Some(0));
    mem.check_invariants();
}

/// A command for a different row on an active bank re-targets the row.
#[test]
fn row_switch_on_active_bank() {
    let mut mem = ddr();
    mem.request(read_cmd(0, 45), 0);
    mem.tick(45);
    assert_eq!(mem.banks[0].state, BankState::RowActive);

    // Row 125 on the same bank.
    mem.request(write_cmd(2000, 90), 46);
    assert_eq!(mem.banks[0].state, BankState::Writing);
    assert_eq!(mem.banks[0].open_row, Some(125));
}

/// Banks are independent: traffic on bank 0 leaves bank 1 idle.
#[test]
fn banks_are_independent() {
    let mut mem = ddr();
    mem.request(read_cmd(0, 45), 0);

    assert_eq!(mem.banks[1].state, BankState::Idle);
    assert_eq!(mem.banks[1].open_row, None);
}

// ══════════════════════════════════════════════════════════
// 2. Precharge
// ══════════════════════════════════════════════════════════

/// A precharging bank goes idle and closes its row once the timer elapses.
#[test]
fn precharge_elapses_to_idle() {
    let mut mem = ddr();
    mem.banks[0].state = BankState::Precharging;
    mem.banks[0].open_row = Some(7);
    mem.banks[0].timer = 20;

    mem.tick(19);
    assert_eq!(mem.banks[0].state, BankState::Precharging);

    mem.tick(20);
    assert_eq!(mem.banks[0].state, BankState::Idle);
    assert_eq!(mem.banks[0].open_row, None);
}

/// A command arriving while the bank precharges is an integrity bug: the
/// command is dropped and test builds assert.
#[test]
#[should_panic(expected = "precharging")]
fn command_while_precharging_asserts() {
    let mut mem = ddr();
    mem.banks[0].state = BankState::Precharging;
    mem.banks[0].open_row = Some(7);
    mem.banks[0].timer = 100;

    mem.request(read_cmd(0, 45), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Write stamps
// ══════════════════════════════════════════════════════════

/// The backing store records the completion cycle of the latest write.
#[test]
fn write_stamps_record_completion() {
    let mut mem = ddr();
    assert_eq!(mem.last_write_cycle(0), None);

    mem.request(write_cmd(0, 45), 0);
    mem.tick(44);
    assert_eq!(mem.last_write_cycle(0), None);

    mem.tick(45);
    assert_eq!(mem.last_write_cycle(0), Some(45));

    // A later write to the same address overwrites the stamp.
    mem.request(write_cmd(0, 90), 50);
    mem.tick(90);
    assert_eq!(mem.last_write_cycle(0), Some(90));
}

/// Reads leave the store untouched.
#[test]
fn reads_do_not_stamp() {
    let mut mem = ddr();
    mem.request(read_cmd(8, 45), 0);
    mem.tick(45);
    assert_eq!(mem.last_write_cycle(8), None);
}
