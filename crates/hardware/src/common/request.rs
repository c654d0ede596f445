//! Memory requests and their completion continuations.
//!
//! Requests are plain data, uniquely owned by whichever queue currently
//! holds them. Instead of closures, a read request carries an explicit
//! stack of [`FillSlot`] continuations: the victim slots reserved on its
//! way down the hierarchy. When the controller reports completion the
//! stack unwinds top-down (shared level first), each slot is filled
//! exactly once, and the issuing core is woken. Write requests (both
//! trace writes that bypass allocation and victim write-backs) carry an
//! empty stack and complete silently.

use serde::Deserialize;

/// Direction of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    /// A load; always carries a completion continuation.
    Read,
    /// A store; fire-and-forget once issued.
    Write,
}

/// Identifies a cache level inside the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The private L1 of the given core.
    L1(usize),
    /// The shared L2.
    L2,
}

/// A victim slot reserved at miss time, awaiting lower-level data.
///
/// The slot is not mutated until the fill runs; the victim's dirty state
/// is re-read at fill time so a line dirtied in the interim is still
/// written back.
#[derive(Debug, Clone, Copy)]
pub struct FillSlot {
    /// Which cache level reserved the slot.
    pub level: Level,
    /// Set index within that level.
    pub set: usize,
    /// Victim way within the set.
    pub way: usize,
    /// Tag to install when the data arrives.
    pub tag: u64,
}

/// A memory request in flight between the caches and the DDR.
#[derive(Debug)]
pub struct MemoryRequest {
    /// Core that caused the request (for write-backs, the evicting core).
    pub core_id: usize,
    /// Cycle the request was created.
    pub issue_time: u64,
    /// Read or write.
    pub kind: AccessKind,
    /// Target byte address.
    pub addr: u64,
    /// Completion cycle, set by the controller when the request is scheduled.
    pub completion_time: Option<u64>,
    /// Reserved fill slots, innermost level first; empty for writes.
    pub(crate) fills: Vec<FillSlot>,
}

impl MemoryRequest {
    /// Creates a read request carrying the given fill continuations.
    pub fn read(core_id: usize, issue_time: u64, addr: u64, fills: Vec<FillSlot>) -> Self {
        Self {
            core_id,
            issue_time,
            kind: AccessKind::Read,
            addr,
            completion_time: None,
            fills,
        }
    }

    /// Creates a callback-free write request.
    pub fn write(core_id: usize, issue_time: u64, addr: u64) -> Self {
        Self {
            core_id,
            issue_time,
            kind: AccessKind::Write,
            addr,
            completion_time: None,
            fills: Vec::new(),
        }
    }
}

/// The command the controller hands the DDR when it schedules a request.
///
/// The request itself stays with the controller (which fires completions);
/// the DDR only needs the fields that drive its bank state machines.
#[derive(Debug, Clone, Copy)]
pub struct DdrCommand {
    /// Read or write.
    pub kind: AccessKind,
    /// Target byte address.
    pub addr: u64,
    /// Cycle at which the access completes.
    pub completion_time: u64,
}
