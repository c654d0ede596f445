//! Trace-driven core front-end.
//!
//! A core replays a user-supplied trace: a mapping from issue cycle to
//! memory operation. Each tick it either retries a stalled operation or
//! looks up the current cycle in the trace, checks the incoming operation
//! against its in-flight accesses, and hands the operation to the
//! simulator for issue. A same-address operation of the opposite kind
//! stalls until the conflicting access drains; read-after-read does not
//! stall. While stalled, trace entries for the intervening cycles are not
//! issued.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::request::AccessKind;

/// Pending-access depth above which the core logs a warning.
const PENDING_WATERMARK: usize = 10;

/// One trace entry: what to issue and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TraceOp {
    /// Read or write.
    pub kind: AccessKind,
    /// Target byte address.
    pub addr: u64,
}

/// A core's instruction trace: issue cycle → operation. Cycles absent
/// from the map are idle.
pub type Trace = BTreeMap<u64, TraceOp>;

/// A trace-replaying CPU core.
#[derive(Debug)]
pub struct Core {
    core_id: usize,
    trace: Trace,
    pending: Vec<(AccessKind, u64)>,
    stall: Option<TraceOp>,
}

impl Core {
    /// Creates an idle core with an empty trace.
    pub fn new(core_id: usize) -> Self {
        Self {
            core_id,
            trace: Trace::new(),
            pending: Vec::new(),
            stall: None,
        }
    }

    /// This core's id.
    pub fn core_id(&self) -> usize {
        self.core_id
    }

    /// Installs the trace to replay, replacing any previous one.
    pub fn load_instr(&mut self, trace: Trace) {
        self.trace = trace;
    }

    /// Whether the core is holding back a hazard-stalled operation.
    pub fn is_stalled(&self) -> bool {
        self.stall.is_some()
    }

    /// Number of in-flight accesses.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// `op` conflicts with an in-flight access to the same address of the
    /// opposite kind.
    fn hazard(&self, op: TraceOp) -> bool {
        self.pending
            .iter()
            .any(|&(kind, addr)| addr == op.addr && kind != op.kind)
    }

    /// Advances the core one cycle, returning the operation to issue, if
    /// any. Reads are registered as pending before they are returned; the
    /// simulator calls [`Core::finish_read`] when the fill chain completes.
    pub fn tick(&mut self, now: u64) -> Option<TraceOp> {
        if let Some(op) = self.stall {
            if self.hazard(op) {
                return None;
            }
            debug!(cycle = now, core = self.core_id, addr = op.addr, "stall cleared");
            self.stall = None;
            return Some(self.issue(op));
        }
        let op = *self.trace.get(&now)?;
        if self.hazard(op) {
            debug!(cycle = now, core = self.core_id, addr = op.addr, "hazard stall");
            self.stall = Some(op);
            return None;
        }
        Some(self.issue(op))
    }

    fn issue(&mut self, op: TraceOp) -> TraceOp {
        if op.kind == AccessKind::Read {
            self.pending.push((AccessKind::Read, op.addr));
            if self.pending.len() > PENDING_WATERMARK {
                warn!(
                    core = self.core_id,
                    depth = self.pending.len(),
                    "pending accesses above watermark"
                );
            }
        }
        op
    }

    /// Retires the oldest in-flight read of `addr`; called when its fill
    /// chain completes.
    pub fn finish_read(&mut self, addr: u64) {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|&(kind, a)| kind == AccessKind::Read && a == addr)
        {
            let _ = self.pending.remove(pos);
        }
    }
}
