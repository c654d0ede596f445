//! Interconnect fabric between the shared L2 and the DDR controller.
//!
//! A delay queue with bounded drain rate: each request becomes ready
//! `delay` cycles after enqueue, plus a jitter of 0–2 cycles drawn from
//! the injected generator, and at most `bandwidth` ready requests are
//! forwarded per cycle. Among requests ready in the same cycle, forwarding
//! order is insertion order: an insertion counter breaks heap ties so
//! traces reproduce exactly for a fixed seed.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::trace;

use crate::common::request::MemoryRequest;
use crate::common::rng::XorShiftRng;
use crate::config::InterconnectConfig;

/// A queued request, ordered by `(ready_time, insertion seq)`.
#[derive(Debug)]
struct Enqueued {
    ready: u64,
    seq: u64,
    req: MemoryRequest,
}

impl PartialEq for Enqueued {
    fn eq(&self, other: &Self) -> bool {
        self.ready == other.ready && self.seq == other.seq
    }
}

impl Eq for Enqueued {}

impl PartialOrd for Enqueued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Enqueued {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.ready, self.seq).cmp(&(other.ready, other.seq))
    }
}

/// The bounded-bandwidth delay queue.
#[derive(Debug)]
pub struct Interconnect {
    delay: u64,
    bandwidth: usize,
    queue: BinaryHeap<Reverse<Enqueued>>,
    seq: u64,
    rng: XorShiftRng,
}

impl Interconnect {
    /// Creates the fabric with the given configuration and the simulator's
    /// jitter generator.
    pub fn new(config: &InterconnectConfig, rng: XorShiftRng) -> Self {
        Self {
            delay: config.delay,
            bandwidth: config.bandwidth,
            queue: BinaryHeap::new(),
            seq: 0,
            rng,
        }
    }

    /// Accepts a request, scheduling it to surface after the base delay
    /// plus jitter.
    pub fn request(&mut self, req: MemoryRequest, now: u64) {
        let ready = now + self.delay + self.rng.next_below(3);
        trace!(
            cycle = now,
            addr = req.addr,
            kind = ?req.kind,
            ready,
            "interconnect enqueue"
        );
        self.queue.push(Reverse(Enqueued {
            ready,
            seq: self.seq,
            req,
        }));
        self.seq += 1;
    }

    /// Forwards up to `bandwidth` ready requests, oldest ready time first.
    pub fn tick(&mut self, now: u64) -> Vec<MemoryRequest> {
        let mut forwarded = Vec::new();
        while forwarded.len() < self.bandwidth {
            let ready = matches!(self.queue.peek(), Some(Reverse(e)) if e.ready <= now);
            if !ready {
                break;
            }
            if let Some(Reverse(entry)) = self.queue.pop() {
                trace!(cycle = now, addr = entry.req.addr, "interconnect forward");
                forwarded.push(entry.req);
            }
        }
        forwarded
    }

    /// Number of requests currently queued.
    pub fn depth(&self) -> usize {
        self.queue.len()
    }
}
