//! Cache Hierarchy Tests.
//!
//! Verifies routing across the private L1s and the shared L2: miss
//! forwarding with fill-continuation stacks, same-cycle L2 hits, write
//! absorption, and the write-back cascade L1 → L2 → memory.

use memsim_core::cache::CacheHierarchy;
use memsim_core::common::request::AccessKind;
use memsim_core::config::SimConfig;
use pretty_assertions::assert_eq;

use crate::common::harness::single_set_cache;

fn hierarchy() -> CacheHierarchy {
    CacheHierarchy::new(&SimConfig::default())
}

// ══════════════════════════════════════════════════════════
// 1. Read path
// ══════════════════════════════════════════════════════════

/// A double miss leaves one read request for memory, carrying the fill
/// stack; completing it fills both levels and wakes the issuing core.
#[test]
fn double_miss_roundtrip() {
    let mut caches = hierarchy();

    let mut issue = caches.read(0, 0, 0);
    assert!(!issue.completed);
    assert_eq!(issue.requests.len(), 1);
    let req = issue.requests.remove(0);
    assert_eq!(req.kind, AccessKind::Read);
    assert_eq!(req.addr, 0);
    assert_eq!(req.core_id, 0);

    let (core, addr, writebacks) = caches.complete(req, 50);
    assert_eq!((core, addr), (0, 0));
    assert!(writebacks.is_empty());

    // Both levels now hold the line.
    assert!(caches.l1(0).contains(0));
    assert!(caches.l2().contains(0));
    let reread = caches.read(0, 0, 51);
    assert!(reread.completed);
}

/// A second core reading the same line misses its private L1 but hits the
/// shared L2 and completes in the same cycle.
#[test]
fn shared_l2_hit_completes_synchronously() {
    let mut caches = hierarchy();

    let issue = caches.read(0, 0, 0);
    let req = issue.requests.into_iter().next().expect("miss request");
    let _ = caches.complete(req, 50);

    let issue = caches.read(1, 0, 60);
    assert!(issue.completed);
    assert!(issue.requests.is_empty());
    assert!(caches.l1(1).contains(0));

    assert_eq!(caches.l2().stats().hits, 1);
    assert_eq!(caches.l1(1).stats().misses, 1);
}

// ══════════════════════════════════════════════════════════
// 2. Write path
// ══════════════════════════════════════════════════════════

/// With write-back + write-allocate, a write is absorbed at the L1.
#[test]
fn write_absorbed_at_l1() {
    let mut caches = hierarchy();

    let requests = caches.write(0, 5, 0);
    assert!(requests.is_empty());
    assert!(caches.l1(0).is_dirty(5));
    assert_eq!(caches.l2().stats().accesses(), 0);
}

/// Overflowing an L1 set with dirty lines pushes the victim into the L2;
/// no memory traffic yet.
#[test]
fn l1_eviction_lands_in_l2() {
    let mut caches = hierarchy();

    // Nominal L1: addresses 0, 16, 32 conflict in set 0 (2 ways).
    assert!(caches.write(0, 0, 0).is_empty());
    assert!(caches.write(0, 16, 1).is_empty());
    assert!(caches.write(0, 32, 2).is_empty());

    assert!(!caches.l1(0).contains(0));
    assert!(caches.l2().is_dirty(0));
    assert_eq!(caches.l2().stats().misses, 1);
}

/// When the L2 in turn displaces a dirty line, the write-back finally
/// leaves for memory with no continuation attached.
#[test]
fn l2_eviction_reaches_memory() {
    let config = SimConfig {
        cores: 1,
        l1: single_set_cache(),
        l2: single_set_cache(),
        ..SimConfig::default()
    };
    let mut caches = CacheHierarchy::new(&config);

    // Fill the single L1 set dirty, then keep conflicting: each new write
    // cascades one victim into the single L2 set.
    assert!(caches.write(0, 0, 0).is_empty());
    assert!(caches.write(0, 4, 1).is_empty());
    assert!(caches.write(0, 8, 2).is_empty()); // L1 evicts 0 → L2
    assert!(caches.write(0, 12, 3).is_empty()); // L1 evicts 4 → L2

    // L1 evicts 8 → L2 must displace dirty 0 → memory write.
    let requests = caches.write(0, 16, 4);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, AccessKind::Write);
    assert_eq!(requests[0].addr, 0);

    caches.check_invariants();
}

/// A fill that displaces a dirty L1 victim writes it into the L2 during
/// completion.
#[test]
fn completion_routes_dirty_victim_into_l2() {
    let mut caches = hierarchy();

    // Dirty lines 0 and 16 fill L1 set 0.
    let _ = caches.write(0, 0, 0);
    let _ = caches.write(0, 16, 1);

    // Read of 32 conflicts; the miss travels to memory.
    let issue = caches.read(0, 32, 2);
    assert!(!issue.completed);
    let req = issue.requests.into_iter().next().expect("miss request");

    // On completion the L1 victim (addr 0) moves into the L2.
    let (_, _, writebacks) = caches.complete(req, 50);
    assert!(writebacks.is_empty());
    assert!(caches.l2().is_dirty(0));
    assert!(caches.l1(0).contains(32));
    caches.check_invariants();
}
