//! PLRU Tree Tests.
//!
//! Verifies the direction-bit tree: `touch(way)` flips the bits along the
//! root-to-leaf path away from the touched way, and `victim()` follows the
//! bits down to a leaf. The key property is that the just-touched way is
//! never the next victim (for two or more ways).

use memsim_core::cache::PlruTree;
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Basic walks
// ══════════════════════════════════════════════════════════

/// All bits start at zero, so the leftmost leaf is the first victim.
#[test]
fn initial_victim_is_way_zero() {
    let tree = PlruTree::new(4);
    assert_eq!(tree.victim(), 0);
}

/// Two ways: one bit that toggles away from each touch.
#[test]
fn two_way_toggle() {
    let mut tree = PlruTree::new(2);
    assert_eq!(tree.victim(), 0);

    tree.touch(0);
    assert_eq!(tree.victim(), 1);

    tree.touch(1);
    assert_eq!(tree.victim(), 0);
}

/// Four ways: victims alternate between the subtree halves, so a fill
/// sequence that always installs at the current victim walks 0, 2, 1, 3.
#[test]
fn four_way_fill_walk() {
    let mut tree = PlruTree::new(4);

    assert_eq!(tree.victim(), 0);
    tree.touch(0);
    // Root now points right, right subtree points left.
    assert_eq!(tree.victim(), 2);
    tree.touch(2);
    assert_eq!(tree.victim(), 1);
    tree.touch(1);
    assert_eq!(tree.victim(), 3);
    tree.touch(3);
    // Every leaf touched once; the walk wraps back to the start.
    assert_eq!(tree.victim(), 0);
}

/// A single way has no bits; way 0 is always the victim.
#[test]
fn one_way_degenerates() {
    let mut tree = PlruTree::new(1);
    assert_eq!(tree.victim(), 0);
    tree.touch(0);
    assert_eq!(tree.victim(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Protection property
// ══════════════════════════════════════════════════════════

/// The just-touched way is never the next victim.
#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
#[case(16)]
fn touched_way_is_not_victim(#[case] ways: usize) {
    let mut tree = PlruTree::new(ways);
    for way in 0..ways {
        tree.touch(way);
        assert_ne!(tree.victim(), way, "victim returned the touched way");
    }
}

proptest! {
    /// Under any access sequence the victim stays in range and never
    /// equals the most recently touched way.
    #[test]
    fn victim_in_range_and_protected(
        ways_log2 in 1u32..5,
        accesses in proptest::collection::vec(0usize..16, 1..64),
    ) {
        let ways = 1usize << ways_log2;
        let mut tree = PlruTree::new(ways);
        for raw in accesses {
            let way = raw % ways;
            tree.touch(way);
            let victim = tree.victim();
            prop_assert!(victim < ways);
            prop_assert_ne!(victim, way);
        }
    }
}
