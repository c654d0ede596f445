//! A single set-associative cache level.
//!
//! Each level owns its sets, PLRU state, and hit/miss counters, and routes
//! writes according to its write-back / write-through and write-allocate /
//! no-write-allocate policies. The level itself is passive: lookups report
//! what happened and what must move to the level below; the hierarchy
//! routes the resulting traffic.

use tracing::trace;

use crate::cache::plru::PlruTree;
use crate::config::CacheConfig;
use crate::stats::CacheStats;

/// Valid/tag/dirty metadata for one cache line.
///
/// `tag` is meaningful only while `valid` is set; `dirty` implies `valid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheLine {
    /// The line holds data.
    pub valid: bool,
    /// Tag of the held line.
    pub tag: u64,
    /// The line has been written and not yet propagated downward.
    pub dirty: bool,
}

/// One set: `ways` lines plus the PLRU tree picking victims among them.
#[derive(Debug, Clone)]
struct CacheSet {
    lines: Vec<CacheLine>,
    plru: PlruTree,
}

/// Result of a read lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The line is resident; the access completed this cycle.
    Hit,
    /// Missed. The named victim slot is reserved for the incoming fill;
    /// the slot is not mutated until the fill actually runs.
    Miss {
        /// Set index of the reserved slot.
        set: usize,
        /// Victim way within the set.
        way: usize,
        /// Tag to install on fill.
        tag: u64,
    },
}

/// What the caller must do after a write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Absorbed at this level.
    Done,
    /// Write-through hit: the write must also go to the level below.
    Propagate,
    /// Write-allocate miss: the line was installed; if a dirty victim was
    /// displaced, its reconstructed address must be written below.
    Allocated {
        /// Address of the displaced dirty line, if any.
        writeback: Option<u64>,
    },
    /// No-write-allocate miss: forward the write below; nothing installed.
    Bypass,
}

/// An N-way set-associative cache level.
#[derive(Debug, Clone)]
pub struct CacheLevel {
    name: &'static str,
    owner: Option<usize>,
    line_bytes: u64,
    num_sets: usize,
    write_back: bool,
    write_allocate: bool,
    sets: Vec<CacheSet>,
    /// Accesses satisfied at this level.
    pub hits: u64,
    /// Accesses forwarded (or allocated) past this level.
    pub misses: u64,
}

impl CacheLevel {
    /// Builds a level from a validated configuration.
    ///
    /// `owner` is the core id for a private level, `None` for a shared one.
    pub fn new(name: &'static str, owner: Option<usize>, config: &CacheConfig) -> Self {
        let num_sets = config.num_sets();
        let set = CacheSet {
            lines: vec![CacheLine::default(); config.ways],
            plru: PlruTree::new(config.ways),
        };
        Self {
            name,
            owner,
            line_bytes: config.line_bytes as u64,
            num_sets,
            write_back: config.write_back,
            write_allocate: config.write_allocate,
            sets: vec![set; num_sets],
            hits: 0,
            misses: 0,
        }
    }

    /// Level name ("L1", "L2").
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Splits an address into `(set index, tag)`.
    #[inline]
    fn decompose(&self, addr: u64) -> (usize, u64) {
        let line = addr / self.line_bytes;
        let set = (line % self.num_sets as u64) as usize;
        let tag = line / self.num_sets as u64;
        (set, tag)
    }

    /// Reconstructs the base address of the line held as `(tag, set)`.
    #[inline]
    fn line_addr(&self, tag: u64, set: usize) -> u64 {
        (tag * self.num_sets as u64 + set as u64) * self.line_bytes
    }

    /// Scans a set for a valid line with the given tag.
    ///
    /// A tag present more than once is a corrupted set; that is an
    /// invariant violation and aborts.
    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        let mut found = None;
        for (way, line) in self.sets[set].lines.iter().enumerate() {
            if line.valid && line.tag == tag {
                assert!(
                    found.is_none(),
                    "{}: duplicate tag {:#x} in set {}",
                    self.name,
                    tag,
                    set
                );
                found = Some(way);
            }
        }
        found
    }

    /// Looks up a read.
    ///
    /// On hit the PLRU is refreshed and the access completes synchronously.
    /// On miss the PLRU's current victim is reserved (but untouched) and the
    /// caller forwards the request downward.
    pub fn read_access(&mut self, addr: u64, now: u64) -> ReadOutcome {
        let (set, tag) = self.decompose(addr);
        if let Some(way) = self.find(set, tag) {
            self.hits += 1;
            self.sets[set].plru.touch(way);
            trace!(cycle = now, level = self.name, core = ?self.owner, addr, "read hit");
            ReadOutcome::Hit
        } else {
            self.misses += 1;
            let way = self.sets[set].plru.victim();
            trace!(cycle = now, level = self.name, core = ?self.owner, addr, way, "read miss");
            ReadOutcome::Miss { set, way, tag }
        }
    }

    /// Looks up a write and applies the level's policies.
    pub fn write_access(&mut self, addr: u64, now: u64) -> WriteOutcome {
        let (set, tag) = self.decompose(addr);
        if let Some(way) = self.find(set, tag) {
            self.hits += 1;
            self.sets[set].lines[way].dirty = self.write_back;
            self.sets[set].plru.touch(way);
            trace!(cycle = now, level = self.name, core = ?self.owner, addr, "write hit");
            if self.write_back {
                WriteOutcome::Done
            } else {
                WriteOutcome::Propagate
            }
        } else {
            self.misses += 1;
            if self.write_allocate {
                let way = self.sets[set].plru.victim();
                let writeback = self.install(set, way, tag, self.write_back, now);
                trace!(
                    cycle = now,
                    level = self.name,
                    core = ?self.owner,
                    addr,
                    way,
                    "write miss, allocated"
                );
                WriteOutcome::Allocated { writeback }
            } else {
                trace!(cycle = now, level = self.name, core = ?self.owner, addr, "write miss, bypass");
                WriteOutcome::Bypass
            }
        }
    }

    /// Installs a fetched line into the slot reserved at miss time.
    ///
    /// The victim's dirty state is read here, at fill time, so a write-back
    /// is emitted for whatever the slot holds when the data arrives, so
    /// write-backs are neither lost nor duplicated. Returns the displaced
    /// dirty line's address.
    pub fn fill(&mut self, set: usize, way: usize, tag: u64, now: u64) -> Option<u64> {
        let writeback = self.install(set, way, tag, false, now);
        trace!(cycle = now, level = self.name, core = ?self.owner, set, way, tag, "fill");
        writeback
    }

    /// Replaces the line at `(set, way)`, returning the write-back address
    /// of the displaced line if it was valid and dirty in a write-back
    /// level. An invalid victim triggers no write-back.
    fn install(&mut self, set: usize, way: usize, tag: u64, dirty: bool, now: u64) -> Option<u64> {
        let old = self.sets[set].lines[way];
        debug_assert!(!old.dirty || old.valid, "dirty line must be valid");
        let writeback = if old.valid && old.dirty && self.write_back {
            let victim_addr = self.line_addr(old.tag, set);
            trace!(
                cycle = now,
                level = self.name,
                core = ?self.owner,
                addr = victim_addr,
                "dirty victim write-back"
            );
            Some(victim_addr)
        } else {
            None
        };
        self.sets[set].lines[way] = CacheLine {
            valid: true,
            tag,
            dirty,
        };
        self.sets[set].plru.touch(way);
        writeback
    }

    /// Snapshot of this level's counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Line size in bytes.
    pub fn line_bytes(&self) -> u64 {
        self.line_bytes
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Returns whether the line covering `addr` is resident.
    pub fn contains(&self, addr: u64) -> bool {
        let (set, tag) = self.decompose(addr);
        self.find(set, tag).is_some()
    }

    /// Returns whether the line covering `addr` is resident and dirty.
    pub fn is_dirty(&self, addr: u64) -> bool {
        let (set, tag) = self.decompose(addr);
        self.find(set, tag)
            .is_some_and(|way| self.sets[set].lines[way].dirty)
    }

    /// Asserts the structural invariants of every set: line count bounded
    /// by associativity, no duplicated valid tags, dirty implies valid.
    pub fn check_invariants(&self) {
        for (idx, set) in self.sets.iter().enumerate() {
            let mut seen = Vec::new();
            for line in &set.lines {
                assert!(!line.dirty || line.valid, "{}: dirty invalid line", self.name);
                if line.valid {
                    assert!(
                        !seen.contains(&line.tag),
                        "{}: duplicate tag {:#x} in set {}",
                        self.name,
                        line.tag,
                        idx
                    );
                    seen.push(line.tag);
                }
            }
        }
    }
}
