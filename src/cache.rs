use crate::address::{AddressLayout, AddressParts};
use crate::replacement_policies::ReplacementPolicy;

/// MESI coherence state of one cache line
///
/// A line in `Invalid` is empty: its tag is meaningless and it never takes part in tag comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoherenceState {
    #[default]
    Invalid,
    Exclusive,
    Modified,
    Shared,
}

impl CoherenceState {
    /// Single letter form used by the access log and the line dump
    pub fn letter(self) -> char {
        match self {
            CoherenceState::Invalid => 'I',
            CoherenceState::Exclusive => 'E',
            CoherenceState::Modified => 'M',
            CoherenceState::Shared => 'S',
        }
    }
}

/// One (set, way) slot: a tag and its coherence state. No data payload is modelled, eviction is
/// plain overwrite with nothing to write back
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheLine {
    pub tag: u32,
    pub state: CoherenceState,
}

/// What one coherence operation did, for the counters and the access log
///
/// `way` is `None` exactly when a snoop missed: snoops never allocate, so no way was involved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    pub hit: bool,
    pub way: Option<usize>,
    pub state: CoherenceState,
}

/// A set-associative cache holding tags and coherence states, parameterised by a replacement
/// policy
///
/// Lines are stored in one flat `Vec` indexed by `set * num_ways + way`; the geometry is fixed at
/// construction so no growth ever happens. The policy is only consulted by reads and writes, the
/// operations that can allocate, and only ever through `touch`/`victim`
///
/// Invariant: a set never holds two non-Invalid lines with the same tag. Lookups scan ways in
/// increasing order, so the invariant is what makes the scan order irrelevant
pub struct Cache<R: ReplacementPolicy> {
    layout: AddressLayout,
    lines: Vec<CacheLine>,
    policy: R,
    num_sets: usize,
    num_ways: usize,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(layout: AddressLayout, num_sets: usize, num_ways: usize, policy: R) -> Self {
        Self {
            layout,
            lines: vec![CacheLine::default(); num_sets * num_ways],
            policy,
            num_sets,
            num_ways,
        }
    }

    pub fn decompose(&self, address: u32) -> AddressParts {
        self.layout.decompose(address)
    }

    /// Finds the way holding `tag` in `set`, skipping Invalid lines. Returns `None` when the tag
    /// is not resident, including when the whole set is empty
    pub fn lookup(&self, tag: u32, set: usize) -> Option<usize> {
        let base = set * self.num_ways;
        self.lines[base..base + self.num_ways]
            .iter()
            .position(|line| line.state != CoherenceState::Invalid && line.tag == tag)
    }

    /// A processor read. Hits refresh recency and leave the state alone, whatever it is; misses
    /// evict the policy's victim and install the line as Exclusive
    pub fn read(&mut self, tag: u32, set: usize) -> AccessOutcome {
        match self.lookup(tag, set) {
            Some(way) => {
                self.policy.touch(set, way);
                AccessOutcome {
                    hit: true,
                    way: Some(way),
                    state: self.line(set, way).state,
                }
            }
            None => self.fill(tag, set, CoherenceState::Exclusive),
        }
    }

    /// A processor write. Hits refresh recency and move the line to Modified; misses evict the
    /// policy's victim and install the line as Modified
    pub fn write(&mut self, tag: u32, set: usize) -> AccessOutcome {
        match self.lookup(tag, set) {
            Some(way) => {
                self.policy.touch(set, way);
                self.line_mut(set, way).state = CoherenceState::Modified;
                AccessOutcome {
                    hit: true,
                    way: Some(way),
                    state: CoherenceState::Modified,
                }
            }
            None => self.fill(tag, set, CoherenceState::Modified),
        }
    }

    /// An observed transaction from another agent. On a hit the line is forced to `next` with no
    /// further conditions; misses are a no-op, snoops never allocate and never touch recency
    ///
    /// Forcing the state unconditionally is deliberate: a snooped read moves even a Modified line
    /// straight to Shared with no write-back signal, because there is no data to write back
    pub fn snoop(&mut self, tag: u32, set: usize, next: CoherenceState) -> AccessOutcome {
        match self.lookup(tag, set) {
            Some(way) => {
                self.line_mut(set, way).state = next;
                AccessOutcome {
                    hit: true,
                    way: Some(way),
                    state: next,
                }
            }
            None => AccessOutcome {
                hit: false,
                way: None,
                state: CoherenceState::Invalid,
            },
        }
    }

    /// Clears every line back to Invalid with a zero tag and resets the replacement policy.
    /// Statistics live with the dispatcher and are not affected
    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
        self.policy.reset();
    }

    /// Iterates all non-Invalid lines as `(set, way, line)`, in set then way order
    pub fn valid_lines(&self) -> impl Iterator<Item = (usize, usize, &CacheLine)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.state != CoherenceState::Invalid)
            .map(|(i, line)| (i / self.num_ways, i % self.num_ways, line))
    }

    pub fn line(&self, set: usize, way: usize) -> &CacheLine {
        &self.lines[set * self.num_ways + way]
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    pub fn num_ways(&self) -> usize {
        self.num_ways
    }

    fn line_mut(&mut self, set: usize, way: usize) -> &mut CacheLine {
        &mut self.lines[set * self.num_ways + way]
    }

    // Miss path shared by reads and writes: evict whatever the policy picks, overwrite, touch
    fn fill(&mut self, tag: u32, set: usize, state: CoherenceState) -> AccessOutcome {
        let way = self.policy.victim(set);
        *self.line_mut(set, way) = CacheLine { tag, state };
        self.policy.touch(set, way);
        AccessOutcome {
            hit: false,
            way: Some(way),
            state,
        }
    }
}
