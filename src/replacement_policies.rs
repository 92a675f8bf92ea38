/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// All methods address ways within a single set; policies keep whatever per-set metadata they need
pub trait ReplacementPolicy {
    /// Updates the policy when a way of a set is accessed, on hits and on fills alike
    ///
    /// # Arguments
    ///
    /// * `set`: The set that was accessed
    /// * `way`: The way within that set
    ///
    /// returns: ()
    fn touch(&mut self, set: usize, way: usize);

    /// Picks the way to evict from a set. A pure read: repeated calls without an intervening
    /// `touch` must return the same way
    ///
    /// # Arguments
    ///
    /// * `set`: The set needing a victim
    ///
    /// returns: usize
    fn victim(&self, set: usize) -> usize;

    /// Clears all recency metadata back to its initial value, for every set
    fn reset(&mut self);
}

/// Tree-based pseudo-LRU
///
/// Each set owns `ways - 1` decision bits forming an implicit complete binary tree with one leaf
/// per way. Victim selection walks from the root following each bit (0 descends left, 1 right)
/// until it reaches a leaf. Touching a way walks from its leaf to the root, pointing every
/// ancestor's bit away from the subtree it came from
///
/// True LRU needs O(ways) metadata and O(ways) updates per set; the tree gives O(log ways) for
/// both, matches true LRU exactly at 2 ways, and approximates it above that
///
/// The bits for one set are packed into a single u64 word indexed by tree node, so the whole
/// structure is a flat `Vec<u64>` with no node objects. This caps the associativity at 64, far
/// beyond anything this simulator is configured with
pub struct TreePlru {
    nodes: Vec<u64>,
    ways: usize,
}

impl TreePlru {
    pub fn new(num_sets: usize, num_ways: usize) -> Self {
        debug_assert!(num_ways.is_power_of_two() && num_ways <= 64);
        Self {
            nodes: vec![0; num_sets],
            ways: num_ways,
        }
    }
}

impl ReplacementPolicy for TreePlru {
    fn touch(&mut self, set: usize, way: usize) {
        let bits = &mut self.nodes[set];
        // Leaves occupy nodes [ways - 1, 2 * ways - 1); walk up to the root
        let mut node = way + self.ways - 1;
        while node > 0 {
            let parent = (node - 1) / 2;
            if node == 2 * parent + 1 {
                // Came from the left child, bias the parent right
                *bits |= 1 << parent;
            } else {
                *bits &= !(1 << parent);
            }
            node = parent;
        }
    }

    fn victim(&self, set: usize) -> usize {
        let bits = self.nodes[set];
        let mut node = 0;
        while node < self.ways - 1 {
            node = 2 * node + 1 + ((bits >> node) & 1) as usize;
        }
        node - (self.ways - 1)
    }

    fn reset(&mut self) {
        self.nodes.fill(0);
    }
}
