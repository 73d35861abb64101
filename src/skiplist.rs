use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Hard cap on node height; 16 levels comfortably index far more entries
/// than a book side ever holds.
pub const MAX_LEVEL: usize = 16;
/// Probability that a node's height grows by one more level.
pub const P: f64 = 0.5;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    /// Successor at each level this node participates in; the vector length
    /// is the node's height.
    forward: Vec<Option<usize>>,
}

/// An ordered map on a probabilistic skip structure.
///
/// Every entry is assigned a random height by repeated coin flips; taller
/// nodes form sparse express lanes over the sorted level-0 chain, giving
/// expected O(log n) insert and delete with no rebalancing. The level-0 head
/// pointer is a direct handle on the minimum entry, so peeking or popping
/// the front is O(1).
///
/// Nodes live in an index arena (`Vec<Option<Node>>` plus a free list)
/// rather than behind raw pointers; links are slot indices.
#[derive(Debug, Clone)]
pub struct SkipList<K, V> {
    /// Sentinel forwards, one per possible level.
    head: [Option<usize>; MAX_LEVEL],
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    /// Highest level currently in use.
    level: usize,
    len: usize,
    rng: SmallRng,
}

impl<K: Ord, V> SkipList<K, V> {
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_rng(&mut rand::rng()))
    }

    /// A list with deterministic level assignment, for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            head: [None; MAX_LEVEL],
            nodes: Vec::new(),
            free: Vec::new(),
            level: 0,
            len: 0,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts an entry at its sorted position. Expected O(log n).
    ///
    /// Equal keys are not rejected; the new entry lands before the existing
    /// run. Callers that need uniqueness must guarantee it in the key.
    pub fn insert(&mut self, key: K, value: V) {
        let update = self.search_path(&key);
        let height = self.random_height();
        if height > self.level {
            self.level = height;
        }
        let mut forward = Vec::with_capacity(height);
        for lvl in 0..height {
            forward.push(self.forward(update[lvl], lvl));
        }
        let idx = self.alloc(Node {
            key,
            value,
            forward,
        });
        for lvl in 0..height {
            self.set_forward(update[lvl], lvl, Some(idx));
        }
        self.len += 1;
    }

    /// Removes the entry with `key` and returns its value. A missing key is
    /// not an error; it returns `None` and leaves the list untouched.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let update = self.search_path(key);
        let target = self.forward(update[0], 0)?;
        if self.node(target).key != *key {
            return None;
        }
        for lvl in 0..self.level {
            if self.forward(update[lvl], lvl) != Some(target) {
                break;
            }
            let next = self.node(target).forward[lvl];
            self.set_forward(update[lvl], lvl, next);
        }
        self.shrink_level();
        self.len -= 1;
        Some(self.dealloc(target).value)
    }

    /// The entry with the smallest key, without removing it. O(1).
    pub fn front(&self) -> Option<(&K, &V)> {
        let idx = self.head[0]?;
        let node = self.node(idx);
        Some((&node.key, &node.value))
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let idx = self.head[0]?;
        let height = self.node(idx).forward.len();
        // the minimum node is the head's direct successor at every level it
        // occupies
        for lvl in 0..height {
            debug_assert_eq!(self.head[lvl], Some(idx));
            let next = self.node(idx).forward[lvl];
            self.head[lvl] = next;
        }
        self.shrink_level();
        self.len -= 1;
        let node = self.dealloc(idx);
        Some((node.key, node.value))
    }

    /// Iterates entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head[0],
        }
    }

    /// Walks from the top level down, recording the last node strictly
    /// before `key` at every level. `None` entries stand for the head
    /// sentinel; levels above the current one stay at the sentinel, which is
    /// exactly what a level raise needs.
    fn search_path(&self, key: &K) -> [Option<usize>; MAX_LEVEL] {
        let mut update = [None; MAX_LEVEL];
        let mut at: Option<usize> = None;
        for lvl in (0..self.level).rev() {
            while let Some(next) = self.forward(at, lvl) {
                if self.node(next).key < *key {
                    at = Some(next);
                } else {
                    break;
                }
            }
            update[lvl] = at;
        }
        update
    }

    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_LEVEL && self.rng.random_bool(P) {
            height += 1;
        }
        height
    }

    fn shrink_level(&mut self) {
        while self.level > 1 && self.head[self.level - 1].is_none() {
            self.level -= 1;
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        self.nodes[idx].as_ref().expect("skip list slot is live")
    }

    fn forward(&self, at: Option<usize>, level: usize) -> Option<usize> {
        match at {
            None => self.head[level],
            Some(idx) => self.node(idx).forward[level],
        }
    }

    fn set_forward(&mut self, at: Option<usize>, level: usize, to: Option<usize>) {
        match at {
            None => self.head[level] = to,
            Some(idx) => {
                let node = self.nodes[idx].as_mut().expect("skip list slot is live");
                node.forward[level] = to;
            }
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn dealloc(&mut self, idx: usize) -> Node<K, V> {
        let node = self.nodes[idx].take().expect("skip list slot is live");
        self.free.push(idx);
        node
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ascending-order iterator over `(&K, &V)` pairs.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    list: &'a SkipList<K, V>,
    next: Option<usize>,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = self.list.node(idx);
        self.next = node.forward[0];
        Some((&node.key, &node.value))
    }
}
