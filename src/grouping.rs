use ahash::RandomState;
use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hash, Hasher};

/// Routes intermediate keys to reduce partitions. Seeded with fixed constants
/// so the same key lands in the same partition on every run.
pub struct KeyPartitioner {
    state: RandomState,
    partitions: usize,
}

impl KeyPartitioner {
    pub fn new(partitions: usize) -> Self {
        // Deterministic random state for stable routing
        let state = RandomState::with_seeds(
            0x517c_c1b7_2722_0a95,
            0x6a09_e667_f3bc_c908,
            0xbb67_ae85_84ca_a73b,
            0x3c6e_f372_fe94_f82b,
        );
        Self { state, partitions: partitions.max(1) }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    #[inline]
    pub fn partition(&self, key: &str) -> usize {
        let mut h = self.state.build_hasher();
        key.hash(&mut h);
        (h.finish() as usize) % self.partitions
    }
}

/// The keys routed to one reduce partition, grouped. Keys iterate in sorted
/// order; values within a key keep arrival order.
pub struct ReducePartition<V> {
    pub index: usize,
    pub groups: BTreeMap<String, Vec<V>>,
}

impl<V> ReducePartition<V> {
    /// Total values across all groups in this partition.
    pub fn value_count(&self) -> u64 {
        self.groups.values().map(|v| v.len() as u64).sum()
    }
}

/// In-memory shuffle: collects every (key, value) pair the map phase emitted
/// and groups values by key, with each key owned by exactly one partition.
/// Feeding order defines arrival order within a key, so callers fold map
/// outputs in split order.
pub struct Shuffle<V> {
    partitioner: KeyPartitioner,
    parts: Vec<BTreeMap<String, Vec<V>>>,
    values_in: u64,
}

impl<V> Shuffle<V> {
    pub fn new(partitions: usize) -> Self {
        let partitioner = KeyPartitioner::new(partitions);
        let parts = (0..partitioner.partitions()).map(|_| BTreeMap::new()).collect();
        Self { partitioner, parts, values_in: 0 }
    }

    pub fn insert(&mut self, key: String, value: V) {
        let idx = self.partitioner.partition(&key);
        self.parts[idx].entry(key).or_default().push(value);
        self.values_in += 1;
    }

    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (String, V)>) {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }

    /// Total values fed in so far.
    pub fn values_in(&self) -> u64 {
        self.values_in
    }

    pub fn into_partitions(self) -> Vec<ReducePartition<V>> {
        self.parts
            .into_iter()
            .enumerate()
            .map(|(index, groups)| ReducePartition { index, groups })
            .collect()
    }
}
