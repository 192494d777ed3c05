use rand::Rng;

/// Deterministic shuffle source for the random sort order.
///
/// Wraps a small 32-bit mixing generator (mulberry32) whose output stream is
/// fully determined by the seed, so a shuffled view can be rebuilt later from
/// the seed alone. The generators shipped with [`rand`] do not promise a
/// stable stream across crate versions, which would silently reorder saved
/// views on upgrade.
pub struct ShuffleRng {
    state: u32,
}

impl ShuffleRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    // uniform in 0..bound without modulo bias
    fn next_index(&mut self, bound: usize) -> usize {
        ((u64::from(self.next_u32()) * bound as u64) >> 32) as usize
    }

    /// Fisher-Yates shuffle, walking from the highest index down.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

/// Picks a random seed for a brand-new shuffled view.
pub fn fresh_seed() -> u32 {
    rand::rng().random()
}

/// Derives the follow-up seed used when an already shuffled view is
/// reshuffled, advancing the generator by one step so repeated reshuffles
/// walk distinct orderings.
pub fn advance_seed(seed: u32) -> u32 {
    ShuffleRng::new(seed).next_u32()
}
