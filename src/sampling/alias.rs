use crate::{Float, ONE_MINUS_EPSILON};

#[derive(Clone, Copy, Debug, PartialEq)]
struct AliasEntry {
    /// Probability of keeping the slot's own index rather than jumping to `alias`.
    prob: Float,
    alias: u32,
}

/// Walker's alias method: O(n) construction, O(1) sampling of a discrete distribution.
///
/// Every slot carries the mass of at most two original entries, its own and its alias.
#[derive(Clone, Debug)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    sum: Float,
}

impl AliasTable {
    pub fn new(weights: &[Float]) -> Self {
        let k = weights.len();
        let sum: Float = weights.iter().sum();
        let mut entries: Vec<AliasEntry> = (0..k)
            .map(|i| AliasEntry { prob: 1.0, alias: i as u32 })
            .collect();

        if sum <= 0.0 {
            // all-zero weights degrade to a uniform table
            return Self { entries, sum };
        }

        let scale = k as Float / sum;
        let mut scaled: Vec<Float> = weights.iter().map(|w| w * scale).collect();

        let mut short = Vec::with_capacity(k);
        let mut long = Vec::with_capacity(k);
        for (i, &p) in scaled.iter().enumerate() {
            if p < 1.0 { short.push(i) } else { long.push(i) }
        }

        while let (Some(s), Some(l)) = (short.pop(), long.pop()) {
            entries[s] = AliasEntry { prob: scaled[s], alias: l as u32 };
            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                short.push(l);
            } else {
                long.push(l);
            }
        }

        // Whatever is left over is one up to rounding error.
        for i in short.into_iter().chain(long) {
            entries[i] = AliasEntry { prob: 1.0, alias: i as u32 };
        }

        Self { entries, sum }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the weights the table was built from.
    pub fn sum(&self) -> Float {
        self.sum
    }

    pub fn sample(&self, u: Float) -> usize {
        self.sample_reuse(u).0
    }

    /// Samples an index and returns the unused part of `u` rescaled to `[0, 1)`. The table must
    /// not be empty.
    pub fn sample_reuse(&self, u: Float) -> (usize, Float) {
        debug_assert!(!self.is_empty());
        let k = self.entries.len();
        let scaled = u * k as Float;
        let slot = (scaled as usize).min(k - 1);
        let u_slot = (scaled - slot as Float).max(0.0).min(ONE_MINUS_EPSILON);
        let entry = self.entries[slot];

        if u_slot < entry.prob {
            (slot, (u_slot / entry.prob).min(ONE_MINUS_EPSILON))
        } else {
            let remapped = (u_slot - entry.prob) / (1.0 - entry.prob);
            (entry.alias as usize, remapped.max(0.0).min(ONE_MINUS_EPSILON))
        }
    }

    /// Probability of `index`, reassembled from every slot that can produce it.
    pub fn pmf(&self, index: usize) -> Float {
        let k = self.entries.len() as Float;
        self.entries.iter().enumerate().map(|(slot, e)| {
            let own = if slot == index { e.prob } else { 0.0 };
            let aliased = if e.alias as usize == index && slot != index { 1.0 - e.prob } else { 0.0 };
            own + aliased
        }).sum::<Float>() / k
    }
}
