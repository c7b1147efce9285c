use crate::{Float, ONE_MINUS_EPSILON};

/// Discrete probability distribution stored as a cumulative table.
///
/// Entries are appended with arbitrary non-negative weights, then the table is normalized once
/// before sampling. `cdf[0]` is always zero and `cdf[len]` is one after normalization.
#[derive(Clone, Debug)]
pub struct DiscretePdf {
    cdf: Vec<Float>,
    sum: Float,
    normalization: Float,
    normalized: bool,
}

impl Default for DiscretePdf {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl DiscretePdf {
    pub fn with_capacity(n_entries: usize) -> Self {
        let mut cdf = Vec::with_capacity(n_entries + 1);
        cdf.push(0.0);
        Self { cdf, sum: 0.0, normalization: 0.0, normalized: false }
    }

    pub fn from_weights(weights: &[Float]) -> Self {
        let mut pdf = Self::with_capacity(weights.len());
        weights.iter().for_each(|&w| pdf.append(w));
        pdf.normalize();
        pdf
    }

    pub fn clear(&mut self) {
        self.cdf.clear();
        self.cdf.push(0.0);
        self.normalized = false;
    }

    pub fn append(&mut self, weight: Float) {
        debug_assert!(!self.normalized, "cannot append to a normalized distribution");
        debug_assert!(weight >= 0.0);
        let last = self.cdf[self.cdf.len() - 1];
        self.cdf.push(last + weight);
    }

    pub fn len(&self) -> usize {
        self.cdf.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probability mass (or raw weight, before normalization) of entry `index`.
    pub fn get(&self, index: usize) -> Float {
        self.cdf[index + 1] - self.cdf[index]
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Sum of the weights before normalization.
    pub fn sum(&self) -> Float {
        self.sum
    }

    /// `1 / sum`, or zero if every weight was zero.
    pub fn normalization(&self) -> Float {
        self.normalization
    }

    /// Rescales the table so the last entry is exactly one and returns the original sum.
    /// Calling this again is a no-op: the recorded sum would otherwise be overwritten by one.
    pub fn normalize(&mut self) -> Float {
        if self.normalized {
            return self.sum;
        }
        self.sum = self.cdf[self.cdf.len() - 1];
        if self.sum > 0.0 {
            self.normalization = 1.0 / self.sum;
            for c in self.cdf.iter_mut().skip(1) {
                *c *= self.normalization;
            }
            let last = self.cdf.len() - 1;
            self.cdf[last] = 1.0;
        } else {
            self.normalization = 0.0;
        }
        self.normalized = true;
        self.sum
    }

    /// Index of the entry whose cdf interval contains `u`. The distribution must be normalized
    /// and non-empty.
    pub fn sample(&self, u: Float) -> usize {
        debug_assert!(self.normalized);
        debug_assert!(!self.is_empty());
        let pos = self.cdf.partition_point(|&c| c < u);
        pos.saturating_sub(1).min(self.len() - 1)
    }

    /// Like `sample`, but also returns `u` rescaled to `[0, 1)` within the chosen interval so
    /// the same random number can drive a second decision.
    pub fn sample_reuse(&self, u: Float) -> (usize, Float) {
        let index = self.sample(u);
        let lo = self.cdf[index];
        let width = self.cdf[index + 1] - lo;
        let remapped = if width > 0.0 {
            ((u - lo) / width).max(0.0).min(ONE_MINUS_EPSILON)
        } else {
            0.0
        };
        (index, remapped)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sampler::random::RandomSampler;
    use crate::sampler::Sampler;
    use approx::assert_abs_diff_eq;

    fn ks_statistic(mut samples: Vec<Float>) -> Float {
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = samples.len() as Float;
        samples.iter().enumerate().fold(0.0, |d: Float, (i, &x)| {
            let lo = (x - i as Float / n).abs();
            let hi = ((i + 1) as Float / n - x).abs();
            d.max(lo).max(hi)
        })
    }

    #[test]
    fn normalize_is_guarded() {
        let mut pdf = DiscretePdf::with_capacity(3);
        pdf.append(1.0);
        pdf.append(3.0);
        assert_eq!(pdf.normalize(), 4.0);
        assert_eq!(pdf.normalize(), 4.0);
        assert_abs_diff_eq!(pdf.normalization(), 0.25);
        assert_abs_diff_eq!(pdf.get(0), 0.25);
        assert_abs_diff_eq!(pdf.get(1), 0.75);
    }

    #[test]
    fn all_zero_weights() {
        let pdf = DiscretePdf::from_weights(&[0.0, 0.0]);
        assert_eq!(pdf.sum(), 0.0);
        assert_eq!(pdf.normalization(), 0.0);
        assert!(pdf.sample(0.5) < 2);
    }

    #[test]
    #[should_panic]
    fn sampling_empty_distribution_panics() {
        DiscretePdf::from_weights(&[]).sample(0.5);
    }

    #[test]
    fn boundaries_clamp_to_valid_range() {
        let pdf = DiscretePdf::from_weights(&[1.0, 0.0, 1.0]);
        assert_eq!(pdf.sample(0.0), 0);
        assert_eq!(pdf.sample(0.25), 0);
        assert_eq!(pdf.sample(0.75), 2);
        assert_eq!(pdf.sample(ONE_MINUS_EPSILON), 2);
    }

    #[test]
    fn sampling_reproduces_masses() {
        let weights = [1.0, 2.0, 0.5, 4.0, 2.5];
        let pdf = DiscretePdf::from_weights(&weights);
        let mut sampler = RandomSampler::new_with_seed(1, 42);
        let n = 100_000;
        let mut counts = [0usize; 5];
        for _ in 0..n {
            counts[pdf.sample(sampler.get_1d())] += 1;
        }
        for (i, &w) in weights.iter().enumerate() {
            assert_abs_diff_eq!(counts[i] as Float / n as Float, w / 10.0, epsilon = 0.01);
        }
    }

    #[test]
    fn reused_sample_is_uniform_per_entry() {
        let pdf = DiscretePdf::from_weights(&[0.3, 1.7, 1.0]);
        let mut sampler = RandomSampler::new_with_seed(1, 5);
        let mut per_entry = vec![Vec::new(), Vec::new(), Vec::new()];
        for _ in 0..30_000 {
            let (i, u) = pdf.sample_reuse(sampler.get_1d());
            assert!(u >= 0.0 && u < 1.0);
            per_entry[i].push(u);
        }
        for samples in per_entry {
            let n = samples.len() as Float;
            // 0.1% critical value of the one-sample Kolmogorov-Smirnov statistic
            let critical = 1.95 / n.sqrt();
            assert!(ks_statistic(samples) < critical);
        }
    }
}
