//! Comparison of a rendered image against a converged reference.

use crate::error::RenderError;
use crate::spectrum::Spectrum;
use crate::Float;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelStats {
    pub mean_deviation: Float,
    pub variance: Float,
    pub std_dev: Float,
}

/// Histogram of per-channel deviations `reference - image`.
///
/// Deviations are cut into bins of width `1 / cuts`. With signed deviations there are `2·cuts + 1`
/// bins centred on zero; with absolute deviations there are `cuts + 1` bins starting at zero.
/// Deviations beyond one land in the outermost bins.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviationHistogram {
    pub cuts: usize,
    pub absolute: bool,
    pub counts: [Vec<usize>; 3],
}

impl DeviationHistogram {
    pub fn new(cuts: usize, absolute: bool) -> Self {
        let bins = if absolute { cuts + 1 } else { 2 * cuts + 1 };
        Self { cuts, absolute, counts: [vec![0; bins], vec![0; bins], vec![0; bins]] }
    }

    pub fn bin_width(&self) -> Float {
        1.0 / self.cuts as Float
    }

    pub fn bin_index(&self, delta: Float) -> usize {
        let magnitude = delta.abs();
        let i = if magnitude == 0.0 {
            0
        } else {
            ((magnitude / self.bin_width()).ceil() as usize).min(self.cuts)
        };
        if self.absolute {
            i
        } else if delta > 0.0 {
            self.cuts + i
        } else {
            self.cuts - i
        }
    }

    /// Deviation at the centre of bin `index`.
    pub fn bin_value(&self, index: usize) -> Float {
        if self.absolute {
            index as Float * self.bin_width()
        } else {
            (index as Float - self.cuts as Float) * self.bin_width()
        }
    }

    fn add(&mut self, channel: usize, delta: Float) {
        let index = self.bin_index(delta);
        self.counts[channel][index] += 1;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarianceReport {
    pub channels: [ChannelStats; 3],
    pub histogram: DeviationHistogram,
}

/// Per-channel deviation statistics of `image` against `reference`, pixel by pixel.
pub fn evaluate(image: &[Spectrum], reference: &[Spectrum], cuts: usize, absolute: bool) -> Result<VarianceReport, RenderError> {
    if image.len() != reference.len() {
        return Err(RenderError::InvalidConfig(format!(
            "reference has {} pixels but the image has {}",
            reference.len(),
            image.len()
        )));
    }
    if image.is_empty() || cuts == 0 {
        return Err(RenderError::InvalidConfig("variance needs pixels and at least one histogram cut".to_string()));
    }

    let mut histogram = DeviationHistogram::new(cuts, absolute);
    let mut sum = [0.0f64; 3];
    let mut sum_sq = [0.0f64; 3];
    for (new, reference) in image.iter().zip(reference) {
        for c in 0..3 {
            let mut delta = reference[c] - new[c];
            if absolute {
                delta = delta.abs();
            }
            histogram.add(c, delta);
            sum[c] += delta as f64;
            sum_sq[c] += (delta as f64) * (delta as f64);
        }
    }

    let n = image.len() as f64;
    let mut channels = [ChannelStats::default(); 3];
    for c in 0..3 {
        let variance = sum_sq[c] / n;
        channels[c] = ChannelStats {
            mean_deviation: (sum[c] / n) as Float,
            variance: variance as Float,
            std_dev: variance.sqrt() as Float,
        };
    }

    tracing::info!(
        red = channels[0].variance,
        green = channels[1].variance,
        blue = channels[2].variance,
        "variance against reference"
    );

    Ok(VarianceReport { channels, histogram })
}
