// THEORY:
// A `Pmf` is the memory of a single pixel. It is a sparse histogram over quantized
// readings: at most `F` `Feature`s, each pairing a bucket with a weight. While the
// model trains the weights are raw observation counts; once training ends they are
// normalized into a probability mass function and from then on adapted with an
// exponential moving average.
//
// Key principles:
// 1.  **Fixed capacity, inline storage**: the features live in an inline array so a
//     grid of histograms is one contiguous allocation and no update ever allocates.
// 2.  **Unique values**: a bucket appears at most once among the occupied slots.
// 3.  **Two eviction policies**: training evicts the oldest-inserted feature (FIFO,
//     slot 0), runtime replaces the lowest-weighted feature.

use crate::core_modules::quantizer::quantizer::Bucket;

pub type Weight = f32;

/// One histogram bin: a quantized value and its estimated probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Feature {
    pub value: Bucket,
    pub weight: Weight,
}

/// A bounded, per-pixel histogram of quantized readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pmf<const F: usize> {
    features: [Feature; F],
    count: usize,
}

impl<const F: usize> Default for Pmf<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const F: usize> Pmf<F> {
    pub const fn new() -> Self {
        const { assert!(F > 0, "a histogram needs room for at least one feature") };
        Self {
            features: [Feature { value: 0, weight: 0.0 }; F],
            count: 0,
        }
    }

    /// Maximum number of features this histogram can hold.
    pub const fn capacity(&self) -> usize {
        F
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == F
    }

    /// The occupied features, in slot order.
    pub fn features(&self) -> &[Feature] {
        &self.features[..self.count]
    }

    /// Sum of all occupied weights.
    pub fn total_weight(&self) -> Weight {
        self.features().iter().map(|f| f.weight).sum()
    }

    /// The weight stored for `value`, or 0.0 when the value was never observed.
    pub fn probability(&self, value: Bucket) -> Weight {
        self.features()
            .iter()
            .find(|f| f.value == value)
            .map_or(0.0, |f| f.weight)
    }

    pub fn contains(&self, value: Bucket) -> bool {
        self.features().iter().any(|f| f.value == value)
    }

    pub fn clear(&mut self) {
        self.features = [Feature::default(); F];
        self.count = 0;
    }

    /// Records one training observation of `value`.
    ///
    /// Known values gain one count. Unknown values are appended, evicting the
    /// oldest-inserted feature first when the histogram is full.
    pub fn accumulate(&mut self, value: Bucket) {
        if let Some(feature) = self.features[..self.count]
            .iter_mut()
            .find(|f| f.value == value)
        {
            feature.weight += 1.0;
            return;
        }

        if self.count < F {
            self.features[self.count] = Feature { value, weight: 1.0 };
            self.count += 1;
        } else {
            self.features.copy_within(1.., 0);
            self.features[F - 1] = Feature { value, weight: 1.0 };
        }
    }

    /// Divides every weight by the total so the histogram sums to one.
    /// Returns false, leaving the weights untouched, when the total is zero.
    pub fn normalize(&mut self) -> bool {
        let total = self.total_weight();
        if total <= 0.0 {
            return false;
        }
        for feature in &mut self.features[..self.count] {
            feature.weight /= total;
        }
        true
    }

    /// Runtime adaptation towards an observation of `value`.
    ///
    /// An unknown value is inserted with zero weight, replacing the lowest-weighted
    /// feature when full (its weight leaves the running total). Every weight is then
    /// blended towards the indicator of `value` and divided by that total. With
    /// nothing left in the total the blended weights are renormalized by their own sum.
    pub fn adapt(&mut self, value: Bucket, learning_rate: Weight) {
        let mut present = false;
        let mut total: Weight = 0.0;
        let mut min_index = 0;
        let mut min_weight = Weight::INFINITY;

        for (i, feature) in self.features().iter().enumerate() {
            total += feature.weight;
            if feature.weight < min_weight {
                min_weight = feature.weight;
                min_index = i;
            }
            present |= feature.value == value;
        }

        if !present {
            if self.count < F {
                self.features[self.count] = Feature { value, weight: 0.0 };
                self.count += 1;
            } else {
                self.features[min_index] = Feature { value, weight: 0.0 };
                total -= min_weight;
            }
        }

        let keep = 1.0 - learning_rate;
        for feature in &mut self.features[..self.count] {
            let indicator = if feature.value == value { 1.0 } else { 0.0 };
            feature.weight = keep * feature.weight + learning_rate * indicator;
        }

        let divisor = if total > 0.0 { total } else { self.total_weight() };
        if divisor > 0.0 {
            for feature in &mut self.features[..self.count] {
                feature.weight /= divisor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn values<const F: usize>(pmf: &Pmf<F>) -> Vec<Bucket> {
        pmf.features().iter().map(|f| f.value).collect()
    }

    #[test]
    fn accumulate_counts_repeats() {
        let mut pmf = Pmf::<4>::new();
        pmf.accumulate(3);
        pmf.accumulate(3);
        pmf.accumulate(7);
        assert_eq!(pmf.len(), 2);
        assert_eq!(pmf.probability(3), 2.0);
        assert_eq!(pmf.probability(7), 1.0);
        assert_eq!(pmf.probability(9), 0.0);
    }

    #[test]
    fn training_eviction_is_fifo_not_weight_based() {
        let mut pmf = Pmf::<3>::new();
        // Value 1 is the heaviest but also the oldest.
        for _ in 0..5 {
            pmf.accumulate(1);
        }
        pmf.accumulate(2);
        pmf.accumulate(3);
        assert!(pmf.is_full());

        pmf.accumulate(4);
        assert_eq!(values(&pmf), vec![2, 3, 4]);
        assert!(!pmf.contains(1));
        assert_eq!(pmf.probability(4), 1.0);
    }

    #[test]
    fn seen_values_survive_until_capacity_pressure() {
        let mut pmf = Pmf::<4>::new();
        for v in [5, 6, 5, 7, 6, 5] {
            pmf.accumulate(v);
        }
        for v in [5, 6, 7] {
            assert!(pmf.contains(v));
        }
    }

    #[test]
    fn normalize_produces_a_pmf() {
        let mut pmf = Pmf::<8>::new();
        for v in [1, 1, 1, 2, 3, 3] {
            pmf.accumulate(v);
        }
        assert!(pmf.normalize());
        assert!((pmf.total_weight() - 1.0).abs() < EPSILON);
        assert!((pmf.probability(1) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn normalize_leaves_empty_histograms_alone() {
        let mut pmf = Pmf::<2>::new();
        assert!(!pmf.normalize());
        assert!(pmf.is_empty());
        assert_eq!(pmf.total_weight(), 0.0);
    }

    #[test]
    fn adapt_reinforces_a_known_value() {
        let mut pmf = Pmf::<4>::new();
        pmf.accumulate(1);
        pmf.accumulate(2);
        pmf.normalize();

        pmf.adapt(1, 0.1);
        assert!((pmf.probability(1) - 0.55).abs() < EPSILON);
        assert!((pmf.probability(2) - 0.45).abs() < EPSILON);
        assert!((pmf.total_weight() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn adapt_inserts_into_spare_capacity() {
        let mut pmf = Pmf::<2>::new();
        pmf.accumulate(0);
        pmf.normalize();

        pmf.adapt(31, 0.025);
        assert_eq!(pmf.len(), 2);
        assert!((pmf.probability(0) - 0.975).abs() < EPSILON);
        assert!((pmf.probability(31) - 0.025).abs() < EPSILON);
    }

    #[test]
    fn adapt_replaces_the_lightest_feature_when_full() {
        let mut pmf = Pmf::<2>::new();
        for v in [4, 4, 4, 9] {
            pmf.accumulate(v);
        }
        pmf.normalize(); // 4 -> 0.75, 9 -> 0.25

        pmf.adapt(12, 0.2);
        assert_eq!(values(&pmf), vec![4, 12]);
        // total after eviction is 0.75
        assert!((pmf.probability(4) - 0.8).abs() < EPSILON);
        assert!((pmf.probability(12) - 0.2 / 0.75).abs() < EPSILON);
    }

    #[test]
    fn adapt_on_empty_histogram_yields_a_pmf() {
        let mut pmf = Pmf::<2>::new();
        pmf.adapt(5, 0.025);
        assert_eq!(pmf.len(), 1);
        assert!((pmf.probability(5) - 1.0).abs() < EPSILON);

        pmf.adapt(5, 0.025);
        assert!((pmf.total_weight() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn adapt_after_evicting_the_only_feature_stays_normalized() {
        let mut pmf = Pmf::<1>::new();
        pmf.accumulate(0);
        pmf.normalize();

        pmf.adapt(31, 0.025);
        assert_eq!(values(&pmf), vec![31]);
        assert!((pmf.probability(31) - 1.0).abs() < EPSILON);

        pmf.adapt(31, 0.025);
        assert!((pmf.probability(31) - 1.0).abs() < EPSILON);
        assert!((pmf.total_weight() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn adapt_with_zero_learning_rate_on_empty_histogram_stays_finite() {
        let mut pmf = Pmf::<2>::new();
        pmf.adapt(5, 0.0);
        assert_eq!(pmf.probability(5), 0.0);
    }

    #[test]
    fn adapt_keeps_values_unique() {
        let mut pmf = Pmf::<3>::new();
        for v in [1, 2, 3, 1, 2, 3, 4, 4, 1] {
            pmf.adapt(v, 0.3);
        }
        let mut seen = values(&pmf);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), pmf.len());
    }
}
