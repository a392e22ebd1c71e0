// THEORY:
// The `classifier` turns a pixel's learned background histogram into a decision.
// Given the likelihood of the current bucket under the background model, Bayes' rule
// with a fixed background prior yields the posterior probability that the pixel is
// foreground. That posterior doubles as the confidence reported to callers; the
// binary decision is a simple threshold on it.
//
// The classifier is stateless: it reads a histogram and writes into the frame
// buffers owned by the subtractor.

use crate::core_modules::pmf::Pmf;
use crate::core_modules::quantizer::quantizer::Bucket;

pub type Probability = f32;

/// Posterior `P(foreground | q)` from the background likelihood `P(q | background)`
/// and the background prior.
///
/// The result is always in `[0, 1]`. If the evidence term vanishes (only possible
/// for a likelihood of exactly 0 or 1 paired with an extreme prior) the pixel is
/// reported as certainly foreground.
pub fn foreground_posterior(likelihood: Probability, background_prior: Probability) -> Probability {
    let background_term = likelihood * background_prior;
    let foreground_term = (1.0 - likelihood) * (1.0 - background_prior);
    let evidence = background_term + foreground_term;

    if evidence.is_nan() || evidence <= 0.0 {
        return 1.0;
    }

    let background_posterior = background_term / evidence;
    (1.0 - background_posterior).clamp(0.0, 1.0)
}

/// Classifies every pixel of a frame against its histogram.
///
/// Writes the foreground posterior of each pixel into `posteriors` and the raw
/// (unsmoothed) decision into `mask`.
pub fn classify_frame<const F: usize>(
    histograms: &[Pmf<F>],
    buckets: &[Bucket],
    background_prior: Probability,
    decision_threshold: Probability,
    posteriors: &mut [Probability],
    mask: &mut [bool],
) {
    debug_assert_eq!(histograms.len(), buckets.len());
    for (i, (pmf, &bucket)) in histograms.iter().zip(buckets).enumerate() {
        let posterior = foreground_posterior(pmf.probability(bucket), background_prior);
        posteriors[i] = posterior;
        mask[i] = posterior > decision_threshold;
    }
}
