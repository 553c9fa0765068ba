//! Uniform Poisson background: reads scattered evenly over the effective genome.

use crate::models::{BackgroundScore, Island, Window};
use crate::stats::poisson_log_sf;

/// Upper bound on the eligibility search; a window can't hold more reads
/// than this in any realistic library before the threshold is met.
const MAX_ELIGIBLE_COUNT: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundModel {
    lambda: f64,
    effective_windows: f64,
}

impl BackgroundModel {
    ///
    /// Background for `total_reads` spread over `effective_genome_size` bases
    /// in windows of `window_size`: `λ = N × windowSize / effectiveGenomeSize`.
    ///
    pub fn new(total_reads: u64, window_size: u64, effective_genome_size: f64) -> Self {
        BackgroundModel {
            lambda: total_reads as f64 * window_size as f64 / effective_genome_size,
            effective_windows: effective_genome_size / window_size as f64,
        }
    }

    /// Expected reads per window.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Expected reads over `span_windows` consecutive windows.
    pub fn expected(&self, span_windows: u64) -> f64 {
        self.lambda * span_windows as f64
    }

    pub fn window_log_p_value(&self, count: u64) -> f64 {
        poisson_log_sf(count, self.lambda)
    }

    /// `P(X ≥ count | λ)`.
    pub fn window_p_value(&self, count: u64) -> f64 {
        self.window_log_p_value(count).exp()
    }

    ///
    /// Smallest window count whose p-value is at or below `pvalue`. Windows
    /// with fewer reads are not eligible for islands.
    ///
    pub fn min_eligible_count(&self, pvalue: f64) -> u64 {
        let log_threshold = pvalue.ln();
        (1..MAX_ELIGIBLE_COUNT)
            .find(|k| self.window_log_p_value(*k) <= log_threshold)
            .unwrap_or(MAX_ELIGIBLE_COUNT)
    }

    ///
    /// Score an island from the windows it spans.
    ///
    /// The score accumulates `-ln(p)` of every window, so many moderately
    /// enriched windows and a few strongly enriched ones both score high.
    /// The island p-value treats the whole span as one Poisson draw.
    ///
    pub fn score(&self, island: &Island, windows: &[Window]) -> BackgroundScore {
        let score = windows
            .iter()
            .map(|w| -self.window_log_p_value(w.count as u64))
            .sum();

        let p_value = poisson_log_sf(island.read_count, self.expected(island.span_windows())).exp();

        BackgroundScore {
            p_value,
            score,
            e_value: p_value * self.effective_windows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn island(start_window: u64, end_window: u64, read_count: u64, window_count: u32) -> Island {
        Island {
            chr: "chr1".to_string(),
            start_window,
            end_window,
            start: start_window * 200,
            end: (end_window + 1) * 200,
            window_count,
            read_count,
        }
    }

    #[rstest]
    fn test_lambda() {
        let model = BackgroundModel::new(1_000_000, 200, 2.0e9);
        assert!((model.lambda() - 0.1).abs() < 1e-12);
        assert!((model.expected(4) - 0.4).abs() < 1e-12);
    }

    #[rstest]
    fn test_window_p_values() {
        // λ = 1
        let model = BackgroundModel::new(10, 100, 1_000.0);
        assert_eq!(model.window_p_value(0), 1.0);
        let p1 = model.window_p_value(1);
        let p10 = model.window_p_value(10);
        assert!(p10 < p1 / 1e5);
        assert!(p10 > 0.0);
    }

    #[rstest]
    fn test_window_p_value_monotone_in_count() {
        let model = BackgroundModel::new(12_345, 200, 3.0e6);
        let p: Vec<f64> = (0..300).map(|k| model.window_p_value(k)).collect();
        assert!(p.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[rstest]
    #[case(0.2)]
    #[case(0.01)]
    #[case(1e-6)]
    fn test_min_eligible_count(#[case] threshold: f64) {
        let model = BackgroundModel::new(10, 100, 1_000.0);
        let k = model.min_eligible_count(threshold);
        assert!(model.window_p_value(k) <= threshold);
        assert!(k == 1 || model.window_p_value(k - 1) > threshold);
    }

    #[rstest]
    fn test_score_sums_window_scores() {
        let model = BackgroundModel::new(10, 100, 1_000.0);
        let windows = vec![
            Window { index: 5, count: 3 },
            Window { index: 6, count: 1 },
            Window { index: 8, count: 2 },
        ];
        let scored = model.score(&island(5, 8, 6, 3), &windows);

        let expected_score: f64 = [3u64, 1, 2]
            .iter()
            .map(|k| -model.window_p_value(*k).ln())
            .sum();
        assert!((scored.score - expected_score).abs() < 1e-9);
        assert!((scored.p_value - poisson_log_sf(6, 4.0).exp()).abs() < 1e-12);
        assert!((scored.e_value - scored.p_value * 10.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_score_of_extreme_island_is_finite() {
        let model = BackgroundModel::new(100, 200, 1.0e9);
        let windows = vec![Window {
            index: 0,
            count: 50_000,
        }];
        let scored = model.score(&island(0, 0, 50_000, 1), &windows);
        assert!(scored.score.is_finite());
        assert!(scored.score > 1e5);
        assert_eq!(scored.p_value, 0.0);
    }
}
