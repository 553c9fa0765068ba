//! Benjamini–Hochberg correction and final significance filtering.

use crate::models::{CalledIsland, EnrichedIsland};

///
/// Benjamini–Hochberg q-values, returned in the order of `p_values`.
///
/// Ranks are assigned by ascending p-value (ties keep their input order),
/// `q_i = p_i × n / i`, then made monotone by a running minimum from the
/// largest rank down and capped at 1.
///
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| p_values[*a].total_cmp(&p_values[*b]));

    let mut q_values = vec![0.0; n];
    let mut running_min = 1.0f64;
    for (rank0, idx) in order.iter().enumerate().rev() {
        let q = p_values[*idx] * n as f64 / (rank0 + 1) as f64;
        running_min = running_min.min(q);
        q_values[*idx] = running_min;
    }

    q_values
}

///
/// Assigns q-values over every island that reached it and, with a
/// threshold, drops islands above it. Input order is preserved.
///
#[derive(Debug, Clone, Copy)]
pub struct FdrFilter {
    threshold: Option<f64>,
}

impl FdrFilter {
    pub fn new(threshold: Option<f64>) -> Self {
        FdrFilter { threshold }
    }

    pub fn apply(&self, islands: Vec<EnrichedIsland>) -> Vec<CalledIsland> {
        let p_values: Vec<f64> = islands.iter().map(|i| i.control.p_value).collect();
        let q_values = benjamini_hochberg(&p_values);

        islands
            .into_iter()
            .zip(q_values)
            .map(|(island, q)| island.with_q_value(q))
            .filter(|called| self.threshold.is_none_or(|threshold| called.q_value <= threshold))
            .collect()
    }
}
