//! Upper-tail probabilities of count distributions, in log space.
//!
//! The regularized incomplete gamma/beta functions give `P(X ≥ k)` directly
//! as long as the result is representable. Far in the tail that value
//! underflows, so the log of the first term is taken analytically and the
//! remaining terms are summed relative to it.

use statrs::function::beta::beta_reg;
use statrs::function::gamma::{gamma_lr, ln_gamma};

const DIRECT_TAIL_FLOOR: f64 = 1e-280;
const SERIES_EPSILON: f64 = 1e-17;
const MAX_SERIES_TERMS: usize = 1_000_000;

/// Sum of `1 + r_1 + r_1 r_2 + ...` where `ratio(j)` is the ratio between
/// consecutive terms.
fn relative_tail_sum(mut ratio: impl FnMut(usize) -> f64) -> f64 {
    let mut term = 1.0;
    let mut sum = 1.0;
    for j in 0..MAX_SERIES_TERMS {
        term *= ratio(j);
        sum += term;
        if term < sum * SERIES_EPSILON {
            break;
        }
    }
    sum
}

///
/// `ln P(X ≥ k)` for `X ~ Poisson(mu)`.
///
pub fn poisson_log_sf(k: u64, mu: f64) -> f64 {
    if k == 0 {
        return 0.0;
    }
    if mu <= 0.0 {
        return f64::NEG_INFINITY;
    }

    let kf = k as f64;
    let direct = gamma_lr(kf, mu);
    if kf <= mu || direct > DIRECT_TAIL_FLOOR {
        return direct.ln();
    }

    // ln P(X = k), then P(X = k + j + 1) / P(X = k + j) = mu / (k + j + 1)
    let log_head = kf * mu.ln() - mu - ln_gamma(kf + 1.0);
    log_head + relative_tail_sum(|j| mu / (kf + j as f64 + 1.0)).ln()
}

pub fn poisson_sf(k: u64, mu: f64) -> f64 {
    poisson_log_sf(k, mu).exp()
}

///
/// `ln P(X ≥ k)` for a negative binomial with mean `mu` and variance
/// `mu + dispersion × mu²`.
///
pub fn neg_binomial_log_sf(k: u64, mu: f64, dispersion: f64) -> f64 {
    if k == 0 {
        return 0.0;
    }
    if mu <= 0.0 {
        return f64::NEG_INFINITY;
    }

    let size = 1.0 / dispersion;
    let success = size / (size + mu);
    let kf = k as f64;

    // P(X ≥ k) = I_{1-p}(k, size)
    let direct = beta_reg(kf, size, 1.0 - success);
    if kf <= mu || direct > DIRECT_TAIL_FLOOR {
        return direct.ln();
    }

    let log_head = ln_gamma(kf + size) - ln_gamma(size) - ln_gamma(kf + 1.0)
        + size * success.ln()
        + kf * (1.0 - success).ln();
    log_head
        + relative_tail_sum(|j| {
            let at = kf + j as f64;
            (at + size) / (at + 1.0) * (1.0 - success)
        })
        .ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    fn assert_close(actual: f64, expected: f64, rel: f64) {
        assert!(
            ((actual - expected) / expected).abs() < rel,
            "{} != {}",
            actual,
            expected
        );
    }

    #[rstest]
    #[case(1, 1.0, 1.0 - (-1.0f64).exp())]
    #[case(2, 1.0, 1.0 - 2.0 * (-1.0f64).exp())]
    #[case(3, 2.0, 1.0 - 5.0 * (-2.0f64).exp())]
    fn test_poisson_small_values(#[case] k: u64, #[case] mu: f64, #[case] expected: f64) {
        assert_close(poisson_sf(k, mu), expected, 1e-10);
    }

    #[rstest]
    fn test_zero_count_is_certain() {
        assert_eq!(poisson_log_sf(0, 3.5), 0.0);
        assert_eq!(neg_binomial_log_sf(0, 3.5, 0.2), 0.0);
    }

    #[rstest]
    fn test_ten_reads_much_rarer_than_one() {
        let p1 = poisson_sf(1, 1.0);
        let p10 = poisson_sf(10, 1.0);
        assert!(p10 < p1 * 1e-5);
        assert_close(p10, 1.1142547833872e-7, 1e-6);
    }

    #[rstest]
    #[case(1.0)]
    #[case(0.05)]
    #[case(25.0)]
    #[case(400.0)]
    fn test_poisson_tail_non_increasing(#[case] mu: f64) {
        let mut previous = 0.0;
        for k in 0..2_000u64 {
            let log_p = poisson_log_sf(k, mu);
            assert!(log_p.is_finite());
            assert!(log_p <= previous + 1e-12, "k = {}", k);
            previous = log_p;
        }
    }

    #[rstest]
    fn test_continuous_across_series_switch() {
        let mu = 1.0;
        let k = (1..400u64)
            .find(|k| gamma_lr(*k as f64, mu) <= DIRECT_TAIL_FLOOR)
            .unwrap();

        // far in the tail consecutive tails differ by about mu / k
        let step = poisson_log_sf(k, mu) - poisson_log_sf(k - 1, mu);
        assert!((step - (mu / k as f64).ln()).abs() < 1e-2);
    }

    #[rstest]
    fn test_huge_counts_do_not_underflow() {
        let log_p = poisson_log_sf(5_000, 1.0);
        assert!(log_p.is_finite());
        assert!(log_p < -30_000.0);

        let log_nb = neg_binomial_log_sf(5_000, 1.0, 0.1);
        assert!(log_nb.is_finite());
        assert!(log_nb < -1_000.0);
    }

    #[rstest]
    #[case(10.0, 30)]
    #[case(2.0, 15)]
    #[case(50.0, 120)]
    fn test_negative_binomial_has_heavier_tail(#[case] mu: f64, #[case] k: u64) {
        assert!(neg_binomial_log_sf(k, mu, 0.5) > poisson_log_sf(k, mu));
    }

    #[rstest]
    fn test_negative_binomial_approaches_poisson() {
        let nb = neg_binomial_log_sf(12, 4.0, 1e-4);
        let poisson = poisson_log_sf(12, 4.0);
        assert_close(nb, poisson, 1e-2);
    }

    #[rstest]
    fn test_negative_binomial_non_increasing() {
        let mut previous = 0.0;
        for k in 0..1_500u64 {
            let log_p = neg_binomial_log_sf(k, 8.0, 0.3);
            assert!(log_p.is_finite());
            assert!(log_p <= previous + 1e-12, "k = {}", k);
            previous = log_p;
        }
    }
}
