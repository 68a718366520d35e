//! Two-sample Kolmogorov-Smirnov test.
//!
//! The statistic is tracked as the integer numerator `max |i*n - j*m|`, where
//! `i` and `j` count how many values of each sample are `<= x` as `x` sweeps
//! the merged samples. `D = numerator / (m*n)`. Keeping it integral lets the
//! exact p-value decide band membership of lattice points without rounding.

use crate::config::KsMethod;

/// Largest `m * n` for which [`KsMethod::Auto`] uses the exact distribution.
pub const EXACT_MAX_CELLS: u128 = 1_000_000;

const SERIES_EPS_TERM: f64 = 0.001;
const SERIES_EPS_SUM: f64 = 1.0e-8;

/// Statistic and p-value of one test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

/// Runs a two-sided two-sample KS test.
///
/// Inputs must not contain NaN. An empty sample yields `D = 0, p = 1`.
pub fn ks_2samp(reference: &[f64], current: &[f64], method: KsMethod) -> KsOutcome {
    let m = reference.len();
    let n = current.len();
    if m == 0 || n == 0 {
        return KsOutcome {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let mut a = reference.to_vec();
    let mut b = current.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let numerator = statistic_numerator(&a, &b);
    let cells = m as u128 * n as u128;
    let statistic = numerator as f64 / cells as f64;

    let use_exact = match method {
        KsMethod::Exact => true,
        KsMethod::Asymptotic => false,
        KsMethod::Auto => cells <= EXACT_MAX_CELLS,
    };
    let p_value = if use_exact {
        exact_p_value(m, n, numerator)
    } else {
        asymptotic_p_value(m, n, statistic)
    };

    KsOutcome { statistic, p_value }
}

/// `max |i*n - j*m|` over the merged, sorted samples. Ties advance both
/// samples together, so tied values never create a spurious gap.
fn statistic_numerator(a: &[f64], b: &[f64]) -> u128 {
    let (m, n) = (a.len(), b.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut best = 0u128;

    while i < m && j < n {
        let x = if a[i] <= b[j] { a[i] } else { b[j] };
        while i < m && a[i] <= x {
            i += 1;
        }
        while j < n && b[j] <= x {
            j += 1;
        }
        best = best.max(gap(i, j, m, n));
    }
    best
}

fn gap(i: usize, j: usize, m: usize, n: usize) -> u128 {
    let left = i as u128 * n as u128;
    let right = j as u128 * m as u128;
    left.abs_diff(right)
}

/// `P(D >= d)` under the null, exactly.
///
/// Under the null every monotone lattice path from `(0, 0)` to `(m, n)` is
/// equally likely. The path is walked as a Markov chain that steps in `i`
/// with probability `(m - i) / (m - i + n - j)`, and the probability mass that
/// first steps onto a point with `|i*n - j*m| >= numerator` is accumulated.
/// Summing exit mass directly keeps tiny p-values accurate.
fn exact_p_value(m: usize, n: usize, numerator: u128) -> f64 {
    if numerator == 0 {
        return 1.0;
    }
    let inside = |i: usize, j: usize| gap(i, j, m, n) < numerator;

    let mut exit = 0.0f64;
    let mut row = vec![0.0f64; n + 1];
    let mut next = vec![0.0f64; n + 1];
    row[0] = 1.0;

    for i in 0..=m {
        for j in 0..=n {
            let mass = row[j];
            if mass == 0.0 {
                continue;
            }
            let steps_i = (m - i) as f64;
            let steps_j = (n - j) as f64;
            let total = steps_i + steps_j;
            if total == 0.0 {
                continue;
            }
            if i < m {
                let p = mass * steps_i / total;
                if inside(i + 1, j) {
                    next[j] += p;
                } else {
                    exit += p;
                }
            }
            if j < n {
                let p = mass * steps_j / total;
                if inside(i, j + 1) {
                    row[j + 1] += p;
                } else {
                    exit += p;
                }
            }
        }
        std::mem::swap(&mut row, &mut next);
        next.iter_mut().for_each(|v| *v = 0.0);
    }

    exit.clamp(0.0, 1.0)
}

/// Limiting Kolmogorov distribution with Stephens' small-sample correction.
fn asymptotic_p_value(m: usize, n: usize, statistic: f64) -> f64 {
    let en = ((m as f64 * n as f64) / (m as f64 + n as f64)).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * statistic;
    kolmogorov_survival(lambda)
}

/// `Q_KS(lambda) = 2 * sum_{k>=1} (-1)^(k-1) exp(-2 k^2 lambda^2)`.
fn kolmogorov_survival(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;

    for k in 1..=100 {
        let k = k as f64;
        let term = sign * (a2 * k * k).exp();
        sum += term;
        if term.abs() <= SERIES_EPS_TERM * previous || term.abs() <= SERIES_EPS_SUM * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous = term.abs();
    }
    // The series only fails to converge for lambda near zero.
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_identical_samples() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let out = ks_2samp(&x, &x, KsMethod::Auto);
        assert_eq!(out.statistic, 0.0);
        assert_eq!(out.p_value, 1.0);

        let out = ks_2samp(&x, &x, KsMethod::Asymptotic);
        assert_eq!(out.p_value, 1.0);
    }

    #[test]
    fn test_small_shift_is_not_significant() {
        let out = ks_2samp(&[10.0, 15.0, 12.0], &[11.0, 16.0, 13.0], KsMethod::Auto);
        assert!(approx(out.statistic, 1.0 / 3.0, 1e-12));
        assert!(approx(out.p_value, 1.0, 1e-12));
    }

    #[test]
    fn test_disjoint_samples() {
        let a: Vec<f64> = (0..100).map(f64::from).collect();
        let b: Vec<f64> = (1000..1100).map(f64::from).collect();
        let out = ks_2samp(&a, &b, KsMethod::Auto);
        assert_eq!(out.statistic, 1.0);
        // 2 / C(200, 100)
        assert!(out.p_value > 0.0 && out.p_value < 1e-50);
    }

    #[test]
    fn test_exact_matches_closed_form_for_full_separation() {
        // m = n = 3, fully separated: p = 2 / C(6, 3) = 0.1
        let out = ks_2samp(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], KsMethod::Exact);
        assert_eq!(out.statistic, 1.0);
        assert!(approx(out.p_value, 0.1, 1e-12));

        // m = 2, n = 3: p = 2 / C(5, 2) = 0.2
        let out = ks_2samp(&[1.0, 2.0], &[4.0, 5.0, 6.0], KsMethod::Exact);
        assert!(approx(out.p_value, 0.2, 1e-12));
    }

    #[test]
    fn test_exact_known_value() {
        // m = n = 5 with D = 0.6 has exact two-sided p = 0.357142857...
        let a = [1.0, 2.0, 3.0, 6.0, 8.0];
        let b = [4.0, 5.0, 7.0, 9.0, 10.0];
        let out = ks_2samp(&a, &b, KsMethod::Exact);
        assert!(approx(out.statistic, 0.6, 1e-12));
        assert!(approx(out.p_value, 0.357_142_857_142_857, 1e-9), "{}", out.p_value);
    }

    #[test]
    fn test_ties_do_not_inflate_statistic() {
        let a = [1.0, 1.0, 2.0, 2.0];
        let b = [1.0, 2.0];
        let out = ks_2samp(&a, &b, KsMethod::Exact);
        assert_eq!(out.statistic, 0.0);
        assert_eq!(out.p_value, 1.0);
    }

    #[test]
    fn test_order_within_sample_is_irrelevant() {
        let a = [5.0, 1.0, 3.0, 9.0, 7.0];
        let shuffled = [9.0, 3.0, 7.0, 1.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        assert_eq!(
            ks_2samp(&a, &b, KsMethod::Auto),
            ks_2samp(&shuffled, &b, KsMethod::Auto)
        );
    }

    #[test]
    fn test_p_value_decreases_with_separation() {
        let a: Vec<f64> = (0..40).map(f64::from).collect();
        let mut last = f64::INFINITY;
        for shift in [0.0, 5.0, 10.0, 20.0, 40.0] {
            let b: Vec<f64> = a.iter().map(|v| v + shift).collect();
            for method in [KsMethod::Exact, KsMethod::Asymptotic] {
                let out = ks_2samp(&a, &b, method);
                assert!(out.p_value <= 1.0 && out.p_value >= 0.0);
            }
            let p = ks_2samp(&a, &b, KsMethod::Exact).p_value;
            assert!(p <= last, "shift {shift}: {p} > {last}");
            last = p;
        }
        assert!(last < 1e-10);
    }

    #[test]
    fn test_asymptotic_close_to_exact_for_moderate_samples() {
        let a: Vec<f64> = (0..200).map(|v| v as f64).collect();
        let b: Vec<f64> = (0..200).map(|v| v as f64 + 25.0).collect();
        let exact = ks_2samp(&a, &b, KsMethod::Exact).p_value;
        let asymptotic = ks_2samp(&a, &b, KsMethod::Asymptotic).p_value;
        assert!(approx(exact, asymptotic, 0.02), "{exact} vs {asymptotic}");
    }

    #[test]
    fn test_kolmogorov_survival_reference_points() {
        assert!(approx(kolmogorov_survival(1.36), 0.0494, 1e-3));
        assert!(approx(kolmogorov_survival(1.63), 0.0098, 1e-3));
        assert_eq!(kolmogorov_survival(0.0), 1.0);
    }

    #[test]
    fn test_empty_sample() {
        let out = ks_2samp(&[], &[1.0], KsMethod::Auto);
        assert_eq!(out.p_value, 1.0);
    }
}
