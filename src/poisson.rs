use rand::Rng;

/// Above this rate `sample` splits λ into pieces so `exp(-λ)` stays
/// representable.
const KNUTH_MAX_LAMBDA: f64 = 30.0;

/// Knuth's multiplication sampler. Seeded runs depend on this exact
/// sequence of uniforms; O(λ) draws per sample.
///
/// Large rates are drawn as a sum of independent Poisson pieces of at most
/// `KNUTH_MAX_LAMBDA` each.
pub fn sample<R: Rng>(rng: &mut R, lambda: f64) -> u32 {
    if lambda <= 0.0 {
        return 0;
    }
    if lambda > KNUTH_MAX_LAMBDA {
        let pieces = (lambda / KNUTH_MAX_LAMBDA).ceil();
        let piece = lambda / pieces;
        return (0..pieces as u64).map(|_| knuth(rng, piece)).sum();
    }
    knuth(rng, lambda)
}

fn knuth<R: Rng>(rng: &mut R, lambda: f64) -> u32 {
    let limit = (-lambda).exp();
    let mut k = 0u32;
    let mut p = 1.0;
    loop {
        p *= rng.r#gen::<f64>();
        if p <= limit {
            return k;
        }
        k += 1;
    }
}

/// P(X = k) for k in `0..=max_k`, with the tail mass folded into the last
/// bucket so the vector sums to 1.
pub fn pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

/// P(X ≥ 1).
pub fn p_scores(lambda: f64) -> f64 {
    1.0 - (-lambda.max(0.0)).exp()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn pmf_sums_to_one() {
        let p = pmf(1.5, 10);
        assert_eq!(p.len(), 11);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((p[0] - (-1.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_never_scores() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(sample(&mut rng, 0.0), 0);
        }
        assert_eq!(p_scores(0.0), 0.0);
    }

    #[test]
    fn sample_mean_tracks_lambda() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 50_000;
        let total: u64 = (0..n).map(|_| sample(&mut rng, 2.2) as u64).sum();
        let mean = total as f64 / n as f64;
        // se ≈ sqrt(2.2 / 50k) ≈ 0.0066
        assert!((mean - 2.2).abs() < 0.04, "mean {mean}");
    }

    #[test]
    fn large_rates_keep_their_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 2_000;
        for lambda in [800.0, 5_000.0] {
            let total: u64 = (0..n).map(|_| sample(&mut rng, lambda) as u64).sum();
            let mean = total as f64 / n as f64;
            // se ≈ sqrt(λ / 2k), under 1.6 at λ = 5000
            assert!((mean - lambda).abs() < 10.0, "lambda {lambda} mean {mean}");
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let xs: Vec<u32> = (0..64).map(|_| sample(&mut a, 1.3)).collect();
        let ys: Vec<u32> = (0..64).map(|_| sample(&mut b, 1.3)).collect();
        assert_eq!(xs, ys);
    }
}
