//! Sampling and combinatorics shared by every draw engine.
//!
//! RULE: Nothing here panics. Out-of-range inputs clamp to the
//! nearest meaningful answer (0 winners, empty picks, 0.0 probability).

use std::collections::BTreeSet;

use crate::rng::DrawRng;

/// Pick `count` distinct integers from [min, max], sorted ascending.
/// `count` is clamped to the size of the range.
pub fn pick_unique(rng: &mut DrawRng, count: usize, min: u32, max: u32) -> Vec<u32> {
    if max < min {
        return Vec::new();
    }
    let span = (max - min) as u64 + 1;
    let count = (count as u64).min(span);

    // Floyd's algorithm: exactly `count` rolls, no rejection loop.
    let mut chosen: BTreeSet<u64> = BTreeSet::new();
    for j in (span - count)..span {
        let t = rng.next_u64_below(j + 1);
        if !chosen.insert(t) {
            chosen.insert(j);
        }
    }
    chosen.into_iter().map(|v| min + v as u32).collect()
}

/// Standard normal deviate via Box–Muller.
pub fn standard_normal(rng: &mut DrawRng) -> f64 {
    let u1 = rng.next_f64().max(1e-300);
    let u2 = rng.next_f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

pub fn normal(rng: &mut DrawRng, mean: f64, sd: f64) -> f64 {
    mean + sd * standard_normal(rng)
}

/// Poisson(λ). Knuth's product method up to λ = 30, normal
/// approximation above. Non-finite or non-positive λ yields 0.
pub fn poisson(rng: &mut DrawRng, lambda: f64) -> u64 {
    if !lambda.is_finite() || lambda <= 0.0 {
        return 0;
    }
    if lambda <= 30.0 {
        let limit = (-lambda).exp();
        let mut k = 0u64;
        let mut p = 1.0;
        loop {
            p *= rng.next_f64();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }
    normal(rng, lambda, lambda.sqrt()).round().max(0.0) as u64
}

/// Binomial(n, p), clamped to [0, n].
pub fn binomial(rng: &mut DrawRng, n: u64, p: f64) -> u64 {
    if n == 0 || !p.is_finite() || p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }
    if n <= 50 {
        return (0..n).filter(|_| rng.chance(p)).count() as u64;
    }
    if p > 0.5 {
        return n - binomial(rng, n, 1.0 - p);
    }
    let mean = n as f64 * p;
    if p <= 0.05 || mean < 30.0 {
        return poisson(rng, mean).min(n);
    }
    let sd = (mean * (1.0 - p)).sqrt();
    normal(rng, mean, sd).round().clamp(0.0, n as f64) as u64
}

/// nCk as an f64, built incrementally so 54C5 or 100000C2 never
/// overflow an intermediate factorial.
pub fn n_choose_k(n: u64, k: u64) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut acc = 1.0;
    for i in 0..k {
        acc = acc * (n - i) as f64 / (i + 1) as f64;
    }
    acc
}

/// Probability that exactly `hits` of a player's `picked` numbers are
/// among `drawn` numbers taken from a pool of `pool`.
pub fn prob_hits(hits: u64, picked: u64, drawn: u64, pool: u64) -> f64 {
    if hits > picked || hits > drawn || picked > pool || drawn > pool {
        return 0.0;
    }
    if drawn - hits > pool - picked {
        return 0.0;
    }
    safe_divide(
        n_choose_k(picked, hits) * n_choose_k(pool - picked, drawn - hits),
        n_choose_k(pool, drawn),
    )
}

/// Split `n` independent bets into mutually exclusive categories by
/// sequential conditional binomials. `probs[i]` is the unconditional
/// probability of category i; the remainder mass is "no prize".
pub fn exclusive_counts(rng: &mut DrawRng, n: u64, probs: &[f64]) -> Vec<u64> {
    let mut remaining = n;
    let mut mass = 1.0;
    let mut counts = Vec::with_capacity(probs.len());
    for &p in probs {
        let p = if p.is_finite() { p.max(0.0) } else { 0.0 };
        let conditional = if mass > 0.0 { (p / mass).clamp(0.0, 1.0) } else { 0.0 };
        let k = binomial(rng, remaining, conditional);
        counts.push(k);
        remaining -= k;
        mass -= p;
    }
    counts
}

/// Exact distribution of the number of successes across independent
/// trials with individual probabilities `ps`. Index = successes.
pub fn poisson_binomial(ps: &[f64]) -> Vec<f64> {
    let mut dist = vec![0.0; ps.len() + 1];
    dist[0] = 1.0;
    for (i, &p) in ps.iter().enumerate() {
        let p = p.clamp(0.0, 1.0);
        for k in (0..=i + 1).rev() {
            let stay = dist[k] * (1.0 - p);
            let step = if k > 0 { dist[k - 1] * p } else { 0.0 };
            dist[k] = stay + step;
        }
    }
    dist
}

/// Index chosen proportionally to `weights`. Falls back to 0 when
/// every weight is zero or the slice is empty.
pub fn weighted_index(rng: &mut DrawRng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return 0;
    }
    let mut roll = rng.next_f64() * total;
    for (i, &w) in weights.iter().enumerate() {
        if !w.is_finite() || w <= 0.0 {
            continue;
        }
        if roll < w {
            return i;
        }
        roll -= w;
    }
    weights.iter().rposition(|w| w.is_finite() && *w > 0.0).unwrap_or(0)
}

/// Division that yields 0 instead of NaN/inf.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}
