//! World participation model: how many bets the rest of the country
//! (or continent) places on a given draw.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{
    rng::DrawRng,
    stats,
    types::{DrawDate, Money},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldBetsModel {
    /// Baseline bets per weekday, Monday first.
    pub base_by_weekday: [f64; 7],
    /// Jackpot scale for the logarithmic bump.
    pub jackpot_ref: Money,
    /// Bump coefficient: `1 + k·log10(1 + jackpot/ref)`.
    pub jackpot_k: f64,
    pub noise_sd: f64,
    pub noise_min: f64,
    pub noise_max: f64,
    pub clamp_min: f64,
    pub clamp_max: f64,
}

impl Default for WorldBetsModel {
    fn default() -> Self {
        Self {
            base_by_weekday: [1_000_000.0; 7],
            jackpot_ref: 10_000_000.0,
            jackpot_k: 0.35,
            noise_sd: 0.08,
            noise_min: 0.80,
            noise_max: 1.25,
            clamp_min: 100_000.0,
            clamp_max: 50_000_000.0,
        }
    }
}

impl WorldBetsModel {
    /// A model with the same base on every listed weekday.
    pub fn flat(base: f64, clamp_min: f64, clamp_max: f64) -> Self {
        Self {
            base_by_weekday: [base; 7],
            clamp_min,
            clamp_max,
            ..Self::default()
        }
    }

    pub fn with_weekday(mut self, weekday: chrono::Weekday, base: f64) -> Self {
        self.base_by_weekday[weekday.num_days_from_monday() as usize] = base;
        self
    }

    pub fn with_jackpot_bump(mut self, jackpot_ref: Money, jackpot_k: f64) -> Self {
        self.jackpot_ref = jackpot_ref;
        self.jackpot_k = jackpot_k;
        self
    }

    /// Deterministic part of the estimate (no noise, no clamp).
    pub fn expected(&self, date: DrawDate, jackpot: Money) -> f64 {
        let base = self.base_by_weekday[date.weekday().num_days_from_monday() as usize];
        let ratio = stats::safe_divide(jackpot.max(0.0), self.jackpot_ref);
        base * (1.0 + self.jackpot_k * (1.0 + ratio).log10())
    }

    pub fn estimate(&self, date: DrawDate, jackpot: Money, rng: &mut DrawRng) -> BetVolume {
        let noise = stats::normal(rng, 1.0, self.noise_sd).clamp(self.noise_min, self.noise_max);
        let raw = self.expected(date, jackpot) * noise;
        let bets_total = raw.clamp(self.clamp_min, self.clamp_max).round().max(1.0) as u64;
        BetVolume {
            bets_total,
            bets_world: bets_total - 1,
        }
    }
}

/// One draw's participation. One bet is always the simulated player's.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetVolume {
    pub bets_total: u64,
    pub bets_world: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn estimate_respects_clamp_and_reserves_player_slot() {
        let model = WorldBetsModel::flat(5_000_000.0, 4_000_000.0, 6_000_000.0);
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
        let mut rng = DrawRng::new(17);
        for _ in 0..1_000 {
            let v = model.estimate(date, 50_000_000.0, &mut rng);
            assert!((4_000_000..=6_000_000).contains(&v.bets_total));
            assert_eq!(v.bets_world + 1, v.bets_total);
        }
    }

    #[test]
    fn bigger_jackpot_attracts_more_bets() {
        let model = WorldBetsModel::default();
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).expect("valid date");
        assert!(model.expected(date, 100_000_000.0) > model.expected(date, 0.0));
        assert_eq!(model.expected(date, 0.0), 1_000_000.0);
    }
}
