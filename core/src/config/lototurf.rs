//! Lototurf: 6 of 31, the winning horse of a race, and reintegro.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_fraction, check_unit_sum, invalid, Economy, JackpotRules, Shares};
use crate::{economy::WorldBetsModel, error::SimResult};

pub const MAX_HORSES: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LototurfConfig {
    pub economy: Economy,
    pub reintegro_pct: f64,
    pub shares: Shares,
    pub jackpot: JackpotRules,
    /// Weight of a race having 1..=12 runners (index 0 = 1 runner).
    pub participant_weights: Vec<f64>,
}

impl Default for LototurfConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 1.0,
                prize_fund_pct: 0.55,
                draw_days: vec![Weekday::Sun],
                world_bets: WorldBetsModel::flat(250_000.0, 100_000.0, 1_000_000.0)
                    .with_jackpot_bump(500_000.0, 0.50),
            },
            reintegro_pct: 0.10,
            shares: Shares::from_pairs(&[
                ("6+C", 0.22),
                ("6", 0.14),
                ("5+C", 0.08),
                ("5", 0.06),
                ("4+C", 0.10),
                ("4", 0.15),
                ("3+C", 0.25),
            ]),
            jackpot: JackpotRules {
                guarantee: 150_000.0,
                cap: None,
            },
            participant_weights: vec![
                0.002, 0.003, 0.005, 0.010, 0.020, 0.040, 0.080, 0.140, 0.170, 0.180, 0.170, 0.180,
            ],
        }
    }
}

impl LototurfConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "lototurf";
        check_economy(GAME, &self.economy)?;
        check_fraction(GAME, "reintegro_pct", self.reintegro_pct)?;
        if self.reintegro_pct > self.economy.prize_fund_pct {
            return Err(invalid(GAME, "reintegro_pct exceeds prize_fund_pct"));
        }
        if self.participant_weights.len() != MAX_HORSES as usize {
            return Err(invalid(GAME, format!("participant_weights needs {MAX_HORSES} entries")));
        }
        if self.participant_weights.iter().all(|w| *w <= 0.0) {
            return Err(invalid(GAME, "participant_weights are all zero"));
        }
        check_unit_sum(GAME, "category shares", self.shares.total())
    }
}
