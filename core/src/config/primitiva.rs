//! La Primitiva: 6 of 49, complementario, reintegro.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_fraction, check_unit_sum, invalid, Economy, JackpotRules, Shares};
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrimitivaConfig {
    pub economy: Economy,
    /// Fraction of revenue set aside to refund reintegro hits.
    pub reintegro_pct: f64,
    /// Fixed prize for 3 hits, paid before the percentage split.
    pub fixed_three: Money,
    /// Split of what remains after reintegro and the fixed prize.
    pub shares: Shares,
    pub jackpot: JackpotRules,
    /// Share of "6" winners that also hit the reintegro.
    pub special_rate: f64,
}

impl Default for PrimitivaConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 1.0,
                prize_fund_pct: 0.55,
                draw_days: vec![Weekday::Mon, Weekday::Thu, Weekday::Sat],
                world_bets: WorldBetsModel::flat(3_500_000.0, 1_500_000.0, 25_000_000.0)
                    .with_weekday(Weekday::Mon, 3_000_000.0)
                    .with_weekday(Weekday::Thu, 4_500_000.0)
                    .with_weekday(Weekday::Sat, 6_500_000.0)
                    .with_jackpot_bump(5_000_000.0, 0.45),
            },
            reintegro_pct: 0.10,
            fixed_three: 8.0,
            shares: Shares::from_pairs(&[("6", 0.40), ("5C", 0.06), ("5", 0.13), ("4", 0.21), ("6R", 0.20)]),
            jackpot: JackpotRules {
                guarantee: 3_000_000.0,
                cap: None,
            },
            special_rate: 0.1,
        }
    }
}

impl PrimitivaConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "primitiva";
        check_economy(GAME, &self.economy)?;
        check_fraction(GAME, "reintegro_pct", self.reintegro_pct)?;
        check_fraction(GAME, "special_rate", self.special_rate)?;
        if self.reintegro_pct > self.economy.prize_fund_pct {
            return Err(invalid(GAME, "reintegro_pct exceeds prize_fund_pct"));
        }
        check_unit_sum(GAME, "category shares", self.shares.total())
    }
}
