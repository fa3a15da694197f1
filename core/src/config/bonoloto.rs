//! Bonoloto: 6 of 49 drawn Monday to Saturday.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_fraction, check_unit_sum, invalid, Economy, JackpotRules, Shares};
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BonolotoConfig {
    pub economy: Economy,
    pub reintegro_pct: f64,
    pub fixed_three: Money,
    pub shares: Shares,
    pub jackpot: JackpotRules,
}

impl Default for BonolotoConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 0.50,
                prize_fund_pct: 0.55,
                draw_days: vec![
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                    Weekday::Sat,
                ],
                world_bets: WorldBetsModel::flat(2_500_000.0, 800_000.0, 10_000_000.0)
                    .with_weekday(Weekday::Sat, 3_000_000.0)
                    .with_jackpot_bump(2_000_000.0, 0.40),
            },
            reintegro_pct: 0.10,
            fixed_three: 4.0,
            shares: Shares::from_pairs(&[("6", 0.45), ("5C", 0.12), ("5", 0.12), ("4", 0.31)]),
            jackpot: JackpotRules {
                guarantee: 400_000.0,
                cap: None,
            },
        }
    }
}

impl BonolotoConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "bonoloto";
        check_economy(GAME, &self.economy)?;
        check_fraction(GAME, "reintegro_pct", self.reintegro_pct)?;
        if self.reintegro_pct > self.economy.prize_fund_pct {
            return Err(invalid(GAME, "reintegro_pct exceeds prize_fund_pct"));
        }
        check_unit_sum(GAME, "category shares", self.shares.total())
    }
}
