//! El Gordo de la Primitiva: 5 of 54 plus a key number.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_fraction, check_unit_sum, invalid, Economy, JackpotRules, Shares};
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GordoConfig {
    pub economy: Economy,
    /// Revenue share that funds key-number refunds.
    pub reintegro_pct: f64,
    /// Fixed prize for 2 hits without the key.
    pub fixed_two: Money,
    pub shares: Shares,
    pub jackpot: JackpotRules,
}

impl Default for GordoConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 1.50,
                prize_fund_pct: 0.55,
                draw_days: vec![Weekday::Sun],
                world_bets: WorldBetsModel::flat(2_200_000.0, 800_000.0, 8_000_000.0)
                    .with_jackpot_bump(5_000_000.0, 0.40),
            },
            reintegro_pct: 0.10,
            fixed_two: 3.0,
            shares: Shares::from_pairs(&[
                ("5+1", 0.52),
                ("5+0", 0.07),
                ("4+1", 0.015),
                ("4+0", 0.017),
                ("3+1", 0.026),
                ("3+0", 0.078),
                ("2+1", 0.274),
            ]),
            jackpot: JackpotRules {
                guarantee: 5_000_000.0,
                cap: None,
            },
        }
    }
}

impl GordoConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "gordo";
        check_economy(GAME, &self.economy)?;
        check_fraction(GAME, "reintegro_pct", self.reintegro_pct)?;
        if self.reintegro_pct > self.economy.prize_fund_pct {
            return Err(invalid(GAME, "reintegro_pct exceeds prize_fund_pct"));
        }
        check_unit_sum(GAME, "category shares", self.shares.total())
    }
}
