//! Euromillones: 5 of 50 plus 2 stars of 12, pooled across Europe.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_fraction, check_unit_sum, Economy, JackpotRules, Shares};
use crate::{economy::WorldBetsModel, error::SimResult};

/// Category ids top-down, as (main hits, star hits).
pub const EUROMILLONES_CATEGORIES: [(&str, u64, u64); 13] = [
    ("5+2", 5, 2),
    ("5+1", 5, 1),
    ("5+0", 5, 0),
    ("4+2", 4, 2),
    ("4+1", 4, 1),
    ("3+2", 3, 2),
    ("4+0", 4, 0),
    ("2+2", 2, 2),
    ("3+1", 3, 1),
    ("3+0", 3, 0),
    ("1+2", 1, 2),
    ("2+1", 2, 1),
    ("2+0", 2, 0),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EuromillonesConfig {
    pub economy: Economy,
    /// Category shares of the prize fund.
    pub shares: Shares,
    /// Booster share of the prize fund paid into the reserve.
    pub reserve_share: f64,
    pub jackpot: JackpotRules,
    pub initial_reserve: f64,
}

impl Default for EuromillonesConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 2.20,
                prize_fund_pct: 0.50,
                draw_days: vec![Weekday::Tue, Weekday::Fri],
                world_bets: WorldBetsModel::flat(30_000_000.0, 15_000_000.0, 200_000_000.0)
                    .with_weekday(Weekday::Tue, 28_000_000.0)
                    .with_weekday(Weekday::Fri, 38_000_000.0)
                    .with_jackpot_bump(50_000_000.0, 0.60),
            },
            shares: Shares::from_pairs(&[
                ("5+2", 0.50),
                ("5+1", 0.0261),
                ("5+0", 0.0061),
                ("4+2", 0.0019),
                ("4+1", 0.0035),
                ("3+2", 0.0037),
                ("4+0", 0.0026),
                ("2+2", 0.0130),
                ("3+1", 0.0145),
                ("3+0", 0.0270),
                ("1+2", 0.0327),
                ("2+1", 0.1030),
                ("2+0", 0.1609),
            ]),
            reserve_share: 0.1050,
            jackpot: JackpotRules {
                guarantee: 17_000_000.0,
                cap: Some(250_000_000.0),
            },
            initial_reserve: 20_000_000.0,
        }
    }
}

impl EuromillonesConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "euromillones";
        check_economy(GAME, &self.economy)?;
        check_fraction(GAME, "reserve_share", self.reserve_share)?;
        check_unit_sum(GAME, "category shares plus reserve", self.shares.total() + self.reserve_share)
    }
}
