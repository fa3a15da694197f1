//! EuroDreams: 6 of 40 plus 1 dream of 5, with fixed annuity-style
//! top prizes backed by a reserve fund.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_at_most_one, check_economy, check_fraction, check_unit_sum, invalid, Economy, Shares};
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EuroDreamsConfig {
    pub economy: Economy,
    /// Prize-fund share earmarked for the two fixed top categories.
    pub fixed_allotment_pct: f64,
    /// Prize-fund share paid into the reserve every draw.
    pub reserve_pct: f64,
    /// 20,000 a month for 30 years.
    pub first_prize: Money,
    /// 2,000 a month for 5 years.
    pub second_prize: Money,
    /// Fixed prize for 2 hits.
    pub fixed_two: Money,
    /// Most "6+1" winners paid in full; beyond that the capped
    /// liability is shared.
    pub first_prize_max_winners: u64,
    /// Pari-mutuel split of the remaining fund.
    pub shares: Shares,
    pub initial_reserve: Money,
}

impl Default for EuroDreamsConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 2.50,
                prize_fund_pct: 0.52,
                draw_days: vec![Weekday::Mon, Weekday::Thu],
                world_bets: WorldBetsModel::flat(2_000_000.0, 1_000_000.0, 6_000_000.0)
                    .with_jackpot_bump(1.0, 0.0),
            },
            fixed_allotment_pct: 0.32,
            reserve_pct: 0.05,
            first_prize: 7_200_000.0,
            second_prize: 120_000.0,
            fixed_two: 2.50,
            first_prize_max_winners: 5,
            shares: Shares::from_pairs(&[("5", 0.20), ("4", 0.30), ("3", 0.50)]),
            initial_reserve: 2_000_000.0,
        }
    }
}

impl EuroDreamsConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "eurodreams";
        check_economy(GAME, &self.economy)?;
        check_fraction(GAME, "fixed_allotment_pct", self.fixed_allotment_pct)?;
        check_fraction(GAME, "reserve_pct", self.reserve_pct)?;
        check_at_most_one(GAME, "allotment plus reserve", self.fixed_allotment_pct + self.reserve_pct)?;
        if self.first_prize_max_winners == 0 {
            return Err(invalid(GAME, "first_prize_max_winners must be at least 1"));
        }
        if self.initial_reserve < 0.0 {
            return Err(invalid(GAME, "initial_reserve is negative"));
        }
        check_unit_sum(GAME, "pari-mutuel shares", self.shares.total())
    }
}
