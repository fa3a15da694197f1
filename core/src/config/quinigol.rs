//! Quinigol: exact scores (0/1/2/M per team) for six matches.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_unit_sum, invalid, Economy, Shares};
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuinigolConfig {
    pub economy: Economy,
    pub matches: usize,
    pub shares: Shares,
    /// Goal-bucket probabilities for 0, 1, 2, M.
    pub goal_probs: [f64; 4],
    pub min_unit_prize: Money,
}

impl Default for QuinigolConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 1.0,
                prize_fund_pct: 0.55,
                draw_days: vec![Weekday::Sun],
                world_bets: WorldBetsModel::flat(250_000.0, 100_000.0, 800_000.0)
                    .with_jackpot_bump(500_000.0, 0.30),
            },
            matches: 6,
            shares: Shares::from_pairs(&[("6", 0.18), ("5", 0.165), ("4", 0.145), ("3", 0.145), ("2", 0.365)]),
            goal_probs: [0.25, 0.35, 0.23, 0.17],
            min_unit_prize: 1.0,
        }
    }
}

impl QuinigolConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "quinigol";
        check_economy(GAME, &self.economy)?;
        if self.matches < 6 {
            return Err(invalid(GAME, "six matches are needed for the top category"));
        }
        check_unit_sum(GAME, "goal probabilities", self.goal_probs.iter().sum())?;
        check_unit_sum(GAME, "category shares", self.shares.total())
    }
}
