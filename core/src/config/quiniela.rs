//! La Quiniela: 14 football signs plus the Pleno al 15.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{check_economy, check_unit_sum, invalid, Economy, Shares};
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuinielaConfig {
    pub economy: Economy,
    pub matches: usize,
    /// Shares of the prize fund, top-down.
    pub shares: Shares,
    /// Outcome probabilities for 1, X, 2. Bettors pick with the same
    /// popularity.
    pub sign_probs: [f64; 3],
    /// Goal-bucket probabilities for 0, 1, 2, M.
    pub goal_probs: [f64; 4],
    /// Unit prizes below this are not paid.
    pub min_unit_prize: Money,
}

impl Default for QuinielaConfig {
    fn default() -> Self {
        Self {
            economy: Economy {
                price_per_draw: 0.75,
                prize_fund_pct: 0.55,
                draw_days: vec![Weekday::Sun],
                world_bets: WorldBetsModel::flat(5_000_000.0, 2_000_000.0, 12_000_000.0)
                    .with_jackpot_bump(1_000_000.0, 0.30),
            },
            matches: 14,
            shares: Shares::from_pairs(&[
                ("15", 0.18),
                ("14", 0.22),
                ("13", 0.145),
                ("12", 0.145),
                ("11", 0.145),
                ("10", 0.165),
            ]),
            sign_probs: [0.45, 0.29, 0.26],
            goal_probs: [0.25, 0.35, 0.23, 0.17],
            min_unit_prize: 1.0,
        }
    }
}

impl QuinielaConfig {
    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "quiniela";
        check_economy(GAME, &self.economy)?;
        if self.matches < 10 {
            return Err(invalid(GAME, "at least 10 matches are needed for the lowest category"));
        }
        check_unit_sum(GAME, "sign probabilities", self.sign_probs.iter().sum())?;
        check_unit_sum(GAME, "goal probabilities", self.goal_probs.iter().sum())?;
        check_unit_sum(GAME, "category shares", self.shares.total())
    }
}
