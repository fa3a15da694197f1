//! The draw engine contract and the records every engine produces.
//!
//! RULES:
//!   - An engine owns its config and an explicit, serializable state.
//!   - `run_draw` is the only thing that mutates that state.
//!   - All randomness arrives through the `DrawRng` argument.
//!   - A malformed selection scores as "no category, prize 0"; a
//!     selection for another game is a caller bug and errors.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::loteria::LoteriaKind,
    error::{SimError, SimResult},
    eurodreams_engine::EuroDreamsDraw,
    euromillones_engine::EuromillonesDraw,
    gordo_engine::GordoDraw,
    loteria_engine::LoteriaDraw,
    lototurf_engine::LototurfDraw,
    pools::{CategoryStats, Ledger},
    quiniela_engine::QuinielaDraw,
    quinigol_engine::QuinigolDraw,
    rng::DrawRng,
    selection::PlayerSelection,
    six49::SixFortyNineDraw,
    types::{DrawDate, Money},
};

/// Per-draw parameters chosen by the caller rather than the config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrawContext {
    pub date: DrawDate,
    /// Lotería Nacional draw kind. `None` lets the engine infer it
    /// from the date.
    pub loteria_kind: Option<LoteriaKind>,
}

impl DrawContext {
    pub fn on(date: DrawDate) -> Self {
        Self {
            date,
            loteria_kind: None,
        }
    }

    pub fn with_kind(mut self, kind: LoteriaKind) -> Self {
        self.loteria_kind = Some(kind);
        self
    }
}

/// What was drawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum DrawOutcome {
    Primitiva(SixFortyNineDraw),
    Bonoloto(SixFortyNineDraw),
    Euromillones(EuromillonesDraw),
    Gordo(GordoDraw),
    #[serde(rename = "eurodreams")]
    EuroDreams(EuroDreamsDraw),
    LoteriaNacional(LoteriaDraw),
    Quiniela(QuinielaDraw),
    Lototurf(LototurfDraw),
    Quinigol(QuinigolDraw),
}

/// Pool and balance bookkeeping for one draw.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DrawStats {
    pub bets_total: u64,
    pub bets_world: u64,
    pub revenue: Money,
    pub prize_fund: Money,
    pub jackpot_before: Money,
    pub jackpot_after: Money,
    pub reserve_before: Money,
    pub reserve_after: Money,
    pub reserve_debt: Money,
    /// Draws since the jackpot was last won, as seen by this draw.
    pub cycle_index: u64,
    /// Category that carried the jackpot, when it was won this draw.
    pub jackpot_category: Option<String>,
    pub categories: Vec<CategoryStats>,
    pub ledger: Ledger,
}

/// How the simulated player did.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerResult {
    /// The single main category won, if any.
    pub category: Option<String>,
    /// Main-category prize (sum over every pool the category shares).
    pub prize: Money,
    /// Reintegro/refund, independent of `category`.
    pub refund: Money,
    /// Pools the player was counted in.
    pub pools: Vec<String>,
    /// Numbers (or matches) hit.
    pub hits: u32,
    /// Free-form detail such as a substituted horse.
    pub detail: Option<String>,
}

impl PlayerResult {
    pub fn total(&self) -> Money {
        self.prize + self.refund
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawResult {
    pub game_id: String,
    pub date: DrawDate,
    pub draw: DrawOutcome,
    pub stats: DrawStats,
    pub player: PlayerResult,
}

impl DrawResult {
    pub fn category(&self, id: &str) -> Option<&CategoryStats> {
        self.stats.categories.iter().find(|c| c.id == id)
    }

    /// World winners of a category (0 if the category does not exist).
    pub fn winners(&self, id: &str) -> u64 {
        self.category(id).map(|c| c.winners_world).unwrap_or(0)
    }

    /// World winners plus the player if the player is in that pool.
    pub fn winners_effective(&self, id: &str) -> u64 {
        self.category(id).map(|c| c.winners_effective).unwrap_or(0)
    }
}

/// Jackpot, reserve and cycle counter shared by the jackpot games.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JackpotState {
    pub jackpot: Money,
    pub reserve: Money,
    /// Draws since the jackpot was last won.
    pub cycle_index: u64,
}

impl JackpotState {
    /// Lift the jackpot to `guarantee` on the first draw of a cycle.
    /// Returns the operator money added.
    pub fn open_cycle(&mut self, guarantee: Money) -> Money {
        if self.cycle_index != 0 || self.jackpot >= guarantee {
            return 0.0;
        }
        let topup = guarantee - self.jackpot;
        self.jackpot = guarantee;
        topup
    }

    /// Store the next draw's jackpot and move the cycle counter.
    pub fn close_cycle(&mut self, jackpot_won: bool, carried: Money) {
        self.jackpot = carried.max(0.0);
        if jackpot_won {
            self.cycle_index = 0;
        } else {
            self.cycle_index += 1;
        }
    }
}

/// The contract every game engine fulfils.
pub trait DrawEngine: Send {
    /// Canonical game id.
    fn game_id(&self) -> &'static str;

    /// When this game draws. `kind` only matters for Lotería Nacional.
    fn schedule(&self, kind: Option<LoteriaKind>) -> DrawSchedule;

    /// Price of one bet for the given draw.
    fn price_for(&self, ctx: &DrawContext) -> Money;

    /// Simulate one draw and advance the engine state.
    fn run_draw(&mut self, selection: &PlayerSelection, ctx: &DrawContext, rng: &mut DrawRng) -> SimResult<DrawResult>;

    fn jackpot(&self) -> Money;

    fn reserve(&self) -> Money {
        0.0
    }

    fn snapshot_state(&self) -> SimResult<serde_json::Value>;

    fn restore_state(&mut self, state: serde_json::Value) -> SimResult<()>;

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}

pub(crate) fn selection_mismatch(expected: &str, selection: &PlayerSelection) -> SimError {
    SimError::SelectionMismatch {
        expected: expected.to_string(),
        got: selection.game_id().to_string(),
    }
}

/// Sum of the player's unit prizes over the pools they share.
pub(crate) fn player_prize(categories: &[CategoryStats], pools: &[String]) -> Money {
    pools
        .iter()
        .filter_map(|p| categories.iter().find(|c| &c.id == p))
        .map(|c| c.prize_per_winner)
        .sum()
}

/// Player result for a known main category and refund.
pub(crate) fn resolve_player(
    categories: &[CategoryStats],
    category: Option<&'static str>,
    pools: Vec<&'static str>,
    hits: u32,
    refund: Money,
) -> PlayerResult {
    let pools: Vec<String> = pools.into_iter().map(str::to_string).collect();
    PlayerResult {
        category: category.map(str::to_string),
        prize: player_prize(categories, &pools),
        refund,
        pools,
        hits,
        detail: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarantee_applies_only_on_cycle_start() {
        let mut state = JackpotState::default();
        assert_eq!(state.open_cycle(1_000.0), 1_000.0);
        state.close_cycle(false, 1_500.0);
        assert_eq!(state.cycle_index, 1);
        state.jackpot = 200.0;
        assert_eq!(state.open_cycle(1_000.0), 0.0);
        state.close_cycle(true, 0.0);
        assert_eq!(state.cycle_index, 0);
        assert_eq!(state.open_cycle(1_000.0), 1_000.0);
    }
}
