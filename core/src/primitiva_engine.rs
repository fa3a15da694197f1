//! La Primitiva draw engine.
//!
//! Pays a "6R" special pool to jackpot winners who also hit the
//! reintegro; they share both the "6" and "6R" pools. World winners
//! are independent Poisson draws per category.

use std::any::Any;

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, PrimitivaConfig},
    engine::{selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, JackpotState},
    error::SimResult,
    rng::DrawRng,
    selection::PlayerSelection,
    six49::{self, Sampling, SixFortyNineRules},
    types::Money,
};

pub const GAME_ID: &str = "primitiva";

pub struct PrimitivaEngine {
    config: PrimitivaConfig,
    state: JackpotState,
}

impl PrimitivaEngine {
    pub fn new(config: PrimitivaConfig) -> Self {
        Self {
            config,
            state: JackpotState::default(),
        }
    }

    pub fn state(&self) -> &JackpotState {
        &self.state
    }
}

impl DrawEngine for PrimitivaEngine {
    fn game_id(&self) -> &'static str {
        GAME_ID
    }

    fn schedule(&self, _kind: Option<LoteriaKind>) -> DrawSchedule {
        DrawSchedule::Weekly(self.config.economy.draw_days.clone())
    }

    fn price_for(&self, _ctx: &DrawContext) -> Money {
        self.config.economy.price_per_draw
    }

    fn run_draw(&mut self, selection: &PlayerSelection, ctx: &DrawContext, rng: &mut DrawRng) -> SimResult<DrawResult> {
        let PlayerSelection::Primitiva { main, reintegro } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if selection.is_complete() {
            Some((main.as_slice(), *reintegro))
        } else {
            log::warn!("primitiva: malformed selection {main:?} R{reintegro}; scoring as no match");
            None
        };

        let rules = SixFortyNineRules {
            game: GAME_ID,
            economy: &self.config.economy,
            reintegro_pct: self.config.reintegro_pct,
            fixed_three: self.config.fixed_three,
            shares: &self.config.shares,
            guarantee: self.config.jackpot.guarantee,
            special_rate: Some(self.config.special_rate),
            sampling: Sampling::IndependentPoisson,
        };
        let outcome = six49::run(&rules, &mut self.state, ticket, ctx, rng);

        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Primitiva(outcome.draw),
            stats: outcome.stats,
            player: outcome.player,
        })
    }

    fn jackpot(&self) -> Money {
        self.state.jackpot
    }

    fn reserve(&self) -> Money {
        self.state.reserve
    }

    fn snapshot_state(&self) -> SimResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn restore_state(&mut self, state: serde_json::Value) -> SimResult<()> {
        self.state = serde_json::from_value(state)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
