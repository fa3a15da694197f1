//! Bonoloto draw engine: 6/49 six days a week, no special pool.

use std::any::Any;

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, BonolotoConfig},
    engine::{selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, JackpotState},
    error::SimResult,
    rng::DrawRng,
    selection::PlayerSelection,
    six49::{self, Sampling, SixFortyNineRules},
    types::Money,
};

pub const GAME_ID: &str = "bonoloto";

pub struct BonolotoEngine {
    config: BonolotoConfig,
    state: JackpotState,
}

impl BonolotoEngine {
    pub fn new(config: BonolotoConfig) -> Self {
        Self {
            config,
            state: JackpotState::default(),
        }
    }
}

impl DrawEngine for BonolotoEngine {
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
        let PlayerSelection::Bonoloto { main, reintegro } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if selection.is_complete() {
            Some((main.as_slice(), *reintegro))
        } else {
            log::warn!("bonoloto: malformed selection {main:?} R{reintegro}; scoring as no match");
            None
        };

        let rules = SixFortyNineRules {
            game: GAME_ID,
            economy: &self.config.economy,
            reintegro_pct: self.config.reintegro_pct,
            fixed_three: self.config.fixed_three,
            shares: &self.config.shares,
            guarantee: self.config.jackpot.guarantee,
            special_rate: None,
            sampling: Sampling::ConditionalBinomial,
        };
        let outcome = six49::run(&rules, &mut self.state, ticket, ctx, rng);

        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Bonoloto(outcome.draw),
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
