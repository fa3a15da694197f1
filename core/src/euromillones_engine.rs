//! Euromillones draw engine.
//!
//! Thirteen pari-mutuel categories over a pan-European pool. A booster
//! share of every prize fund feeds a reserve that alone pays for the
//! minimum jackpot; the jackpot itself is capped and its excess spills
//! into "5+1".

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{euromillones::EUROMILLONES_CATEGORIES, loteria::LoteriaKind, EuromillonesConfig},
    engine::{
        resolve_player, selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats,
        JackpotState, PlayerResult,
    },
    error::SimResult,
    pools::{self, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    selection::PlayerSelection,
    stats,
    types::Money,
};

pub const GAME_ID: &str = "euromillones";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EuromillonesDraw {
    pub numbers: Vec<u32>,
    pub stars: Vec<u32>,
}

impl EuromillonesDraw {
    pub fn generate(rng: &mut DrawRng) -> Self {
        Self {
            numbers: stats::pick_unique(rng, 5, 1, 50),
            stars: stats::pick_unique(rng, 2, 1, 12),
        }
    }

    pub fn score(&self, main: &[u32], stars: &[u32]) -> (Option<&'static str>, u32, u32) {
        let hits = main.iter().filter(|n| self.numbers.contains(n)).count() as u32;
        let star_hits = stars.iter().filter(|s| self.stars.contains(s)).count() as u32;
        let category = EUROMILLONES_CATEGORIES
            .iter()
            .find(|(_, m, s)| *m == hits as u64 && *s == star_hits as u64)
            .map(|(id, _, _)| *id);
        (category, hits, star_hits)
    }
}

/// Single-ticket probability of each category, in table order.
pub fn category_probs() -> Vec<f64> {
    EUROMILLONES_CATEGORIES
        .iter()
        .map(|(_, m, s)| stats::prob_hits(*m, 5, 5, 50) * stats::prob_hits(*s, 2, 2, 12))
        .collect()
}

/// Unclaimed money moves one category down; the top rolls to the
/// jackpot and the bottom to the reserve.
fn rollover_rules() -> Vec<(&'static str, Rollover)> {
    let ids: Vec<&'static str> = EUROMILLONES_CATEGORIES.iter().map(|(id, _, _)| *id).collect();
    let mut rules = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        let rule = match (i, ids.get(i + 1)) {
            (0, _) => Rollover::Sink(Sink::Jackpot),
            (_, Some(next)) => Rollover::Into(*next),
            (_, None) => Rollover::Sink(Sink::Reserve),
        };
        rules.push((*id, rule));
    }
    rules
}

pub struct EuromillonesEngine {
    config: EuromillonesConfig,
    state: JackpotState,
}

impl EuromillonesEngine {
    pub fn new(config: EuromillonesConfig) -> Self {
        let state = JackpotState {
            reserve: config.initial_reserve,
            ..JackpotState::default()
        };
        Self { config, state }
    }

    pub fn state(&self) -> &JackpotState {
        &self.state
    }
}

fn run_draw(
    cfg: &EuromillonesConfig,
    state: &mut JackpotState,
    ticket: Option<(&[u32], &[u32])>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (EuromillonesDraw, DrawStats, PlayerResult) {
    let jackpot_before = state.jackpot;
    let reserve_before = state.reserve;
    let cycle_index = state.cycle_index;
    let mut ledger = Ledger {
        jackpot_in: jackpot_before,
        ..Ledger::default()
    };

    // Minimum jackpot is paid from the reserve, never by the operator.
    if state.cycle_index == 0 && state.jackpot < cfg.jackpot.guarantee {
        let lift = (cfg.jackpot.guarantee - state.jackpot).min(state.reserve);
        state.reserve -= lift;
        state.jackpot += lift;
        ledger.reserve_in += lift;
    }

    let economy = &cfg.economy;
    let bets = economy.world_bets.estimate(ctx.date, state.jackpot, rng);
    let revenue = bets.bets_total as f64 * economy.price_per_draw;
    let prize_fund = revenue * economy.prize_fund_pct;
    ledger.prize_fund = prize_fund;

    let booster = prize_fund * cfg.reserve_share;
    state.reserve += booster;
    ledger.reserve_out += booster;

    let draw = EuromillonesDraw::generate(rng);
    let (category, hits, star_hits) = match ticket {
        Some((main, stars)) => draw.score(main, stars),
        None => (None, 0, 0),
    };

    let probs = category_probs();
    let mut tiers: Vec<PrizeTier> = EUROMILLONES_CATEGORIES
        .iter()
        .zip(&probs)
        .map(|((id, _, _), p)| {
            let winners = stats::poisson(rng, bets.bets_world as f64 * p);
            PrizeTier::parimutuel(*id, cfg.shares.get(id) * prize_fund, winners, category == Some(*id))
        })
        .collect();
    tiers[0].pool += state.jackpot;

    if let Some(cap) = cfg.jackpot.cap {
        if tiers[0].pool > cap {
            let excess = tiers[0].pool - cap;
            tiers[0].pool = cap;
            tiers[1].pool += excess;
        }
    }

    let carry = pools::roll_unclaimed(&mut tiers, &rollover_rules());
    let categories = pools::settle(&tiers);

    let jackpot_won = tiers[0].winners_effective() > 0;
    ledger.paid_out = categories.iter().map(|c| c.payout).sum();
    ledger.record_carry(carry);
    state.reserve += carry.to_reserve;
    state.close_cycle(jackpot_won, carry.to_jackpot);

    let player = resolve_player(&categories, category, category.into_iter().collect(), hits + star_hits, 0.0);

    log::debug!(
        "euromillones {}: bets={} jackpot {:.0} -> {:.0} reserve {:.0}",
        ctx.date,
        bets.bets_total,
        jackpot_before,
        state.jackpot,
        state.reserve
    );

    let stats = DrawStats {
        bets_total: bets.bets_total,
        bets_world: bets.bets_world,
        revenue,
        prize_fund,
        jackpot_before,
        jackpot_after: state.jackpot,
        reserve_before,
        reserve_after: state.reserve,
        reserve_debt: 0.0,
        cycle_index,
        jackpot_category: jackpot_won.then(|| "5+2".to_string()),
        categories,
        ledger,
    };
    (draw, stats, player)
}

impl DrawEngine for EuromillonesEngine {
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
        let PlayerSelection::Euromillones { main, stars } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if selection.is_complete() {
            Some((main.as_slice(), stars.as_slice()))
        } else {
            log::warn!("euromillones: malformed selection {main:?} stars {stars:?}; scoring as no match");
            None
        };
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, ticket, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Euromillones(draw),
            stats,
            player,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_odds_match_the_official_table() {
        let p = category_probs();
        assert!((1.0 / p[0] - 139_838_160.0).abs() < 10.0);
        assert!((1.0 / p[12] - 22.0).abs() < 0.5, "2+0 is about 1 in 22");
    }

    #[test]
    fn rollover_walks_down_and_ends_in_reserve() {
        let rules = rollover_rules();
        assert_eq!(rules[0], ("5+2", Rollover::Sink(Sink::Jackpot)));
        assert_eq!(rules[1], ("5+1", Rollover::Into("5+0")));
        assert_eq!(rules[12], ("2+0", Rollover::Sink(Sink::Reserve)));
    }

    #[test]
    fn one_star_hit_without_numbers_is_no_category() {
        let draw = EuromillonesDraw {
            numbers: vec![1, 2, 3, 4, 5],
            stars: vec![1, 2],
        };
        assert_eq!(draw.score(&[10, 11, 12, 13, 14], &[1, 5]).0, None);
        assert_eq!(draw.score(&[1, 2, 12, 13, 14], &[3, 5]).0, Some("2+0"));
        assert_eq!(draw.score(&[1, 2, 3, 4, 5], &[1, 2]).0, Some("5+2"));
    }
}
