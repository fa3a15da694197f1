//! Lototurf draw engine: 6 of 31, a horse race and a reintegro.
//!
//! Each race has 1–12 runners. A player horse that does not run is
//! replaced by the nearest lower running horse, which is always the
//! last runner.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, lototurf::MAX_HORSES, LototurfConfig},
    engine::{
        resolve_player, selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats,
        JackpotState, PlayerResult,
    },
    error::SimResult,
    pools::{self, Carry, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    selection::PlayerSelection,
    six49::settle_refund_fund,
    stats,
    types::Money,
};

pub const GAME_ID: &str = "lototurf";

/// (id, numbers hit, horse hit), top-down.
const CATEGORIES: [(&str, u64, bool); 7] = [
    ("6+C", 6, true),
    ("6", 6, false),
    ("5+C", 5, true),
    ("5", 5, false),
    ("4+C", 4, true),
    ("4", 4, false),
    ("3+C", 3, true),
];

const ROLLOVER: [(&str, Rollover); 7] = [
    ("6+C", Rollover::Sink(Sink::Jackpot)),
    ("6", Rollover::Into("5+C")),
    ("5+C", Rollover::Into("5")),
    ("5", Rollover::Into("4+C")),
    ("4+C", Rollover::Into("4")),
    ("4", Rollover::Into("3+C")),
    ("3+C", Rollover::Sink(Sink::Jackpot)),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LototurfDraw {
    pub numbers: Vec<u32>,
    /// Runners in the race, numbered 1..=participants.
    pub participants: u32,
    pub horse: u32,
    pub reintegro: u32,
}

impl LototurfDraw {
    pub fn generate(rng: &mut DrawRng, cfg: &LototurfConfig) -> Self {
        let numbers = stats::pick_unique(rng, 6, 1, 31);
        let participants = stats::weighted_index(rng, &cfg.participant_weights) as u32 + 1;
        let horse = rng.range_inclusive(1, participants);
        let reintegro = rng.range_inclusive(0, 9);
        Self {
            numbers,
            participants,
            horse,
            reintegro,
        }
    }

    pub fn score(&self, main: &[u32], horse: u32) -> (Option<&'static str>, u32) {
        let hits = main.iter().filter(|n| self.numbers.contains(n)).count() as u64;
        let horse_hit = substitute_horse(horse, self.participants) == self.horse;
        let category = CATEGORIES
            .iter()
            .find(|(_, h, c)| *h == hits && *c == horse_hit)
            .map(|(id, _, _)| *id);
        (category, hits as u32)
    }
}

/// The horse a ticket actually plays: itself if running, else the
/// nearest lower runner. Runners are always 1..=participants, so that
/// is the last one.
pub fn substitute_horse(horse: u32, participants: u32) -> u32 {
    horse.clamp(1, MAX_HORSES).min(participants.clamp(1, MAX_HORSES))
}

/// Single-ticket category probabilities given the number of runners.
pub fn category_probs(participants: u32) -> Vec<f64> {
    let horse = 1.0 / participants.max(1) as f64;
    CATEGORIES
        .iter()
        .map(|(_, hits, c)| stats::prob_hits(*hits, 6, 6, 31) * if *c { horse } else { 1.0 - horse })
        .collect()
}

pub struct LototurfEngine {
    config: LototurfConfig,
    state: JackpotState,
}

impl LototurfEngine {
    pub fn new(config: LototurfConfig) -> Self {
        Self {
            config,
            state: JackpotState::default(),
        }
    }
}

fn run_draw(
    cfg: &LototurfConfig,
    state: &mut JackpotState,
    ticket: Option<(&[u32], u32, u32)>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (LototurfDraw, DrawStats, PlayerResult) {
    let economy = &cfg.economy;
    let jackpot_before = state.jackpot;
    let reserve_before = state.reserve;
    let cycle_index = state.cycle_index;
    let mut ledger = Ledger {
        jackpot_in: jackpot_before,
        topup: state.open_cycle(cfg.jackpot.guarantee),
        ..Ledger::default()
    };

    let bets = economy.world_bets.estimate(ctx.date, state.jackpot, rng);
    let revenue = bets.bets_total as f64 * economy.price_per_draw;
    let prize_fund = revenue * economy.prize_fund_pct;
    let reintegro_fund = revenue * cfg.reintegro_pct;
    ledger.prize_fund = prize_fund;

    let draw = LototurfDraw::generate(rng, cfg);
    let (category, hits, reintegro_hit, played_horse) = match ticket {
        Some((main, horse, reintegro)) => {
            let (category, hits) = draw.score(main, horse);
            (category, hits, reintegro == draw.reintegro, Some((horse, substitute_horse(horse, draw.participants))))
        }
        None => (None, 0, false, None),
    };

    let counts = stats::exclusive_counts(rng, bets.bets_world, &category_probs(draw.participants));
    let world_reintegro = stats::binomial(rng, bets.bets_world, 0.1);

    let refund = if reintegro_hit { economy.price_per_draw } else { 0.0 };
    let refunds = world_reintegro as f64 * economy.price_per_draw + refund;
    settle_refund_fund(state, reintegro_fund, refunds, &mut ledger);

    let split_fund = (prize_fund - reintegro_fund).max(0.0);
    let mut tiers: Vec<PrizeTier> = CATEGORIES
        .iter()
        .zip(&counts)
        .map(|((id, _, _), winners)| {
            PrizeTier::parimutuel(*id, cfg.shares.get(id) * split_fund, *winners, category == Some(*id))
        })
        .collect();
    tiers[0].pool += state.jackpot;

    let mut carry = Carry::default();
    carry.add(pools::roll_unclaimed(&mut tiers, &ROLLOVER));
    let ids: Vec<&'static str> = CATEGORIES.iter().map(|(id, _, _)| *id).collect();
    pools::enforce_monotonic(&mut tiers, &ids);
    let categories = pools::settle(&tiers);

    let jackpot_won = tiers[0].winners_effective() > 0;
    ledger.paid_out = categories.iter().map(|c| c.payout).sum::<Money>() + refunds;
    ledger.record_carry(carry);
    state.reserve += carry.to_reserve;
    state.close_cycle(jackpot_won, carry.to_jackpot);

    let mut player = resolve_player(&categories, category, category.into_iter().collect(), hits, refund);
    if let Some((chosen, played)) = played_horse {
        if chosen != played {
            player.detail = Some(format!("horse {chosen} not running; plays {played}"));
        }
    }

    log::debug!(
        "lototurf {}: bets={} runners={} jackpot {:.0} -> {:.0}",
        ctx.date,
        bets.bets_total,
        draw.participants,
        jackpot_before,
        state.jackpot
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
        jackpot_category: jackpot_won.then(|| "6+C".to_string()),
        categories,
        ledger,
    };
    (draw, stats, player)
}

impl DrawEngine for LototurfEngine {
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
        let PlayerSelection::Lototurf { main, horse, reintegro } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if selection.is_complete() {
            Some((main.as_slice(), *horse, *reintegro))
        } else {
            log::warn!("lototurf: malformed selection {main:?} horse {horse}; scoring as no match");
            None
        };
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, ticket, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Lototurf(draw),
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
    fn missing_horse_falls_to_nearest_lower_runner() {
        assert_eq!(substitute_horse(11, 8), 8);
        assert_eq!(substitute_horse(5, 8), 5);
        assert_eq!(substitute_horse(12, 12), 12);
        assert_eq!(substitute_horse(1, 1), 1);
        assert_eq!(substitute_horse(12, 1), 1);
        assert_eq!(substitute_horse(0, 8), 1);
    }

    #[test]
    fn winning_horse_is_always_a_runner() {
        let cfg = LototurfConfig::default();
        for seed in 0..300 {
            let draw = LototurfDraw::generate(&mut DrawRng::new(seed), &cfg);
            assert!((1..=MAX_HORSES).contains(&draw.participants));
            assert!(draw.horse >= 1 && draw.horse <= draw.participants);
        }
    }

    #[test]
    fn substituted_horse_can_win_the_horse_categories() {
        let draw = LototurfDraw {
            numbers: vec![1, 2, 3, 4, 5, 6],
            participants: 8,
            horse: 8,
            reintegro: 0,
        };
        assert_eq!(draw.score(&[1, 2, 3, 10, 11, 12], 11), (Some("3+C"), 3));
        assert_eq!(draw.score(&[1, 2, 3, 10, 11, 12], 7), (None, 3));
    }
}
