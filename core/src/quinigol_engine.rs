//! Quinigol draw engine: exact scores for six matches.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, QuinigolConfig},
    engine::{
        resolve_player, selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats,
        JackpotState, PlayerResult,
    },
    error::SimResult,
    pools::{self, Carry, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    selection::{Goals, PlayerSelection, Score},
    stats,
    types::Money,
};

pub const GAME_ID: &str = "quinigol";

const BY_MISSES: [&str; 5] = ["6", "5", "4", "3", "2"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuinigolDraw {
    pub scores: Vec<Score>,
}

impl QuinigolDraw {
    pub fn generate(rng: &mut DrawRng, cfg: &QuinigolConfig) -> Self {
        let mut goals = || Goals::ALL[stats::weighted_index(rng, &cfg.goal_probs)];
        let scores = (0..cfg.matches).map(|_| (goals(), goals())).collect();
        Self { scores }
    }

    pub fn score(&self, scores: &[Score]) -> (Option<&'static str>, u32) {
        let hits = scores.iter().zip(&self.scores).filter(|(a, b)| a == b).count();
        let misses = self.scores.len().saturating_sub(hits);
        (BY_MISSES.get(misses).copied(), hits as u32)
    }
}

/// Probability a world bet lands in "6", "5", "4", "3", "2".
pub fn category_probs(cfg: &QuinigolConfig, draw: &QuinigolDraw) -> [f64; 5] {
    let per_match: Vec<f64> = draw
        .scores
        .iter()
        .map(|(home, away)| cfg.goal_probs[home.index()] * cfg.goal_probs[away.index()])
        .collect();
    let dist = stats::poisson_binomial(&per_match);
    let n = per_match.len();
    let mut probs = [0.0; 5];
    for (misses, p) in probs.iter_mut().enumerate() {
        *p = n.checked_sub(misses).and_then(|k| dist.get(k)).copied().unwrap_or(0.0);
    }
    probs
}

pub struct QuinigolEngine {
    config: QuinigolConfig,
    state: JackpotState,
}

impl QuinigolEngine {
    pub fn new(config: QuinigolConfig) -> Self {
        Self {
            config,
            state: JackpotState::default(),
        }
    }
}

fn run_draw(
    cfg: &QuinigolConfig,
    state: &mut JackpotState,
    ticket: Option<&[Score]>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (QuinigolDraw, DrawStats, PlayerResult) {
    let economy = &cfg.economy;
    let jackpot_before = state.jackpot;
    let cycle_index = state.cycle_index;
    let mut ledger = Ledger {
        jackpot_in: jackpot_before,
        ..Ledger::default()
    };

    let bets = economy.world_bets.estimate(ctx.date, state.jackpot, rng);
    let revenue = bets.bets_total as f64 * economy.price_per_draw;
    let prize_fund = revenue * economy.prize_fund_pct;
    ledger.prize_fund = prize_fund;

    let draw = QuinigolDraw::generate(rng, cfg);
    let (category, hits) = ticket.map(|s| draw.score(s)).unwrap_or((None, 0));
    let counts = stats::exclusive_counts(rng, bets.bets_world, &category_probs(cfg, &draw));

    let mut tiers: Vec<PrizeTier> = BY_MISSES
        .iter()
        .zip(&counts)
        .map(|(id, winners)| {
            PrizeTier::parimutuel(*id, cfg.shares.get(id) * prize_fund, *winners, category == Some(*id))
        })
        .collect();
    tiers[0].pool += state.jackpot;

    let lower = Rollover::Nearest {
        upward: true,
        otherwise: Sink::Jackpot,
    };
    let mut carry = Carry::default();
    carry.add(pools::roll_unclaimed(
        &mut tiers,
        &[
            ("6", Rollover::Sink(Sink::Jackpot)),
            ("5", lower),
            ("4", lower),
            ("3", lower),
            ("2", lower),
        ],
    ));
    carry.add(pools::enforce_min_unit(&mut tiers, cfg.min_unit_prize, true, Sink::Jackpot));
    pools::enforce_monotonic(&mut tiers, &BY_MISSES);
    let categories = pools::settle(&tiers);

    let jackpot_won = tiers[0].winners_effective() > 0;
    ledger.paid_out = categories.iter().map(|c| c.payout).sum();
    ledger.record_carry(carry);
    state.reserve += carry.to_reserve;
    state.close_cycle(jackpot_won, carry.to_jackpot);

    let player = resolve_player(&categories, category, category.into_iter().collect(), hits, 0.0);

    log::debug!(
        "quinigol {}: bets={} jackpot {:.0} -> {:.0}",
        ctx.date,
        bets.bets_total,
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
        cycle_index,
        jackpot_category: jackpot_won.then(|| "6".to_string()),
        categories,
        ledger,
        ..DrawStats::default()
    };
    (draw, stats, player)
}

impl DrawEngine for QuinigolEngine {
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
        let PlayerSelection::Quinigol { scores } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if scores.len() == self.config.matches {
            Some(scores.as_slice())
        } else {
            log::warn!("quinigol: {} scores given, {} needed; scoring as no match", scores.len(), self.config.matches);
            None
        };
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, ticket, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Quinigol(draw),
            stats,
            player,
        })
    }

    fn jackpot(&self) -> Money {
        self.state.jackpot
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
    fn one_exact_score_is_no_category() {
        let draw = QuinigolDraw {
            scores: vec![(Goals::One, Goals::Zero); 6],
        };
        let mut pick = vec![(Goals::Zero, Goals::Zero); 6];
        pick[0] = (Goals::One, Goals::Zero);
        assert_eq!(draw.score(&pick), (None, 1));
        pick[1] = (Goals::One, Goals::Zero);
        assert_eq!(draw.score(&pick), (Some("2"), 2));
        assert_eq!(draw.score(&draw.scores), (Some("6"), 6));
    }

    #[test]
    fn category_probs_are_a_sub_distribution() {
        let cfg = QuinigolConfig::default();
        let mut rng = DrawRng::new(5);
        let draw = QuinigolDraw::generate(&mut rng, &cfg);
        let total: f64 = category_probs(&cfg, &draw).iter().sum();
        assert!(total > 0.0 && total < 1.0, "total {total}");
    }
}
