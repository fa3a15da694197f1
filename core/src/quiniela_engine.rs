//! La Quiniela draw engine.
//!
//! Fourteen 1/X/2 signs plus the Pleno al 15 score. World bettors are
//! assumed to pick each sign with the same popularity the outcomes
//! have, so a bettor hits match i with probability `sign_probs[o_i]`
//! and the number of hits follows a Poisson-binomial law.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, QuinielaConfig},
    engine::{
        resolve_player, selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats,
        JackpotState, PlayerResult,
    },
    error::SimResult,
    pools::{self, Carry, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    selection::{Goals, PlayerSelection, Score, Sign},
    stats,
    types::Money,
};

pub const GAME_ID: &str = "quiniela";

/// Sign categories by number of misses.
const BY_MISSES: [&str; 5] = ["14", "13", "12", "11", "10"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuinielaDraw {
    pub signs: Vec<Sign>,
    pub pleno: Score,
}

impl QuinielaDraw {
    pub fn generate(rng: &mut DrawRng, cfg: &QuinielaConfig) -> Self {
        let signs = (0..cfg.matches)
            .map(|_| Sign::ALL[stats::weighted_index(rng, &cfg.sign_probs)])
            .collect();
        let pleno = (
            Goals::ALL[stats::weighted_index(rng, &cfg.goal_probs)],
            Goals::ALL[stats::weighted_index(rng, &cfg.goal_probs)],
        );
        Self { signs, pleno }
    }

    /// (main category, sign hits). Pleno only counts on top of a full
    /// house of signs.
    pub fn score(&self, signs: &[Sign], pleno: Score) -> (Option<&'static str>, u32) {
        let hits = signs.iter().zip(&self.signs).filter(|(a, b)| a == b).count();
        let misses = self.signs.len().saturating_sub(hits);
        let category = match BY_MISSES.get(misses) {
            Some(&"14") if pleno == self.pleno => Some("15"),
            other => other.copied(),
        };
        (category, hits as u32)
    }
}

/// Probability a world bet lands in "14", "13", "12", "11", "10".
pub fn category_probs(cfg: &QuinielaConfig, draw: &QuinielaDraw) -> [f64; 5] {
    let per_match: Vec<f64> = draw.signs.iter().map(|s| cfg.sign_probs[s.index()]).collect();
    let dist = stats::poisson_binomial(&per_match);
    let n = per_match.len();
    let mut probs = [0.0; 5];
    for (misses, p) in probs.iter_mut().enumerate() {
        *p = n.checked_sub(misses).and_then(|k| dist.get(k)).copied().unwrap_or(0.0);
    }
    probs
}

pub struct QuinielaEngine {
    config: QuinielaConfig,
    state: JackpotState,
}

impl QuinielaEngine {
    pub fn new(config: QuinielaConfig) -> Self {
        Self {
            config,
            state: JackpotState::default(),
        }
    }
}

fn run_draw(
    cfg: &QuinielaConfig,
    state: &mut JackpotState,
    ticket: Option<(&[Sign], Score)>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (QuinielaDraw, DrawStats, PlayerResult) {
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

    let draw = QuinielaDraw::generate(rng, cfg);
    let (category, hits) = match ticket {
        Some((signs, pleno)) => draw.score(signs, pleno),
        None => (None, 0),
    };
    let full_house = matches!(category, Some("15") | Some("14"));

    let counts = stats::exclusive_counts(rng, bets.bets_world, &category_probs(cfg, &draw));
    let (home, away) = draw.pleno;
    let pleno_prob = cfg.goal_probs[home.index()] * cfg.goal_probs[away.index()];
    let world_pleno = stats::binomial(rng, counts[0], pleno_prob);

    let share = |id: &str| cfg.shares.get(id) * prize_fund;
    let mut tiers = vec![
        PrizeTier::parimutuel("15", share("15") + state.jackpot, world_pleno, category == Some("15")),
        PrizeTier::parimutuel("14", share("14"), counts[0], full_house),
    ];
    for (id, winners) in BY_MISSES[1..].iter().zip(&counts[1..]) {
        tiers.push(PrizeTier::parimutuel(*id, share(*id), *winners, category == Some(*id)));
    }

    let lower = Rollover::Nearest {
        upward: true,
        otherwise: Sink::Jackpot,
    };
    let mut carry = Carry::default();
    carry.add(pools::roll_unclaimed(
        &mut tiers,
        &[
            ("15", Rollover::Sink(Sink::Jackpot)),
            ("14", Rollover::Sink(Sink::Jackpot)),
            ("13", lower),
            ("12", lower),
            ("11", lower),
            ("10", lower),
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

    let pools_in = match category {
        Some("15") => vec!["14", "15"],
        Some(c) => vec![c],
        None => Vec::new(),
    };
    let player = resolve_player(&categories, category, pools_in, hits, 0.0);

    log::debug!(
        "quiniela {}: bets={} fourteen={} jackpot {:.0} -> {:.0}",
        ctx.date,
        bets.bets_total,
        counts[0],
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
        jackpot_category: jackpot_won.then(|| "15".to_string()),
        categories,
        ledger,
        ..DrawStats::default()
    };
    (draw, stats, player)
}

impl DrawEngine for QuinielaEngine {
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
        let PlayerSelection::Quiniela { signs, pleno } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if signs.len() == self.config.matches {
            Some((signs.as_slice(), *pleno))
        } else {
            log::warn!(
                "quiniela: {} signs given, {} needed; scoring as no match",
                signs.len(),
                self.config.matches
            );
            None
        };
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, ticket, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Quiniela(draw),
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
