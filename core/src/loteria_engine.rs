//! Lotería Nacional draw engine.
//!
//! Prizes are fixed amounts per décimo, so there is no pool to split:
//! each draw builds its list of prize lines (a category, an amount and
//! the numbers it covers), counts world winners among the décimos
//! sold, and awards the player the single best line plus any
//! reintegro.

use std::{any::Any, collections::BTreeSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{
        loteria::{LoteriaKind, NavidadPrizes, NinoPrizes, OrdinaryPrizes, NUMBERS},
        LoteriaConfig,
    },
    engine::{selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats, PlayerResult},
    error::SimResult,
    pools::{self, Ledger, PrizeTier},
    rng::DrawRng,
    selection::PlayerSelection,
    stats,
    types::{DrawDate, Money},
};

pub const GAME_ID: &str = "loteria_nacional";

/// Category id of the reintegro line.
pub const REINTEGRO: &str = "R";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoteriaDraw {
    pub kind: Option<LoteriaKind>,
    pub first: u32,
    pub second: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fourth: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fifth: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pedrea: Vec<u32>,
    /// Niño extractions: terminations of 4, 3 and 2 digits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub four_digit: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_digit: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub two_digit: Vec<u32>,
    /// Winning last digits.
    pub reintegros: Vec<u32>,
}

/// Which numbers a prize line covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Exact(u32),
    /// The numbers either side of a prize, wrapping 99999 ↔ 00000.
    Approx(u32),
    /// The other 99 numbers of the prize's hundred.
    Centena(u32),
    /// Last `digits` digits equal `value`.
    Ending { value: u32, digits: u32 },
}

impl Matcher {
    pub fn matches(&self, number: u32) -> bool {
        match *self {
            Self::Exact(n) => number == n,
            Self::Approx(n) => number == (n + 1) % NUMBERS || number == (n + NUMBERS - 1) % NUMBERS,
            Self::Centena(n) => number / 100 == n / 100 && number != n,
            Self::Ending { value, digits } => number % 10u32.pow(digits) == value,
        }
    }

    /// How many of the 100,000 numbers this matcher covers.
    pub fn coverage(&self) -> u64 {
        match *self {
            Self::Exact(_) => 1,
            Self::Approx(_) => 2,
            Self::Centena(_) => 99,
            Self::Ending { digits, .. } => u64::from(NUMBERS / 10u32.pow(digits)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrizeLine {
    pub id: &'static str,
    /// Prize per décimo.
    pub prize: Money,
    pub targets: Vec<Matcher>,
}

impl PrizeLine {
    fn new(id: &'static str, prize: Money, targets: Vec<Matcher>) -> Self {
        Self { id, prize, targets }
    }

    pub fn matches(&self, number: u32) -> bool {
        self.targets.iter().any(|m| m.matches(number))
    }

    pub fn coverage(&self) -> u64 {
        self.targets.iter().map(Matcher::coverage).sum()
    }
}

/// Distinct numbers below `limit` not already in `taken`.
fn draw_distinct(rng: &mut DrawRng, count: usize, limit: u32, taken: &mut BTreeSet<u32>) -> Vec<u32> {
    let mut out = Vec::with_capacity(count);
    let free = (limit as usize).saturating_sub(taken.len());
    while out.len() < count.min(free) {
        let n = rng.range_inclusive(0, limit - 1);
        if taken.insert(n) {
            out.push(n);
        }
    }
    out
}

/// Reintegro digits: the first prize's last digit plus `extra` others.
fn reintegros(rng: &mut DrawRng, first: u32, extra: usize) -> Vec<u32> {
    let mut taken = BTreeSet::from([first % 10]);
    let mut digits = vec![first % 10];
    digits.extend(draw_distinct(rng, extra, 10, &mut taken));
    digits
}

fn ending_lines(digits: &[u32]) -> Vec<Matcher> {
    digits.iter().map(|&value| Matcher::Ending { value, digits: 1 }).collect()
}

pub fn ordinary_draw(rng: &mut DrawRng, kind: LoteriaKind, prizes: &OrdinaryPrizes) -> (LoteriaDraw, Vec<PrizeLine>) {
    let mut taken = BTreeSet::new();
    let top = draw_distinct(rng, 2, NUMBERS, &mut taken);
    let (first, second) = (top[0], top[1]);
    let draw = LoteriaDraw {
        kind: Some(kind),
        first,
        second,
        reintegros: reintegros(rng, first, prizes.extra_reintegros),
        ..LoteriaDraw::default()
    };
    let lines = vec![
        PrizeLine::new("1", prizes.first, vec![Matcher::Exact(first)]),
        PrizeLine::new("2", prizes.second, vec![Matcher::Exact(second)]),
        PrizeLine::new("approx_1", prizes.approx_first, vec![Matcher::Approx(first)]),
        PrizeLine::new("approx_2", prizes.approx_second, vec![Matcher::Approx(second)]),
        PrizeLine::new("centena_1", prizes.centena_first, vec![Matcher::Centena(first)]),
        PrizeLine::new("centena_2", prizes.centena_second, vec![Matcher::Centena(second)]),
        PrizeLine::new("last3_1", prizes.last3_first, vec![Matcher::Ending { value: first % 1_000, digits: 3 }]),
        PrizeLine::new("last2_1", prizes.last2_first, vec![Matcher::Ending { value: first % 100, digits: 2 }]),
        PrizeLine::new(REINTEGRO, prizes.reintegro, ending_lines(&draw.reintegros)),
    ];
    (draw, lines)
}

pub fn navidad_draw(rng: &mut DrawRng, prizes: &NavidadPrizes) -> (LoteriaDraw, Vec<PrizeLine>) {
    let mut taken = BTreeSet::new();
    let top = draw_distinct(rng, 3, NUMBERS, &mut taken);
    let fourth = draw_distinct(rng, prizes.fourth_count, NUMBERS, &mut taken);
    let fifth = draw_distinct(rng, prizes.fifth_count, NUMBERS, &mut taken);
    let pedrea = draw_distinct(rng, prizes.pedrea_count, NUMBERS, &mut taken);
    let (first, second, third) = (top[0], top[1], top[2]);

    let exact = |numbers: &[u32]| numbers.iter().map(|&n| Matcher::Exact(n)).collect::<Vec<_>>();
    let last2 = |n: u32| Matcher::Ending { value: n % 100, digits: 2 };
    let lines = vec![
        PrizeLine::new("1", prizes.first, vec![Matcher::Exact(first)]),
        PrizeLine::new("2", prizes.second, vec![Matcher::Exact(second)]),
        PrizeLine::new("3", prizes.third, vec![Matcher::Exact(third)]),
        PrizeLine::new("4", prizes.fourth, exact(&fourth)),
        PrizeLine::new("5", prizes.fifth, exact(&fifth)),
        PrizeLine::new("pedrea", prizes.pedrea, exact(&pedrea)),
        PrizeLine::new("approx_1", prizes.approx_first, vec![Matcher::Approx(first)]),
        PrizeLine::new("approx_2", prizes.approx_second, vec![Matcher::Approx(second)]),
        PrizeLine::new("approx_3", prizes.approx_third, vec![Matcher::Approx(third)]),
        PrizeLine::new(
            "centena",
            prizes.centena,
            [first, second, third].iter().chain(&fourth).map(|&n| Matcher::Centena(n)).collect(),
        ),
        PrizeLine::new("last2", prizes.last2, vec![last2(first), last2(second), last2(third)]),
        PrizeLine::new(REINTEGRO, prizes.reintegro, ending_lines(&[first % 10])),
    ];
    let draw = LoteriaDraw {
        kind: Some(LoteriaKind::Navidad),
        first,
        second,
        third: Some(third),
        fourth,
        fifth,
        pedrea,
        reintegros: vec![first % 10],
        ..LoteriaDraw::default()
    };
    (draw, lines)
}

pub fn nino_draw(rng: &mut DrawRng, prizes: &NinoPrizes) -> (LoteriaDraw, Vec<PrizeLine>) {
    let mut taken = BTreeSet::new();
    let top = draw_distinct(rng, 3, NUMBERS, &mut taken);
    let (first, second, third) = (top[0], top[1], top[2]);
    let four_digit = draw_distinct(rng, prizes.four_digit_count, 10_000, &mut BTreeSet::new());
    let three_digit = draw_distinct(rng, prizes.three_digit_count, 1_000, &mut BTreeSet::new());
    let two_digit = draw_distinct(rng, prizes.two_digit_count, 100, &mut BTreeSet::new());
    let reintegro_digits = reintegros(rng, first, prizes.reintegro_count.saturating_sub(1));

    let endings = |values: &[u32], digits: u32| {
        values
            .iter()
            .map(|&value| Matcher::Ending { value, digits })
            .collect::<Vec<_>>()
    };
    let lines = vec![
        PrizeLine::new("1", prizes.first, vec![Matcher::Exact(first)]),
        PrizeLine::new("2", prizes.second, vec![Matcher::Exact(second)]),
        PrizeLine::new("3", prizes.third, vec![Matcher::Exact(third)]),
        PrizeLine::new("ext4", prizes.four_digit, endings(&four_digit, 4)),
        PrizeLine::new("ext3", prizes.three_digit, endings(&three_digit, 3)),
        PrizeLine::new("ext2", prizes.two_digit, endings(&two_digit, 2)),
        PrizeLine::new("approx_1", prizes.approx_first, vec![Matcher::Approx(first)]),
        PrizeLine::new("approx_2", prizes.approx_second, vec![Matcher::Approx(second)]),
        PrizeLine::new(REINTEGRO, prizes.reintegro, ending_lines(&reintegro_digits)),
    ];
    let draw = LoteriaDraw {
        kind: Some(LoteriaKind::Nino),
        first,
        second,
        third: Some(third),
        four_digit,
        three_digit,
        two_digit,
        reintegros: reintegro_digits,
        ..LoteriaDraw::default()
    };
    (draw, lines)
}

/// Best non-reintegro line a number wins, and whether it hits the
/// reintegro.
pub fn best_line(lines: &[PrizeLine], number: u32) -> (Option<&PrizeLine>, bool) {
    let best = lines
        .iter()
        .filter(|l| l.id != REINTEGRO && l.matches(number))
        .max_by(|a, b| a.prize.total_cmp(&b.prize));
    let reintegro = lines.iter().any(|l| l.id == REINTEGRO && l.matches(number));
    (best, reintegro)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoteriaState {
    pub draws_run: u64,
}

pub struct LoteriaEngine {
    config: LoteriaConfig,
    state: LoteriaState,
}

impl LoteriaEngine {
    pub fn new(config: LoteriaConfig) -> Self {
        Self {
            config,
            state: LoteriaState::default(),
        }
    }

    /// Kind of a draw: explicit if given, else from the calendar.
    pub fn kind_for(&self, ctx: &DrawContext) -> LoteriaKind {
        if let Some(kind) = ctx.loteria_kind {
            return kind;
        }
        infer_kind(&self.config, ctx.date)
    }
}

fn infer_kind(cfg: &LoteriaConfig, date: DrawDate) -> LoteriaKind {
    let on = |month: u32, day: u32| date.month() == month && date.day() == day;
    if on(cfg.navidad.month, cfg.navidad.day) {
        LoteriaKind::Navidad
    } else if on(cfg.nino.month, cfg.nino.day) {
        LoteriaKind::Nino
    } else if date.weekday() == cfg.jueves.weekday {
        LoteriaKind::Jueves
    } else if date.weekday() == cfg.sabado.weekday {
        LoteriaKind::Sabado
    } else {
        cfg.default_kind
    }
}

fn run_draw(
    cfg: &LoteriaConfig,
    state: &mut LoteriaState,
    number: Option<u32>,
    kind: LoteriaKind,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (LoteriaDraw, DrawStats, PlayerResult) {
    let emission = cfg.emission(kind);
    let sold = emission.sold.estimate(ctx.date, 0.0, rng);
    let issued = emission.issued();
    let sold_ratio = stats::safe_divide(sold.bets_total as f64, issued as f64).clamp(0.0, 1.0);
    let revenue = sold.bets_total as f64 * emission.price;

    let (draw, lines) = match kind {
        LoteriaKind::Jueves => ordinary_draw(rng, kind, &cfg.jueves.prizes),
        LoteriaKind::Sabado => ordinary_draw(rng, kind, &cfg.sabado.prizes),
        LoteriaKind::Navidad => navidad_draw(rng, &cfg.navidad.prizes),
        LoteriaKind::Nino => nino_draw(rng, &cfg.nino.prizes),
    };

    let (best, reintegro_hit) = match number {
        Some(n) => best_line(&lines, n),
        None => (None, false),
    };
    let best_id = best.map(|l| l.id);

    let tiers: Vec<PrizeTier> = lines
        .iter()
        .map(|line| {
            let decimos = line.coverage() * emission.decimos_per_number();
            let winners = stats::binomial(rng, decimos, sold_ratio);
            let player_in = if line.id == REINTEGRO {
                reintegro_hit
            } else {
                best_id == Some(line.id)
            };
            PrizeTier::fixed(line.id, line.prize, winners, player_in)
        })
        .collect();
    let categories = pools::settle(&tiers);
    let paid_out: Money = categories.iter().map(|c| c.payout).sum();

    // Fixed prizes are funded exactly as paid.
    let ledger = Ledger {
        prize_fund: paid_out,
        paid_out,
        ..Ledger::default()
    };

    let refund = if reintegro_hit { emission.price } else { 0.0 };
    let player = PlayerResult {
        category: best_id.map(str::to_string),
        prize: best.map(|l| l.prize).unwrap_or(0.0),
        refund,
        pools: best_id.into_iter().map(str::to_string).collect(),
        hits: 0,
        detail: number.map(|n| format!("{n:05} ({})", kind.name())),
    };

    state.draws_run += 1;
    log::debug!(
        "loteria {} {}: first {:05}, sold {} of {} décimos",
        kind.name(),
        ctx.date,
        draw.first,
        sold.bets_total,
        issued
    );

    let stats = DrawStats {
        bets_total: sold.bets_total,
        bets_world: sold.bets_world,
        revenue,
        prize_fund: paid_out,
        categories,
        ledger,
        ..DrawStats::default()
    };
    (draw, stats, player)
}

impl DrawEngine for LoteriaEngine {
    fn game_id(&self) -> &'static str {
        GAME_ID
    }

    fn schedule(&self, kind: Option<LoteriaKind>) -> DrawSchedule {
        match kind {
            Some(LoteriaKind::Jueves) => DrawSchedule::Weekly(vec![self.config.jueves.weekday]),
            Some(LoteriaKind::Sabado) => DrawSchedule::Weekly(vec![self.config.sabado.weekday]),
            Some(LoteriaKind::Navidad) => DrawSchedule::Annual {
                month: self.config.navidad.month,
                day: self.config.navidad.day,
            },
            Some(LoteriaKind::Nino) => DrawSchedule::Annual {
                month: self.config.nino.month,
                day: self.config.nino.day,
            },
            // The full calendar: both weekly draws plus Navidad and Niño.
            None => DrawSchedule::Calendar {
                weekdays: vec![self.config.jueves.weekday, self.config.sabado.weekday],
                annual: vec![
                    (self.config.navidad.month, self.config.navidad.day),
                    (self.config.nino.month, self.config.nino.day),
                ],
            },
        }
    }

    fn price_for(&self, ctx: &DrawContext) -> Money {
        self.config.price(self.kind_for(ctx))
    }

    fn run_draw(&mut self, selection: &PlayerSelection, ctx: &DrawContext, rng: &mut DrawRng) -> SimResult<DrawResult> {
        let PlayerSelection::LoteriaNacional { number } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let number = if selection.is_complete() {
            Some(*number)
        } else {
            log::warn!("loteria: number {number} is outside 00000-99999; scoring as no match");
            None
        };
        let kind = self.kind_for(ctx);
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, number, kind, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::LoteriaNacional(draw),
            stats,
            player,
        })
    }

    fn jackpot(&self) -> Money {
        0.0
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
    use chrono::NaiveDate;

    #[test]
    fn approximations_wrap_around_the_number_range() {
        let m = Matcher::Approx(0);
        assert!(m.matches(1));
        assert!(m.matches(99_999));
        assert!(!m.matches(0));
        assert_eq!(Matcher::Centena(12_345).coverage(), 99);
        assert!(Matcher::Centena(12_345).matches(12_399));
        assert!(!Matcher::Centena(12_345).matches(12_345));
        assert_eq!(Matcher::Ending { value: 7, digits: 1 }.coverage(), 10_000);
    }

    #[test]
    fn best_line_wins_and_reintegro_is_separate() {
        let mut rng = DrawRng::new(3);
        let (draw, lines) = ordinary_draw(&mut rng, LoteriaKind::Jueves, &OrdinaryPrizes::for_price(3.0));
        let (best, reintegro) = best_line(&lines, draw.first);
        assert_eq!(best.map(|l| l.id), Some("1"));
        assert!(reintegro, "first prize always carries the reintegro digit");

        let neighbour = (draw.first + 1) % NUMBERS;
        let (best, _) = best_line(&lines, neighbour);
        assert_eq!(best.map(|l| l.id), Some("approx_1"));
    }

    #[test]
    fn navidad_numbers_are_all_distinct() {
        let mut rng = DrawRng::new(22);
        let prizes = NavidadPrizes::default();
        let (draw, _) = navidad_draw(&mut rng, &prizes);
        let mut all: Vec<u32> = vec![draw.first, draw.second];
        all.extend(draw.third);
        all.extend(&draw.fourth);
        all.extend(&draw.fifth);
        all.extend(&draw.pedrea);
        let distinct: BTreeSet<u32> = all.iter().copied().collect();
        assert_eq!(distinct.len(), all.len());
        assert_eq!(draw.pedrea.len(), prizes.pedrea_count);
    }

    #[test]
    fn kind_follows_the_calendar_unless_given() {
        let engine = LoteriaEngine::new(LoteriaConfig::default());
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 22).expect("date");
        let thursday = NaiveDate::from_ymd_opt(2025, 12, 18).expect("date");
        assert_eq!(engine.kind_for(&DrawContext::on(christmas)), LoteriaKind::Navidad);
        assert_eq!(engine.kind_for(&DrawContext::on(thursday)), LoteriaKind::Jueves);
        let forced = DrawContext::on(thursday).with_kind(LoteriaKind::Sabado);
        assert_eq!(engine.kind_for(&forced), LoteriaKind::Sabado);
        assert_eq!(engine.price_for(&forced), 6.0);
    }

    #[test]
    fn default_schedule_includes_navidad_and_nino() {
        let engine = LoteriaEngine::new(LoteriaConfig::default());
        let schedule = engine.schedule(None);
        // Both fall on weekdays without an ordinary draw in 2025/26.
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 22).expect("date");
        let epiphany = NaiveDate::from_ymd_opt(2026, 1, 6).expect("date");
        assert!(schedule.is_draw_day(christmas));
        assert!(schedule.is_draw_day(epiphany));
        assert_eq!(schedule.next_after(christmas - chrono::Duration::days(1)), Some(christmas));
        assert_eq!(engine.kind_for(&DrawContext::on(epiphany)), LoteriaKind::Nino);

        let mut clock = crate::clock::DrawClock::starting(schedule, NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"));
        let mut kinds = Vec::new();
        while let Some(date) = clock.next_draw() {
            if date.year() > 2025 {
                break;
            }
            kinds.push(engine.kind_for(&DrawContext::on(date)));
        }
        assert_eq!(kinds.iter().filter(|k| **k == LoteriaKind::Navidad).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == LoteriaKind::Nino).count(), 1);
    }
}
