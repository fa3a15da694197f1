//! Simulation controller: turns "simulate N years" into repeated draws
//! of the active game.
//!
//! RULE: the controller never reaches into an engine. It asks for the
//! schedule and price, runs the draw, and records what came back.
//!
//! Draw indexes are run-wide and never reset, so every draw of a run
//! gets its own RNG stream and its own row in the draw log, even across
//! `clear()` and game switches.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawClock,
    config::loteria::LoteriaKind,
    engine::{DrawContext, DrawOutcome},
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    investment::{self, IndexReturns, InvestmentComparison},
    manager::GameManager,
    rng::{GameSlot, RngBank},
    side_game::SideResult,
    snapshot::SimSnapshot,
    store::SimStore,
    types::{DrawDate, DrawIndex, Money, RunId},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationOptions {
    pub seed: u64,
    /// First day a draw may fall on.
    pub start: DrawDate,
    /// Also buy the game's side bet (Joker, El Millón) every draw.
    pub side_bet: bool,
    /// Lotería Nacional draw kind; `None` follows the calendar.
    pub loteria_kind: Option<LoteriaKind>,
}

impl SimulationOptions {
    pub fn new(seed: u64, start: DrawDate) -> Self {
        Self {
            seed,
            start,
            side_bet: false,
            loteria_kind: None,
        }
    }
}

/// One draw as the player experienced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawRecord {
    pub draw_index: DrawIndex,
    pub date: DrawDate,
    pub game_id: String,
    pub price: Money,
    /// Price plus side bet.
    pub spent: Money,
    /// Prize, refund and side prize.
    pub won: Money,
    pub category: Option<String>,
    pub prize: Money,
    pub refund: Money,
    pub side: Option<SideResult>,
    pub jackpot_after: Money,
    pub reserve_after: Money,
    pub draw: DrawOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiggestPrize {
    pub draw_index: DrawIndex,
    pub date: DrawDate,
    pub amount: Money,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationState {
    pub total_draws: u64,
    pub total_spent: Money,
    pub total_won: Money,
    pub biggest_prize: Option<BiggestPrize>,
    pub records: Vec<DrawRecord>,
}

impl SimulationState {
    pub fn net(&self) -> Money {
        self.total_won - self.total_spent
    }

    fn push(&mut self, record: DrawRecord) {
        self.total_draws += 1;
        self.total_spent += record.spent;
        self.total_won += record.won;
        let beats = self
            .biggest_prize
            .as_ref()
            .map_or(true, |best| record.won > best.amount);
        if record.won > 0.0 && beats {
            self.biggest_prize = Some(BiggestPrize {
                draw_index: record.draw_index,
                date: record.date,
                amount: record.won,
                category: record.category.clone(),
            });
        }
        self.records.push(record);
    }

    /// How many draws landed in each main category.
    pub fn wins_by_category(&self) -> BTreeMap<String, u64> {
        let mut wins = BTreeMap::new();
        for category in self.records.iter().filter_map(|r| r.category.as_ref()) {
            *wins.entry(category.clone()).or_insert(0) += 1;
        }
        wins
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationSummary {
    pub run_id: RunId,
    pub game_id: Option<String>,
    pub draws: u64,
    pub total_spent: Money,
    pub total_won: Money,
    pub net: Money,
    /// Won per unit spent.
    pub return_ratio: f64,
    pub first_date: Option<DrawDate>,
    pub last_date: Option<DrawDate>,
    pub biggest_prize: Option<BiggestPrize>,
    pub wins_by_category: BTreeMap<String, u64>,
    pub investment: InvestmentComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GameClock {
    game_id: String,
    clock: DrawClock,
}

pub struct SimulationController {
    run_id: RunId,
    bank: RngBank,
    options: SimulationOptions,
    returns: IndexReturns,
    game_clock: Option<GameClock>,
    draw_seq: DrawIndex,
    state: SimulationState,
    events: Vec<SimEvent>,
    store: Option<SimStore>,
}

impl SimulationController {
    pub fn new(run_id: impl Into<RunId>, options: SimulationOptions) -> Self {
        let run_id = run_id.into();
        let seed = options.seed;
        Self {
            events: vec![SimEvent::RunInitialized {
                run_id: run_id.clone(),
                seed,
            }],
            run_id,
            bank: RngBank::new(seed),
            options,
            returns: IndexReturns::default(),
            game_clock: None,
            draw_seq: 0,
            state: SimulationState::default(),
            store: None,
        }
    }

    /// Persist draws, events and snapshots from now on.
    pub fn with_store(mut self, store: SimStore) -> SimResult<Self> {
        store.insert_run(&self.run_id, self.options.seed, env!("CARGO_PKG_VERSION"))?;
        for event in &self.events {
            store.append_event(&EventLogEntry::from_event(&self.run_id, event)?)?;
        }
        self.store = Some(store);
        Ok(self)
    }

    pub fn with_returns(mut self, returns: IndexReturns) -> Self {
        self.returns = returns;
        self
    }

    /// Pick a persisted run back up at its latest snapshot. The game the
    /// snapshot was taken on must be the one loaded in `manager`; later
    /// draws in the log are discarded and will be replayed identically.
    pub fn resume(
        store: SimStore,
        run_id: &str,
        options: SimulationOptions,
        manager: &mut GameManager,
    ) -> SimResult<Self> {
        let (draw_index, json) = store
            .latest_snapshot(run_id)?
            .ok_or_else(|| anyhow::anyhow!("Run {run_id} has no snapshot"))?;
        let snapshot: SimSnapshot = serde_json::from_str(&json)?;

        let active = manager.active_mut()?;
        if active.entry.id != snapshot.game_id {
            return Err(anyhow::anyhow!(
                "Snapshot of run {run_id} is for '{}', but '{}' is loaded",
                snapshot.game_id,
                active.entry.id
            )
            .into());
        }
        active.engine.restore_state(snapshot.engine_state)?;
        store.truncate_after(run_id, draw_index)?;

        let mut records: Vec<DrawRecord> = store
            .draws_for_run(run_id)?
            .into_iter()
            .filter(|r| r.game_id == snapshot.game_id)
            .collect();
        let skip = records.len().saturating_sub(snapshot.total_draws as usize);
        records.drain(..skip);

        log::info!("Resuming run {run_id} after draw {draw_index}");
        Ok(Self {
            run_id: run_id.to_string(),
            bank: RngBank::new(options.seed),
            options,
            returns: IndexReturns::default(),
            game_clock: Some(GameClock {
                game_id: snapshot.game_id,
                clock: snapshot.clock,
            }),
            draw_seq: draw_index,
            state: SimulationState {
                total_draws: snapshot.total_draws,
                total_spent: snapshot.total_spent,
                total_won: snapshot.total_won,
                biggest_prize: snapshot.biggest_prize,
                records,
            },
            events: Vec::new(),
            store: Some(store),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn store(&self) -> Option<&SimStore> {
        self.store.as_ref()
    }

    /// Draws run so far over the whole run, across clears.
    pub fn draws_run(&self) -> DrawIndex {
        self.draw_seq
    }

    pub fn set_side_bet(&mut self, on: bool) {
        self.options.side_bet = on;
    }

    pub fn set_loteria_kind(&mut self, kind: Option<LoteriaKind>) {
        self.options.loteria_kind = kind;
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forget totals and calendar position. Engine state is untouched.
    pub fn clear(&mut self) {
        self.state = SimulationState::default();
        self.game_clock = None;
    }

    /// Fresh run over `years` calendar years from the start date, with
    /// the engine back at its configured jackpot and reserve.
    pub fn run_years(&mut self, manager: &mut GameManager, years: u32) -> SimResult<SimulationSummary> {
        self.clear();
        manager.reset_engine()?;
        self.continue_years(manager, years)
    }

    /// Extend the current run by `years` calendar years.
    pub fn continue_years(&mut self, manager: &mut GameManager, years: u32) -> SimResult<SimulationSummary> {
        self.prepare(manager)?;
        let end = match &self.game_clock {
            Some(g) => DrawClock::years_after(g.clock.cursor + Duration::days(1), years),
            None => return Err(SimError::NoActiveGame),
        };
        loop {
            let next = self
                .game_clock
                .as_ref()
                .and_then(|g| g.clock.schedule.next_after(g.clock.cursor));
            match next {
                Some(date) if date < end => self.run_one(manager)?,
                _ => break,
            }
        }
        self.finish()
    }

    /// Run exactly `n` more draws.
    pub fn run_draws(&mut self, manager: &mut GameManager, n: u64) -> SimResult<SimulationSummary> {
        self.prepare(manager)?;
        for _ in 0..n {
            self.run_one(manager)?;
        }
        self.finish()
    }

    pub fn summary(&self) -> SimulationSummary {
        let flows: Vec<(DrawDate, Money)> = self.state.records.iter().map(|r| (r.date, r.spent)).collect();
        let spent = self.state.total_spent;
        SimulationSummary {
            run_id: self.run_id.clone(),
            game_id: self.game_clock.as_ref().map(|g| g.game_id.clone()),
            draws: self.state.total_draws,
            total_spent: spent,
            total_won: self.state.total_won,
            net: self.state.net(),
            return_ratio: if spent > 0.0 { self.state.total_won / spent } else { 0.0 },
            first_date: self.state.records.first().map(|r| r.date),
            last_date: self.state.records.last().map(|r| r.date),
            biggest_prize: self.state.biggest_prize.clone(),
            wins_by_category: self.state.wins_by_category(),
            investment: investment::compare(&self.returns, &flows, self.state.total_won),
        }
    }

    fn prepare(&mut self, manager: &mut GameManager) -> SimResult<()> {
        for event in manager.drain_events() {
            self.emit(event)?;
        }
        manager.complete_selection()?;
        self.sync_clock(manager)
    }

    /// Point the calendar at the active game. Switching games discards
    /// the totals gathered for the previous one.
    fn sync_clock(&mut self, manager: &GameManager) -> SimResult<()> {
        let active = manager.active().ok_or(SimError::NoActiveGame)?;
        let schedule = active.engine.schedule(self.options.loteria_kind);
        match &mut self.game_clock {
            Some(g) if g.game_id == active.entry.id => g.clock.schedule = schedule,
            stale => {
                if stale.is_some() {
                    self.state = SimulationState::default();
                }
                *stale = Some(GameClock {
                    game_id: active.entry.id.to_string(),
                    clock: DrawClock::starting(schedule, self.options.start),
                });
            }
        }
        Ok(())
    }

    fn run_one(&mut self, manager: &mut GameManager) -> SimResult<()> {
        let selection = manager.complete_selection()?;
        let active = manager.active_mut()?;
        let game_id = active.entry.id;
        let date = self
            .game_clock
            .as_mut()
            .and_then(|g| g.clock.next_draw())
            .ok_or_else(|| SimError::InvalidConfig {
                game: game_id.to_string(),
                reason: "draw schedule has no dates".to_string(),
            })?;

        let draw_index = self.draw_seq + 1;
        let ctx = DrawContext {
            date,
            loteria_kind: self.options.loteria_kind,
        };
        let price = active.engine.price_for(&ctx);
        let mut rng = self.bank.for_draw(active.entry.slot, draw_index);
        let result = active.engine.run_draw(&selection, &ctx, &mut rng)?;
        self.draw_seq = draw_index;

        let side = match active.side_game.as_mut() {
            Some(side) if self.options.side_bet => {
                let mut rng = self.bank.for_draw(GameSlot::SideGame, draw_index);
                Some(side.play(&ctx, &result, &mut rng))
            }
            _ => None,
        };
        let engine_state = if self.store.is_some() && SimSnapshot::is_due(draw_index) {
            Some(active.engine.snapshot_state()?)
        } else {
            None
        };

        let stats = &result.stats;
        log::debug!(
            "{game_id} #{draw_index} {date}: {} bets, jackpot {:.0} -> {:.0}",
            stats.bets_total,
            stats.jackpot_before,
            stats.jackpot_after
        );

        let spent = price + side.as_ref().map_or(0.0, |s| s.price);
        let won = result.player.total() + side.as_ref().map_or(0.0, |s| s.prize);

        let mut events = vec![SimEvent::DrawCompleted {
            draw_index,
            date,
            game_id: game_id.to_string(),
            spent,
            won,
            category: result.player.category.clone(),
        }];
        if let Some(top) = &stats.jackpot_category {
            let (amount, winners) = result
                .category(top)
                .map_or((0.0, 0), |c| (c.payout, c.winners_effective));
            let player_won = result.player.pools.iter().any(|p| p == top);
            log::info!("{game_id} jackpot won on {date}: {amount:.2} shared by {winners}");
            events.push(SimEvent::JackpotWon {
                draw_index,
                date,
                game_id: game_id.to_string(),
                amount,
                winners,
                player_won,
            });
        }
        if stats.ledger.borrowed > 0.0 {
            events.push(SimEvent::ReserveDebtIncurred {
                draw_index,
                date,
                game_id: game_id.to_string(),
                debt: stats.reserve_debt,
            });
        }

        let record = DrawRecord {
            draw_index,
            date,
            game_id: game_id.to_string(),
            price,
            spent,
            won,
            category: result.player.category.clone(),
            prize: result.player.prize,
            refund: result.player.refund,
            side,
            jackpot_after: stats.jackpot_after,
            reserve_after: stats.reserve_after,
            draw: result.draw,
        };
        if let Some(store) = &self.store {
            store.append_draw(&self.run_id, &record)?;
        }
        self.state.push(record);
        for event in events {
            self.emit(event)?;
        }
        if let Some(engine_state) = engine_state {
            self.save_snapshot(draw_index, engine_state)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> SimResult<SimulationSummary> {
        let summary = self.summary();
        log::info!(
            "Run {} at {} draws: spent {:.2}, won {:.2}",
            self.run_id,
            summary.draws,
            summary.total_spent,
            summary.total_won
        );
        self.emit(SimEvent::RunCompleted {
            draws: summary.draws,
            total_spent: summary.total_spent,
            total_won: summary.total_won,
        })?;
        Ok(summary)
    }

    fn emit(&mut self, event: SimEvent) -> SimResult<()> {
        if let Some(store) = &self.store {
            store.append_event(&EventLogEntry::from_event(&self.run_id, &event)?)?;
        }
        self.events.push(event);
        Ok(())
    }

    fn save_snapshot(&self, draw_index: DrawIndex, engine_state: serde_json::Value) -> SimResult<()> {
        let (Some(store), Some(g)) = (&self.store, &self.game_clock) else {
            return Ok(());
        };
        let snapshot = SimSnapshot {
            run_id: self.run_id.clone(),
            draw_index,
            game_id: g.game_id.clone(),
            clock: g.clock.clone(),
            engine_state,
            total_draws: self.state.total_draws,
            total_spent: self.state.total_spent,
            total_won: self.state.total_won,
            biggest_prize: self.state.biggest_prize.clone(),
        };
        store.save_snapshot(&self.run_id, draw_index, &serde_json::to_string(&snapshot)?)
    }
}
