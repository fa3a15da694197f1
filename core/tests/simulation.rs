use chrono::NaiveDate;
use loteria_core::{
    config::{loteria::LoteriaKind, GameCatalog},
    error::SimError,
    event::SimEvent,
    manager::GameManager,
    selection::PlayerSelection,
    simulation::{SimulationController, SimulationOptions},
    snapshot::SNAPSHOT_INTERVAL,
    store::SimStore,
    ui::HeadlessUi,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn manager_with(game: &str) -> GameManager {
    let mut manager = GameManager::new(GameCatalog::default_catalog());
    manager
        .load_game(game, Box::new(HeadlessUi::quick_pick(5)))
        .expect("load game");
    manager
}

fn controller(seed: u64) -> SimulationController {
    SimulationController::new(format!("sim-test-{seed}"), SimulationOptions::new(seed, date(2024, 1, 1)))
}

fn memory_store() -> SimStore {
    let store = SimStore::in_memory().expect("open");
    store.migrate().expect("migrate");
    store
}

#[test]
fn one_year_of_primitiva_draws_on_mon_thu_sat() {
    let mut manager = manager_with("primitiva");
    let mut sim = controller(1);
    let summary = sim.run_years(&mut manager, 1).expect("run");

    // 2024 has 53 Mondays and 52 Thursdays and Saturdays.
    assert_eq!(summary.draws, 157);
    assert_eq!(summary.total_spent, 157.0);
    assert_eq!(summary.first_date, Some(date(2024, 1, 1)));
    assert!(summary.last_date.is_some_and(|d| d <= date(2024, 12, 31)));
    assert!((summary.net - (summary.total_won - summary.total_spent)).abs() < 1e-9);
    assert_eq!(sim.state().records.len(), 157);
    assert_eq!(summary.investment.invested, summary.total_spent);
}

#[test]
fn continue_extends_and_run_starts_over() {
    let mut manager = manager_with("bonoloto");
    let mut sim = controller(2);
    let first = sim.run_years(&mut manager, 1).expect("run");
    let extended = sim.continue_years(&mut manager, 1).expect("continue");
    assert!(extended.draws > first.draws);
    assert!(extended.last_date > first.last_date);
    assert_eq!(extended.first_date, first.first_date);

    let again = sim.run_years(&mut manager, 1).expect("run again");
    assert_eq!(again.draws, first.draws, "run_years restarts the calendar");
    assert_eq!(again.first_date, first.first_date);
}

#[test]
fn run_draws_counts_exactly_and_tracks_biggest_prize() {
    let mut manager = manager_with("quiniela");
    let mut sim = controller(3);
    let summary = sim.run_draws(&mut manager, 60).expect("run");
    assert_eq!(summary.draws, 60);

    let best = sim.state().records.iter().map(|r| r.won).fold(0.0, f64::max);
    match &summary.biggest_prize {
        Some(b) => assert_eq!(b.amount, best),
        None => assert_eq!(best, 0.0),
    }
    let wins: u64 = summary.wins_by_category.values().sum();
    let records_with_category = sim.state().records.iter().filter(|r| r.category.is_some()).count();
    assert_eq!(wins as usize, records_with_category);
}

#[test]
fn side_bet_adds_its_price_every_draw() {
    let mut manager = manager_with("euromillones");
    let mut options = SimulationOptions::new(4, date(2024, 1, 1));
    options.side_bet = true;
    let mut sim = SimulationController::new("side", options);
    let summary = sim.run_draws(&mut manager, 20).expect("run");
    for record in &sim.state().records {
        let side = record.side.as_ref().expect("side bet played");
        assert_eq!(side.game_id, "el_millon");
        assert!((record.spent - (record.price + 0.30)).abs() < 1e-9);
    }
    assert!((summary.total_spent - 20.0 * (2.20 + 0.30)).abs() < 1e-6);
}

#[test]
fn incomplete_selection_is_rejected_before_drawing() {
    let mut manager = GameManager::new(GameCatalog::default_catalog());
    manager.load_game("gordo", Box::new(HeadlessUi::new())).expect("load");
    let mut sim = controller(5);
    let err = sim.run_years(&mut manager, 1).expect_err("no selection");
    assert!(matches!(err, SimError::SelectionIncomplete { .. }), "{err}");

    manager
        .replace_ui(Box::new(HeadlessUi::with_selection(PlayerSelection::Gordo {
            main: vec![1, 2, 3],
            key: 4,
        })))
        .expect("replace ui");
    let err = sim.run_draws(&mut manager, 1).expect_err("short selection");
    assert!(matches!(err, SimError::SelectionIncomplete { .. }), "{err}");
    assert_eq!(sim.draws_run(), 0);
}

#[test]
fn no_game_loaded_is_an_error() {
    let mut manager = GameManager::new(GameCatalog::default_catalog());
    let mut sim = controller(6);
    assert!(matches!(sim.run_draws(&mut manager, 1), Err(SimError::NoActiveGame)));
}

#[test]
fn switching_games_discards_totals() {
    let mut manager = manager_with("primitiva");
    let mut sim = controller(7);
    sim.run_draws(&mut manager, 10).expect("primitiva");

    manager
        .load_game("gordo", Box::new(HeadlessUi::quick_pick(5)))
        .expect("switch");
    let summary = sim.run_draws(&mut manager, 4).expect("gordo");
    assert_eq!(summary.draws, 4);
    assert_eq!(summary.game_id.as_deref(), Some("gordo"));
    assert!(sim.state().records.iter().all(|r| r.game_id == "gordo"));
    assert_eq!(sim.draws_run(), 14, "draw indexes keep counting across games");

    let events = sim.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::GameChanged { previous: Some(p), game_id, .. } if p == "primitiva" && game_id == "gordo"
    )));
    let completed = events.iter().filter(|e| matches!(e, SimEvent::DrawCompleted { .. })).count();
    assert_eq!(completed, 14);
    assert!(matches!(events.last(), Some(SimEvent::RunCompleted { draws: 4, .. })));
}

#[test]
fn navidad_runs_once_a_year() {
    let mut manager = manager_with("loteria_nacional");
    let mut options = SimulationOptions::new(8, date(2024, 1, 1));
    options.loteria_kind = Some(LoteriaKind::Navidad);
    let mut sim = SimulationController::new("navidad", options);
    let summary = sim.run_years(&mut manager, 3).expect("run");
    assert_eq!(summary.draws, 3);
    let dates: Vec<NaiveDate> = sim.state().records.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(2024, 12, 22), date(2025, 12, 22), date(2026, 12, 22)]);
}

#[test]
fn persisted_run_matches_memory_and_resumes_identically() {
    let draws = SNAPSHOT_INTERVAL + 30;

    let mut manager = manager_with("primitiva");
    let mut sim = controller(9).with_store(memory_store()).expect("store");
    sim.run_draws(&mut manager, draws).expect("run");
    let run_id = sim.run_id().to_string();

    let store = sim.store().expect("store");
    let logged = store.draws_for_run(&run_id).expect("draws");
    assert_eq!(logged.len() as u64, draws);
    for (a, b) in logged.iter().zip(&sim.state().records) {
        assert_eq!((a.draw_index, a.date, &a.category, &a.draw), (b.draw_index, b.date, &b.category, &b.draw));
    }
    let (count, spent, won) = store.draw_totals(&run_id).expect("totals");
    assert_eq!(count, draws);
    assert!((spent - sim.state().total_spent).abs() < 1e-6);
    assert!((won - sim.state().total_won).abs() < 1e-6);
    let events = store.events_for_run(&run_id).expect("events");
    assert_eq!(events.first().map(|e| e.event_type.as_str()), Some("run_initialized"));
    assert_eq!(events.last().map(|e| e.event_type.as_str()), Some("run_completed"));
    let (snap_at, json) = store.latest_snapshot(&run_id).expect("query").expect("snapshot");
    assert_eq!(snap_at, SNAPSHOT_INTERVAL);

    // Copy the log and snapshot into a second database and resume there
    // with a fresh engine.
    let copy = memory_store();
    copy.insert_run(&run_id, 9, "test").expect("run row");
    for record in &logged {
        copy.append_draw(&run_id, record).expect("copy draw");
    }
    copy.save_snapshot(&run_id, snap_at, &json).expect("copy snapshot");

    let mut resume_manager = manager_with("primitiva");
    let mut resumed = SimulationController::resume(
        copy,
        &run_id,
        SimulationOptions::new(9, date(2024, 1, 1)),
        &mut resume_manager,
    )
    .expect("resume");
    assert_eq!(resumed.state().total_draws, SNAPSHOT_INTERVAL);
    assert_eq!(resumed.draws_run(), SNAPSHOT_INTERVAL);
    assert_eq!(resumed.state().records.len() as u64, SNAPSHOT_INTERVAL);

    resumed.run_draws(&mut resume_manager, 30).expect("run tail");
    let tail = SNAPSHOT_INTERVAL as usize..;
    for (a, b) in resumed.state().records[tail.clone()].iter().zip(&sim.state().records[tail]) {
        assert_eq!((a.draw_index, a.date, &a.category, &a.draw), (b.draw_index, b.date, &b.category, &b.draw));
    }
    assert!((resumed.state().total_won - sim.state().total_won).abs() < 1e-6);
    assert_eq!(
        resumed.store().expect("store").draw_totals(&run_id).expect("totals").0,
        draws
    );
}

#[test]
fn resume_refuses_a_different_game() {
    let mut manager = manager_with("primitiva");
    let mut sim = controller(10).with_store(memory_store()).expect("store");
    sim.run_draws(&mut manager, SNAPSHOT_INTERVAL).expect("run");

    let copy = memory_store();
    copy.insert_run(sim.run_id(), 10, "test").expect("run row");
    let (idx, json) = sim
        .store()
        .expect("store")
        .latest_snapshot(sim.run_id())
        .expect("query")
        .expect("snapshot");
    copy.save_snapshot(sim.run_id(), idx, &json).expect("copy");

    let mut other = manager_with("bonoloto");
    let result = SimulationController::resume(
        copy,
        sim.run_id(),
        SimulationOptions::new(10, date(2024, 1, 1)),
        &mut other,
    );
    assert!(result.is_err());
}
