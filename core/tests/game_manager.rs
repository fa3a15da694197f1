use chrono::NaiveDate;
use loteria_core::{
    config::GameCatalog,
    engine::DrawContext,
    error::SimError,
    manager::GameManager,
    rng::{GameSlot, RngBank},
    selection::PlayerSelection,
    ui::{GameUi, HeadlessUi},
};

fn manager() -> GameManager {
    GameManager::new(GameCatalog::default_catalog())
}

#[test]
fn every_enabled_game_loads_by_alias_and_draws() {
    let mut m = manager();
    let day = NaiveDate::from_ymd_opt(2025, 6, 7).expect("valid date");
    for alias in [
        "La-Primitiva",
        "euromillions",
        "bonoloto",
        "el_gordo",
        "euro-dreams",
        "loteria",
        "quiniela",
        "lototurf",
        "quinigol",
    ] {
        m.load_game(alias, Box::new(HeadlessUi::quick_pick(3))).expect(alias);
        let selection = m.complete_selection().expect("quick pick is complete");
        let active = m.active_mut().expect("active");
        let mut rng = RngBank::new(1).for_draw(active.entry.slot, 1);
        let result = active
            .engine
            .run_draw(&selection, &DrawContext::on(day), &mut rng)
            .expect("draw");
        assert_eq!(result.game_id, active.entry.id, "{alias}");
    }
    assert_eq!(m.active_id(), Some("quinigol"));
}

#[test]
fn failed_load_keeps_previous_game() {
    let mut m = manager();
    m.load_game("primitiva", Box::new(HeadlessUi::quick_pick(1))).expect("load");
    m.drain_events();

    let err = m.load_game("bingo", Box::new(HeadlessUi::quick_pick(1))).expect_err("unknown");
    assert!(matches!(err, SimError::UnknownGame { .. }));

    // A selection for the wrong game fails UI init before anything changes.
    let wrong = HeadlessUi::with_selection(PlayerSelection::LoteriaNacional { number: 7 });
    let err = m.load_game("gordo", Box::new(wrong)).expect_err("mismatch");
    assert!(matches!(err, SimError::SelectionMismatch { .. }));

    assert_eq!(m.active_id(), Some("primitiva"));
    assert!(m.drain_events().is_empty(), "failed loads emit nothing");
}

#[test]
fn disabled_game_cannot_be_loaded() {
    let mut catalog = GameCatalog::default_catalog();
    catalog.disabled = vec!["euromillones".to_string()];
    let mut m = GameManager::new(catalog);
    let err = m.load_game("euromillones", Box::new(HeadlessUi::new())).expect_err("disabled");
    assert!(matches!(err, SimError::GameDisabled { .. }));
    assert!(m.active().is_none());
}

#[test]
fn wrong_selection_for_engine_is_a_mismatch() {
    let mut m = manager();
    m.load_game("bonoloto", Box::new(HeadlessUi::quick_pick(2))).expect("load");
    let active = m.active_mut().expect("active");
    let selection = PlayerSelection::Gordo {
        main: vec![1, 2, 3, 4, 5],
        key: 0,
    };
    let day = NaiveDate::from_ymd_opt(2025, 6, 7).expect("valid date");
    let mut rng = RngBank::new(1).for_draw(GameSlot::Bonoloto, 1);
    let err = active
        .engine
        .run_draw(&selection, &DrawContext::on(day), &mut rng)
        .expect_err("gordo selection on bonoloto");
    assert!(matches!(err, SimError::SelectionMismatch { .. }));
}

#[test]
fn reset_engine_restores_configured_jackpot() {
    let mut m = manager();
    m.load_game("gordo", Box::new(HeadlessUi::quick_pick(4))).expect("load");
    let initial = m.engine().expect("engine").jackpot();
    let selection = m.complete_selection().expect("complete");
    let day = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    {
        let active = m.active_mut().expect("active");
        for i in 1..=10 {
            let mut rng = RngBank::new(9).for_draw(GameSlot::Gordo, i);
            active
                .engine
                .run_draw(&selection, &DrawContext::on(day), &mut rng)
                .expect("draw");
        }
    }
    m.reset_engine().expect("reset");
    assert_eq!(m.engine().expect("engine").jackpot(), initial);
}

#[test]
fn replacing_the_ui_keeps_engine_state() {
    let mut m = manager();
    m.load_game("lototurf", Box::new(HeadlessUi::quick_pick(4))).expect("load");
    let selection = PlayerSelection::Lototurf {
        main: vec![1, 2, 3, 4, 5, 6],
        horse: 3,
        reintegro: 1,
    };
    let mut ui = HeadlessUi::with_selection(selection.clone());
    ui.init("lototurf").expect("init");
    m.replace_ui(Box::new(ui)).expect("replace");
    assert_eq!(m.complete_selection().expect("complete"), selection);
    assert!(m.replace_ui(Box::new(HeadlessUi::with_selection(PlayerSelection::Quinigol { scores: vec![] }))).is_err());
}
