//! End-to-end draws for a fixed pick on a single game.

use chrono::{Datelike, NaiveDate, Weekday};
use loteria_core::{
    config::{EuroDreamsConfig, LototurfConfig, PrimitivaConfig},
    engine::{DrawContext, DrawEngine, DrawOutcome},
    eurodreams_engine::EuroDreamsEngine,
    lototurf_engine::LototurfEngine,
    primitiva_engine::PrimitivaEngine,
    rng::{GameSlot, RngBank},
    selection::PlayerSelection,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn primitiva_monday_draw_scores_the_fixed_pick() {
    let monday = date(2024, 1, 1);
    assert_eq!(monday.weekday(), Weekday::Mon);
    let pick = [1, 2, 3, 4, 5, 6];
    let selection = PlayerSelection::Primitiva {
        main: pick.to_vec(),
        reintegro: 3,
    };

    for seed in 0..200u64 {
        let mut engine = PrimitivaEngine::new(PrimitivaConfig::default());
        let mut rng = RngBank::new(seed).for_draw(GameSlot::Primitiva, 1);
        let result = engine
            .run_draw(&selection, &DrawContext::on(monday), &mut rng)
            .expect("draw runs");

        let DrawOutcome::Primitiva(draw) = &result.draw else {
            panic!("seed {seed}: expected a primitiva draw, got {:?}", result.draw);
        };
        let mut numbers = draw.numbers.clone();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 6, "seed {seed}: numbers not unique: {:?}", draw.numbers);
        assert!(draw.numbers.iter().all(|n| (1..=49).contains(n)), "seed {seed}");
        assert!(draw.reintegro <= 9, "seed {seed}");

        let hits = pick.iter().filter(|n| draw.numbers.contains(n)).count();
        let expected = match hits {
            6 if draw.reintegro == 3 => Some("6R"),
            6 => Some("6"),
            5 if pick.contains(&draw.complementario) => Some("5C"),
            5 => Some("5"),
            4 => Some("4"),
            3 => Some("3"),
            _ => None,
        };
        assert_eq!(result.player.category.as_deref(), expected, "seed {seed}: {draw:?}");
        assert_eq!(result.player.hits as usize, hits, "seed {seed}");

        let refund = if draw.reintegro == 3 { 1.0 } else { 0.0 };
        assert_eq!(result.player.refund, refund, "seed {seed}");
    }
}

#[test]
fn eurodreams_shortfall_becomes_debt_never_negative_reserve() {
    let config = EuroDreamsConfig {
        fixed_allotment_pct: 0.0,
        reserve_pct: 0.0,
        initial_reserve: 0.0,
        ..EuroDreamsConfig::default()
    };
    let mut engine = EuroDreamsEngine::new(config);
    let selection = PlayerSelection::EuroDreams {
        main: vec![3, 8, 15, 21, 30, 38],
        dream: 2,
    };
    let bank = RngBank::new(2024);
    let mut day = date(2024, 1, 1);

    let mut debt = 0.0;
    for index in 1..=50 {
        let mut rng = bank.for_draw(GameSlot::EuroDreams, index);
        let result = engine
            .run_draw(&selection, &DrawContext::on(day), &mut rng)
            .expect("draw runs");
        let stats = &result.stats;

        assert!(stats.reserve_after >= 0.0, "draw {index}: reserve {}", stats.reserve_after);
        assert!(stats.reserve_debt >= 0.0, "draw {index}: debt {}", stats.reserve_debt);
        // Nothing flows in to repay, so debt only grows by what was borrowed.
        assert!(
            (stats.reserve_debt - (debt + stats.ledger.borrowed)).abs() < 1e-6,
            "draw {index}: debt {} after {debt} + {}",
            stats.reserve_debt,
            stats.ledger.borrowed
        );
        if stats.ledger.borrowed > 0.0 {
            assert!(stats.reserve_debt > 0.0, "draw {index}: borrowed without debt");
        }
        debt = stats.reserve_debt;
        day += chrono::Duration::days(3);
    }
    assert_eq!(engine.state().reserve_debt, debt);
}

#[test]
fn eurodreams_contributions_repay_debt_before_the_reserve_grows() {
    let selection = PlayerSelection::EuroDreams {
        main: vec![3, 8, 15, 21, 30, 38],
        dream: 2,
    };
    let bank = RngBank::new(2025);
    let mut day = date(2024, 1, 1);
    let mut index = 0;

    // No allotment, contribution or reserve: the first "6"/"6+1" winner
    // is paid with borrowed money.
    let mut borrowing = EuroDreamsEngine::new(EuroDreamsConfig {
        fixed_allotment_pct: 0.0,
        reserve_pct: 0.0,
        initial_reserve: 0.0,
        ..EuroDreamsConfig::default()
    });
    while borrowing.state().reserve_debt == 0.0 && index < 200 {
        index += 1;
        let mut rng = bank.for_draw(GameSlot::EuroDreams, index);
        borrowing
            .run_draw(&selection, &DrawContext::on(day), &mut rng)
            .expect("draw runs");
        day += chrono::Duration::days(3);
    }
    assert!(borrowing.state().reserve_debt > 0.0, "no debt after {index} draws");
    assert_eq!(borrowing.state().reserve, 0.0);

    // Same state, contribution back on: small enough that repaying takes
    // many draws.
    let reserve_pct = 0.001;
    let mut engine = EuroDreamsEngine::new(EuroDreamsConfig {
        fixed_allotment_pct: 0.0,
        reserve_pct,
        initial_reserve: 0.0,
        ..EuroDreamsConfig::default()
    });
    engine
        .restore_state(borrowing.snapshot_state().expect("snapshot"))
        .expect("restore");

    let mut indebted_draws = 0;
    for _ in 0..30 {
        index += 1;
        let debt_before = engine.state().reserve_debt;
        let mut rng = bank.for_draw(GameSlot::EuroDreams, index);
        let result = engine
            .run_draw(&selection, &DrawContext::on(day), &mut rng)
            .expect("draw runs");
        day += chrono::Duration::days(3);
        let stats = &result.stats;
        let contribution = stats.prize_fund * reserve_pct;
        let all_claimed = ["5", "4", "3"].iter().all(|id| result.winners(id) > 0);

        if stats.reserve_debt > 0.0 {
            // Everything bound for the reserve went to the debt.
            assert!(
                (stats.reserve_debt - (debt_before + stats.ledger.borrowed - stats.ledger.reserve_out)).abs() < 1e-6,
                "draw {index}: debt {debt_before} -> {}",
                stats.reserve_debt
            );
            assert_eq!(stats.reserve_after, 0.0, "draw {index}: reserve grew with debt outstanding");
            if all_claimed {
                assert!((stats.ledger.reserve_out - contribution).abs() < 1e-6, "draw {index}");
            }
            indebted_draws += 1;
        }
    }
    assert!(indebted_draws > 0, "debt cleared on the first draw");
}

#[test]
fn lototurf_missing_horse_plays_nearest_lower_runner() {
    let mut weights = vec![0.0; 12];
    weights[7] = 1.0; // always 8 runners
    let config = LototurfConfig {
        participant_weights: weights,
        ..LototurfConfig::default()
    };
    let mut engine = LototurfEngine::new(config);
    let selection = PlayerSelection::Lototurf {
        main: vec![2, 7, 11, 19, 24, 30],
        horse: 11,
        reintegro: 5,
    };
    let bank = RngBank::new(77);

    for index in 1..=40 {
        let mut rng = bank.for_draw(GameSlot::Lototurf, index);
        let result = engine
            .run_draw(&selection, &DrawContext::on(date(2024, 3, 3)), &mut rng)
            .expect("draw runs");
        let DrawOutcome::Lototurf(draw) = &result.draw else {
            panic!("expected a lototurf draw, got {:?}", result.draw);
        };
        assert_eq!(draw.participants, 8);
        assert!((1..=8).contains(&draw.horse), "winning horse {}", draw.horse);
        assert_eq!(
            result.player.detail.as_deref(),
            Some("horse 11 not running; plays 8"),
            "draw {index}"
        );
        let horse_hit = draw.horse == 8;
        if let Some(category) = &result.player.category {
            assert_eq!(category.ends_with("+C"), horse_hit, "draw {index}: {category}");
        }
    }
}
