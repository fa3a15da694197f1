//! draw-runner: headless runner for the Spanish lottery simulator.
//!
//! Usage:
//!   draw-runner --game primitiva --years 10 --seed 12345
//!   draw-runner --game euromillones --side --db run.db
//!   draw-runner --game loteria_nacional --kind navidad --years 25
//!   draw-runner --selection '{"game":"bonoloto","main":[3,9,14,22,31,40],"reintegro":7}'
//!   draw-runner --ipc-mode

use anyhow::{Context, Result};
use chrono::NaiveDate;
use loteria_core::{
    config::{loteria::LoteriaKind, GameCatalog},
    event::SimEvent,
    manager::GameManager,
    selection::PlayerSelection,
    simulation::{DrawRecord, SimulationController, SimulationOptions, SimulationSummary},
    store::SimStore,
    ui::{GameUi, HeadlessUi},
};
use std::env;
use std::io::{self, BufRead, Write};

const RECENT_DRAWS: usize = 20;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    LoadGame {
        game: String,
        #[serde(default)]
        selection: Option<PlayerSelection>,
    },
    SetSelection {
        selection: PlayerSelection,
    },
    SetOptions {
        #[serde(default)]
        side_bet: Option<bool>,
        #[serde(default)]
        kind: Option<LoteriaKind>,
    },
    Run {
        #[serde(default)]
        years: Option<u32>,
        #[serde(default)]
        draws: Option<u64>,
    },
    Continue {
        years: u32,
    },
    GetState,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    game_id: Option<&'static str>,
    enabled_games: Vec<&'static str>,
    jackpot: f64,
    reserve: f64,
    draws_run: u64,
    summary: SimulationSummary,
    recent: &'a [DrawRecord],
    events: Vec<SimEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let years = parse_arg(&args, "--years", 1u32);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let side_bet = has_flag(&args, "--side");
    let game = string_arg(&args, "--game").unwrap_or("primitiva");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let db = string_arg(&args, "--db");
    let resume = string_arg(&args, "--resume");
    let start = match string_arg(&args, "--start") {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("--start expects YYYY-MM-DD, got {s}"))?,
        None => chrono::Local::now().date_naive(),
    };
    let kind = string_arg(&args, "--kind").map(parse_kind).transpose()?;
    let selection = string_arg(&args, "--selection")
        .map(|s| serde_json::from_str::<PlayerSelection>(s).context("--selection is not a valid selection"))
        .transpose()?;

    let catalog = GameCatalog::load(data_dir)?;
    let mut manager = GameManager::new(catalog);
    manager.load_game(game, headless_ui(selection, seed))?;

    let options = SimulationOptions {
        seed,
        start,
        side_bet,
        loteria_kind: kind,
    };

    if !ipc_mode {
        println!("Spanish lottery simulator: draw-runner");
        println!("  game:      {}", manager.active_id().unwrap_or(game));
        println!("  seed:      {seed}");
        println!("  years:     {years}");
        println!("  start:     {start}");
        println!("  side bet:  {side_bet}");
        println!("  db:        {}", db.unwrap_or("(none)"));
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let mut controller = match (db, resume) {
        (Some(path), Some(run_id)) => {
            let store = SimStore::open(path)?;
            store.migrate()?;
            SimulationController::resume(store, run_id, options, &mut manager)?
        }
        (Some(path), None) => {
            let store = SimStore::open(path)?;
            store.migrate()?;
            SimulationController::new(new_run_id(), options).with_store(store)?
        }
        (None, Some(_)) => anyhow::bail!("--resume needs --db"),
        (None, None) => SimulationController::new(new_run_id(), options),
    };

    if ipc_mode {
        run_ipc_loop(&mut controller, &mut manager)?;
    } else {
        let summary = run_chunked(&mut controller, &mut manager, years, resume.is_some())?;
        print_summary(&summary, &controller);
    }
    Ok(())
}

/// One year per chunk, printing progress between chunks.
fn run_chunked(
    controller: &mut SimulationController,
    manager: &mut GameManager,
    years: u32,
    resumed: bool,
) -> Result<SimulationSummary> {
    let mut summary = if resumed {
        controller.continue_years(manager, 1)?
    } else {
        controller.run_years(manager, 1)?
    };
    for year in 2..=years {
        print_progress(year - 1, years, &summary);
        summary = controller.continue_years(manager, 1)?;
    }
    Ok(summary)
}

fn run_ipc_loop(controller: &mut SimulationController, manager: &mut GameManager) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match handle_command(controller, manager, cmd) {
            Ok(()) => {
                let state = build_ui_state(controller, manager);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    controller: &mut SimulationController,
    manager: &mut GameManager,
    cmd: IpcCommand,
) -> Result<()> {
    match cmd {
        IpcCommand::LoadGame { game, selection } => {
            let seed = controller.options().seed;
            manager.load_game(&game, headless_ui(selection, seed))?;
        }
        IpcCommand::SetSelection { selection } => {
            manager.replace_ui(Box::new(HeadlessUi::with_selection(selection)))?;
        }
        IpcCommand::SetOptions { side_bet, kind } => {
            if let Some(on) = side_bet {
                controller.set_side_bet(on);
            }
            if kind.is_some() {
                controller.set_loteria_kind(kind);
            }
        }
        IpcCommand::Run { years, draws } => {
            match draws {
                Some(n) => {
                    controller.clear();
                    manager.reset_engine()?;
                    controller.run_draws(manager, n)?
                }
                None => controller.run_years(manager, years.unwrap_or(1))?,
            };
        }
        IpcCommand::Continue { years } => {
            controller.continue_years(manager, years)?;
        }
        IpcCommand::GetState | IpcCommand::Quit => {}
    }
    Ok(())
}

fn build_ui_state<'a>(controller: &'a mut SimulationController, manager: &mut GameManager) -> UiState<'a> {
    let mut events = controller.drain_events();
    events.extend(manager.drain_events());
    let (jackpot, reserve) = manager
        .engine()
        .map(|e| (e.jackpot(), e.reserve()))
        .unwrap_or((0.0, 0.0));
    let summary = controller.summary();
    let records = &controller.state().records;
    UiState {
        game_id: manager.active_id(),
        enabled_games: manager.registry().enabled_ids(),
        jackpot,
        reserve,
        draws_run: controller.draws_run(),
        summary,
        recent: &records[records.len().saturating_sub(RECENT_DRAWS)..],
        events,
    }
}

fn print_progress(done: u32, total: u32, s: &SimulationSummary) {
    println!(
        "  year {done:>3}/{total}: {:>6} draws | spent {:>12.2} | won {:>12.2}",
        s.draws, s.total_spent, s.total_won
    );
}

fn print_summary(s: &SimulationSummary, controller: &SimulationController) {
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {}", s.run_id);
    println!("  game:          {}", s.game_id.as_deref().unwrap_or("-"));
    println!("  draws:         {}", s.draws);
    if let (Some(first), Some(last)) = (s.first_date, s.last_date) {
        println!("  period:        {first} .. {last}");
    }
    println!("  spent:         {:.2}", s.total_spent);
    println!("  won:           {:.2}", s.total_won);
    println!("  net:           {:.2}", s.net);
    println!("  return:        {:.1}%", s.return_ratio * 100.0);
    match &s.biggest_prize {
        Some(b) => println!(
            "  biggest prize: {:.2} on {} ({})",
            b.amount,
            b.date,
            b.category.as_deref().unwrap_or("refund/side")
        ),
        None => println!("  biggest prize: (none)"),
    }

    println!();
    println!("=== WINS BY CATEGORY ===");
    if s.wins_by_category.is_empty() {
        println!("  (no winning draws)");
    }
    for (category, count) in &s.wins_by_category {
        println!("  {category:<6} {count}");
    }

    println!();
    println!("=== IF INVESTED IN {} ===", s.investment.index);
    println!("  invested:      {:.2}", s.investment.invested);
    println!("  final value:   {:.2}", s.investment.final_value);
    println!("  gain:          {:.2}", s.investment.gain);
    println!("  lottery net:   {:.2}", s.investment.lottery_net);

    if controller.store().is_some() {
        println!();
        println!("  persisted as run {}", controller.run_id());
    }
}

fn headless_ui(selection: Option<PlayerSelection>, seed: u64) -> Box<dyn GameUi> {
    match selection {
        Some(s) => Box::new(HeadlessUi::with_selection(s)),
        None => Box::new(HeadlessUi::quick_pick(seed)),
    }
}

fn parse_kind(s: &str) -> Result<LoteriaKind> {
    serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
        .with_context(|| format!("--kind expects jueves, sabado, navidad or nino, got {s}"))
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn new_run_id() -> String {
    format!("run-{}", uuid::Uuid::new_v4())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
