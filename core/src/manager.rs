//! Game manager: owns the active game's engine, side game and UI.
//!
//! Switching games is all-or-nothing: the new game is resolved, built
//! and its UI initialised before the old one is torn down, so a bad id
//! leaves the previous game active.

use crate::{
    config::GameCatalog,
    engine::DrawEngine,
    error::{SimError, SimResult},
    event::SimEvent,
    registry::{GameEntry, GameRegistry},
    selection::PlayerSelection,
    side_game::SideGame,
    ui::GameUi,
};

pub struct ActiveGame {
    pub entry: GameEntry,
    pub engine: Box<dyn DrawEngine>,
    pub side_game: Option<Box<dyn SideGame>>,
    pub ui: Box<dyn GameUi>,
}

pub struct GameManager {
    registry: GameRegistry,
    active: Option<ActiveGame>,
    pending_events: Vec<SimEvent>,
}

impl GameManager {
    pub fn new(catalog: GameCatalog) -> Self {
        Self {
            registry: GameRegistry::new(catalog),
            active: None,
            pending_events: Vec::new(),
        }
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn load_game(&mut self, id: &str, mut ui: Box<dyn GameUi>) -> SimResult<()> {
        let entry = *self.registry.resolve(id)?;
        ui.init(entry.id)?;
        let engine = self.registry.build_engine(&entry);
        let side_game = self.registry.build_side_game(&entry);

        let previous = self.active.take().map(|mut old| {
            old.ui.destroy();
            old.entry.id.to_string()
        });

        log::info!("Game changed: {:?} -> {}", previous, entry.id);
        self.pending_events.push(SimEvent::GameChanged {
            previous,
            game_id: entry.id.to_string(),
            label: entry.label.to_string(),
        });
        self.active = Some(ActiveGame {
            entry,
            engine,
            side_game,
            ui,
        });
        Ok(())
    }

    /// Swap the UI of the active game, keeping its engine state.
    pub fn replace_ui(&mut self, mut ui: Box<dyn GameUi>) -> SimResult<()> {
        let active = self.active.as_mut().ok_or(SimError::NoActiveGame)?;
        ui.init(active.entry.id)?;
        active.ui.destroy();
        active.ui = ui;
        Ok(())
    }

    /// Fresh engine and side game for the active game: jackpot and
    /// reserve back to their configured starting values. The UI stays.
    pub fn reset_engine(&mut self) -> SimResult<()> {
        let active = self.active.as_mut().ok_or(SimError::NoActiveGame)?;
        active.engine = self.registry.build_engine(&active.entry);
        active.side_game = self.registry.build_side_game(&active.entry);
        Ok(())
    }

    pub fn active(&self) -> Option<&ActiveGame> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> SimResult<&mut ActiveGame> {
        self.active.as_mut().ok_or(SimError::NoActiveGame)
    }

    pub fn active_id(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.entry.id)
    }

    pub fn engine(&self) -> Option<&dyn DrawEngine> {
        self.active.as_ref().map(|a| a.engine.as_ref())
    }

    /// The active selection, which must be complete.
    pub fn complete_selection(&self) -> SimResult<PlayerSelection> {
        let active = self.active.as_ref().ok_or(SimError::NoActiveGame)?;
        match active.ui.selection() {
            Some(selection) if active.ui.is_selection_complete() => Ok(selection.clone()),
            _ => Err(SimError::SelectionIncomplete {
                game: active.entry.id.to_string(),
            }),
        }
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
