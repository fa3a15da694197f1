//! The contract between the game manager and whatever collects the
//! player's picks. A browser front end would render a form here; the
//! headless implementation just holds a selection.

use crate::{
    error::{SimError, SimResult},
    rng::{GameSlot, RngBank},
    selection::PlayerSelection,
};

pub trait GameUi: Send {
    /// Called when `game_id` becomes the active game.
    fn init(&mut self, game_id: &str) -> SimResult<()>;

    /// Called before another game replaces this one.
    fn destroy(&mut self);

    /// Current selection, if the player made one.
    fn selection(&self) -> Option<&PlayerSelection>;

    fn is_selection_complete(&self) -> bool {
        self.selection().map(PlayerSelection::is_complete).unwrap_or(false)
    }
}

/// Selection holder for runs without a front end.
#[derive(Debug, Default)]
pub struct HeadlessUi {
    game_id: Option<String>,
    selection: Option<PlayerSelection>,
    quick_pick_seed: Option<u64>,
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed selection. `init` rejects it for any other game.
    pub fn with_selection(selection: PlayerSelection) -> Self {
        Self {
            selection: Some(selection),
            ..Self::default()
        }
    }

    /// Random complete selection generated on `init`.
    pub fn quick_pick(seed: u64) -> Self {
        Self {
            quick_pick_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    pub fn set_selection(&mut self, selection: PlayerSelection) -> SimResult<()> {
        if let Some(game) = &self.game_id {
            if selection.game_id() != game {
                return Err(SimError::SelectionMismatch {
                    expected: game.clone(),
                    got: selection.game_id().to_string(),
                });
            }
        }
        self.selection = Some(selection);
        Ok(())
    }
}

impl GameUi for HeadlessUi {
    fn init(&mut self, game_id: &str) -> SimResult<()> {
        if let Some(seed) = self.quick_pick_seed {
            let mut rng = RngBank::new(seed).for_draw(GameSlot::QuickPick, 0);
            self.selection = PlayerSelection::quick_pick(game_id, &mut rng);
        }
        if let Some(selection) = &self.selection {
            if selection.game_id() != game_id {
                return Err(SimError::SelectionMismatch {
                    expected: game_id.to_string(),
                    got: selection.game_id().to_string(),
                });
            }
        }
        self.game_id = Some(game_id.to_string());
        Ok(())
    }

    fn destroy(&mut self) {
        self.game_id = None;
    }

    fn selection(&self) -> Option<&PlayerSelection> {
        self.selection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_pick_ui_is_complete_after_init() {
        let mut ui = HeadlessUi::quick_pick(99);
        assert!(!ui.is_selection_complete());
        ui.init("gordo").expect("init");
        assert!(ui.is_selection_complete());
        assert_eq!(ui.selection().map(|s| s.game_id()), Some("gordo"));
    }

    #[test]
    fn selection_for_another_game_is_rejected() {
        let mut ui = HeadlessUi::with_selection(PlayerSelection::LoteriaNacional { number: 12_345 });
        assert!(ui.init("primitiva").is_err());
        assert!(ui.init("loteria_nacional").is_ok());
        let wrong = PlayerSelection::Gordo { main: vec![1, 2, 3, 4, 5], key: 1 };
        assert!(ui.set_selection(wrong).is_err());
    }
}
