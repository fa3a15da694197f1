//! Game registry: id → engine factory.
//!
//! Lookups are forgiving about spelling: case, hyphens vs underscores
//! and a few common long names all resolve to the canonical id.

use crate::{
    bonoloto_engine::BonolotoEngine,
    config::GameCatalog,
    engine::DrawEngine,
    error::{SimError, SimResult},
    eurodreams_engine::EuroDreamsEngine,
    euromillones_engine::EuromillonesEngine,
    gordo_engine::GordoEngine,
    loteria_engine::LoteriaEngine,
    lototurf_engine::LototurfEngine,
    primitiva_engine::PrimitivaEngine,
    quiniela_engine::QuinielaEngine,
    quinigol_engine::QuinigolEngine,
    rng::GameSlot,
    side_game::{ElMillon, Joker, SideGame},
};

pub type EngineFactory = fn(&GameCatalog) -> Box<dyn DrawEngine>;
pub type SideGameFactory = fn(&GameCatalog) -> Box<dyn SideGame>;

#[derive(Clone, Copy)]
pub struct GameEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub slot: GameSlot,
    pub factory: EngineFactory,
    pub side_game: Option<SideGameFactory>,
}

impl std::fmt::Debug for GameEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEntry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("side_game", &self.side_game.is_some())
            .finish()
    }
}

const ALIASES: [(&str, &str); 7] = [
    ("la_primitiva", "primitiva"),
    ("el_gordo", "gordo"),
    ("gordo_primitiva", "gordo"),
    ("euro_dreams", "eurodreams"),
    ("loteria", "loteria_nacional"),
    ("euro_millones", "euromillones"),
    ("euromillions", "euromillones"),
];

/// Canonical spelling of a game id.
pub fn normalize(id: &str) -> String {
    let id = id.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == id)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(id)
}

pub struct GameRegistry {
    catalog: GameCatalog,
    entries: Vec<GameEntry>,
}

impl GameRegistry {
    /// Registry of every built-in game over the given tables.
    pub fn new(catalog: GameCatalog) -> Self {
        Self {
            catalog,
            entries: builtin_entries(),
        }
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn entries(&self) -> &[GameEntry] {
        &self.entries
    }

    /// Canonical ids of the games that can be loaded.
    pub fn enabled_ids(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| self.catalog.is_enabled(e.id))
            .map(|e| e.id)
            .collect()
    }

    pub fn resolve(&self, id: &str) -> SimResult<&GameEntry> {
        let canonical = normalize(id);
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == canonical)
            .ok_or_else(|| SimError::UnknownGame { id: id.to_string() })?;
        if !self.catalog.is_enabled(entry.id) {
            return Err(SimError::GameDisabled { id: entry.id.to_string() });
        }
        Ok(entry)
    }

    pub fn build_engine(&self, entry: &GameEntry) -> Box<dyn DrawEngine> {
        (entry.factory)(&self.catalog)
    }

    pub fn build_side_game(&self, entry: &GameEntry) -> Option<Box<dyn SideGame>> {
        entry.side_game.map(|factory| factory(&self.catalog))
    }
}

fn builtin_entries() -> Vec<GameEntry> {
    vec![
        GameEntry {
            id: "primitiva",
            label: "La Primitiva",
            slot: GameSlot::Primitiva,
            factory: |c| Box::new(PrimitivaEngine::new(c.primitiva.clone())),
            side_game: Some(|c| Box::new(Joker::new(c.joker.clone()))),
        },
        GameEntry {
            id: "euromillones",
            label: "Euromillones",
            slot: GameSlot::Euromillones,
            factory: |c| Box::new(EuromillonesEngine::new(c.euromillones.clone())),
            side_game: Some(|c| Box::new(ElMillon::new(c.el_millon.clone()))),
        },
        GameEntry {
            id: "bonoloto",
            label: "Bonoloto",
            slot: GameSlot::Bonoloto,
            factory: |c| Box::new(BonolotoEngine::new(c.bonoloto.clone())),
            side_game: None,
        },
        GameEntry {
            id: "gordo",
            label: "El Gordo de la Primitiva",
            slot: GameSlot::Gordo,
            factory: |c| Box::new(GordoEngine::new(c.gordo.clone())),
            side_game: None,
        },
        GameEntry {
            id: "eurodreams",
            label: "EuroDreams",
            slot: GameSlot::EuroDreams,
            factory: |c| Box::new(EuroDreamsEngine::new(c.eurodreams.clone())),
            side_game: None,
        },
        GameEntry {
            id: "loteria_nacional",
            label: "Lotería Nacional",
            slot: GameSlot::LoteriaNacional,
            factory: |c| Box::new(LoteriaEngine::new(c.loteria_nacional.clone())),
            side_game: None,
        },
        GameEntry {
            id: "quiniela",
            label: "La Quiniela",
            slot: GameSlot::Quiniela,
            factory: |c| Box::new(QuinielaEngine::new(c.quiniela.clone())),
            side_game: None,
        },
        GameEntry {
            id: "lototurf",
            label: "Lototurf",
            slot: GameSlot::Lototurf,
            factory: |c| Box::new(LototurfEngine::new(c.lototurf.clone())),
            side_game: None,
        },
        GameEntry {
            id: "quinigol",
            label: "Quinigol",
            slot: GameSlot::Quinigol,
            factory: |c| Box::new(QuinigolEngine::new(c.quinigol.clone())),
            side_game: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_ids() {
        assert_eq!(normalize("Loteria-Nacional"), "loteria_nacional");
        assert_eq!(normalize("euro-dreams"), "eurodreams");
        assert_eq!(normalize("el gordo"), "gordo");
        assert_eq!(normalize("quiniela"), "quiniela");
    }

    #[test]
    fn unknown_and_disabled_games_fail() {
        let mut catalog = GameCatalog::default_catalog();
        catalog.disabled = vec!["quinigol".to_string()];
        let registry = GameRegistry::new(catalog);

        assert!(matches!(registry.resolve("bingo"), Err(SimError::UnknownGame { .. })));
        assert!(matches!(registry.resolve("quinigol"), Err(SimError::GameDisabled { .. })));
        let entry = registry.resolve("loteria-nacional").expect("registered");
        assert_eq!(entry.id, "loteria_nacional");
        assert_eq!(registry.build_engine(entry).game_id(), "loteria_nacional");
        assert_eq!(registry.enabled_ids().len(), 8);
    }

    #[test]
    fn only_primitiva_and_euromillones_carry_side_games() {
        let registry = GameRegistry::new(GameCatalog::default_catalog());
        let with_side: Vec<&str> = registry
            .entries()
            .iter()
            .filter(|e| e.side_game.is_some())
            .map(|e| e.id)
            .collect();
        assert_eq!(with_side, vec!["primitiva", "euromillones"]);
    }
}
