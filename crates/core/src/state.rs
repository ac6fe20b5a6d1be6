use crate::Catalog;
use serde::{Deserialize, Serialize};

/// Rooms to clear before a dungeon level is complete.
pub const ROOMS_PER_LEVEL: u8 = 6;
/// Dungeon level at which the run can end.
pub const WIN_LEVEL: u8 = 5;
/// Shards required at the final level for victory.
pub const WIN_SHARDS: i64 = 3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    pub hp: i64,
    pub max_health: i64,
    pub energy: i64,
    pub max_energy: i64,
    pub food: i64,
    pub favor: i64,
    pub shards: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscardPiles {
    pub room: Vec<String>,
    pub result: Vec<String>,
    pub loot: Vec<String>,
    pub trappings: Vec<String>,
}

/// UI-restoration hints. Not gameplay-authoritative; ids that fail to
/// resolve are simply absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisibleCards {
    #[serde(default)]
    pub race_id: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default)]
    pub room_card_id: Option<String>,
    #[serde(default)]
    pub result_card_id: Option<String>,
    #[serde(default)]
    pub enemy_card_id: Option<String>,
}

/// Suspended combat, mirrored after every combat step so a save taken
/// mid-encounter resumes exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncounterState {
    pub in_progress: bool,
    pub enemy_id: String,
    pub enemy_hp: i64,
    pub player_hp: i64,
}

/// The persisted aggregate. Serialized verbatim for save/resume; decks are
/// ordered id lists reconstructed against the catalog on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRunState {
    pub player: PlayerStats,
    pub level: u8,
    pub current_room: u8,
    pub race_id: String,
    pub class_id: String,
    pub inventory: Vec<String>,
    #[serde(default)]
    pub discard: DiscardPiles,
    #[serde(default)]
    pub visible: VisibleCards,
    #[serde(default)]
    pub encounter: Option<EncounterState>,
    pub dungeon_deck: Vec<String>,
    pub dungeon_result_deck: Vec<String>,
    #[serde(default)]
    pub axe_reroll_used: bool,
}

impl PlayerRunState {
    /// Drop every card id that no longer resolves in the catalog. Dangling
    /// references are a data-shape error and load must not fail on them.
    pub fn sanitize(&mut self, catalog: &Catalog) {
        let keep = |ids: &mut Vec<String>| ids.retain(|id| catalog.contains(id));
        keep(&mut self.inventory);
        keep(&mut self.dungeon_deck);
        keep(&mut self.dungeon_result_deck);
        keep(&mut self.discard.room);
        keep(&mut self.discard.result);
        keep(&mut self.discard.loot);
        keep(&mut self.discard.trappings);
        keep(&mut self.visible.inventory);
        let drop_missing = |slot: &mut Option<String>| {
            if slot.as_deref().is_some_and(|id| !catalog.contains(id)) {
                *slot = None;
            }
        };
        drop_missing(&mut self.visible.race_id);
        drop_missing(&mut self.visible.class_id);
        drop_missing(&mut self.visible.room_card_id);
        drop_missing(&mut self.visible.result_card_id);
        drop_missing(&mut self.visible.enemy_card_id);
        if self
            .encounter
            .as_ref()
            .is_some_and(|enc| !catalog.contains(&enc.enemy_id))
        {
            self.encounter = None;
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

/// Win/loss evaluation, pure over the run state. HP defeat is checked first
/// and short-circuits the level/shard checks.
pub fn run_outcome(state: &PlayerRunState) -> Option<RunOutcome> {
    if state.player.hp <= 0 {
        return Some(RunOutcome::Defeat);
    }
    if state.level >= WIN_LEVEL && state.current_room >= ROOMS_PER_LEVEL {
        if state.player.shards >= WIN_SHARDS {
            return Some(RunOutcome::Victory);
        }
        return Some(RunOutcome::Defeat);
    }
    None
}
