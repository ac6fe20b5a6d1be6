use crate::{PlayerStats, RunOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    StatsChanged(PlayerStats),
    InventoryChanged(Vec<String>),
    RoomRevealed { card_id: String },
    RoomPaired { room_id: String, result_id: String },
    IconResolved { icon: String },
    UnknownIcon { icon: String },
    AbilityLog(String),
    TrapSprung { stat: String, amount: i64 },
    TrapBypassed,
    LootGained { card_id: String },
    LootDeclined { card_id: String },
    ShardGained,
    CombatStarted { enemy_id: String, enemy_hp: i64 },
    CombatTurnResolved {
        player_turn: bool,
        roll1: u8,
        roll2: u8,
        damage: i64,
        miss: bool,
    },
    SpecialItemDiscarded { card_id: String, damage: i64 },
    EnemyDefeated { enemy_id: String, favor: i64 },
    EncounterBypassed { enemy_id: String },
    ItemUsed { card_id: String },
    ItemDiscarded { card_id: String },
    RoomCleared { rooms_cleared: u8 },
    LevelCleared { level: u8 },
    RunEnded(RunOutcome),
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
