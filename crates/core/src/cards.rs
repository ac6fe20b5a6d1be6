use crate::EffectDef;
use serde::{Deserialize, Serialize};

/// Result card that redirects its loot into an ambush fight.
pub const MIMIC_RESULT_ID: &str = "RES_08";
/// The enemy that ambush resolves against.
pub const MIMIC_ENEMY_ID: &str = "ENM_MIMIC";
/// Race that takes both campsite packages with no choice offered.
pub const FORAGER_RACE_ID: &str = "RACE_HALFLING";
/// Trapping that boosts the campsite heal package.
pub const BEDROLL_ID: &str = "TRP_BEDROLL";
/// Trapping that upgrades the Water icon to three dice.
pub const FISHING_ROD_ID: &str = "TRP_FISHING_ROD";
/// Trapping carrying the combat Reroll/Discard special actions.
pub const AXE_ID: &str = "TRP_AXE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDef {
    pub id: String,
    pub name: String,
    pub kind: CardData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CardData {
    Dungeon(DungeonCard),
    Enemy(EnemyCard),
    Loot(ItemCard),
    Trap(ItemCard),
    Trapping(ItemCard),
    Race(RaceCard),
    Class(ClassCard),
}

/// A deck card. Room-side data is the `icons` list; result-side data is the
/// free-form descriptor strings consumed by the icon pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DungeonCard {
    #[serde(default)]
    pub icons: String,
    #[serde(default)]
    pub linked_result_id: Option<String>,
    #[serde(default)]
    pub loot: Option<String>,
    #[serde(default)]
    pub trap: Option<String>,
    #[serde(default)]
    pub random: Option<String>,
    #[serde(default)]
    pub enemy: Option<String>,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyCard {
    pub health: i64,
    pub attack: i64,
    pub defense: i64,
    pub favor: FavorAward,
    #[serde(default)]
    pub enemy_type: Option<String>,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// Favor printed on an enemy card; the dynamic marker resolves at the moment
/// of victory, not at load time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FavorAward {
    Fixed(i64),
    EqualsDungeonLevel,
}

impl FavorAward {
    pub fn resolve(self, level: u8) -> i64 {
        match self {
            Self::Fixed(value) => value,
            Self::EqualsDungeonLevel => i64::from(level),
        }
    }
}

/// Shared payload for loot, trap and trapping cards. Their semantics live
/// entirely in the ability/effect lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCard {
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceCard {
    #[serde(default)]
    pub class_restriction: Option<String>,
    pub health: i64,
    pub energy: i64,
    pub rations: i64,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCard {
    #[serde(default)]
    pub starting_trappings: Vec<String>,
    #[serde(default)]
    pub health_modifier: i64,
    #[serde(default)]
    pub energy_modifier: i64,
    /// Parallel arrays mapping energy spent to bonus combat damage.
    #[serde(default)]
    pub bonus_damage_energy_cost: Vec<i64>,
    #[serde(default)]
    pub bonus_damage: Vec<i64>,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

impl ClassCard {
    /// Bonus damage bought with `energy` points, or 0 when the spend does not
    /// match any table entry.
    pub fn bonus_for_energy(&self, energy: i64) -> i64 {
        self.bonus_damage_energy_cost
            .iter()
            .position(|cost| *cost == energy)
            .and_then(|idx| self.bonus_damage.get(idx).copied())
            .unwrap_or(0)
    }
}

impl CardDef {
    /// Ability and effect lists for the trigger engine, in that order.
    pub fn ability_lists(&self) -> (&[EffectDef], &[EffectDef]) {
        match &self.kind {
            CardData::Dungeon(card) => (&card.abilities, &card.effects),
            CardData::Enemy(card) => (&card.abilities, &card.effects),
            CardData::Loot(card) | CardData::Trap(card) | CardData::Trapping(card) => {
                (&card.abilities, &card.effects)
            }
            CardData::Race(card) => (&card.abilities, &card.effects),
            CardData::Class(card) => (&card.abilities, &card.effects),
        }
    }

    pub fn as_dungeon(&self) -> Option<&DungeonCard> {
        match &self.kind {
            CardData::Dungeon(card) => Some(card),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyCard> {
        match &self.kind {
            CardData::Enemy(card) => Some(card),
            _ => None,
        }
    }

    pub fn as_race(&self) -> Option<&RaceCard> {
        match &self.kind {
            CardData::Race(card) => Some(card),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassCard> {
        match &self.kind {
            CardData::Class(card) => Some(card),
            _ => None,
        }
    }
}
