use serde::Deserialize;

pub use shardfall_core::{Catalog, DeckPlan, EffectDef};

/// Raw deck card as authored. Room-side cards carry `icons` and a linked
/// result id; result-side cards carry the descriptor strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDungeonCard {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub icons: Option<String>,
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

#[derive(Debug, Clone, Deserialize)]
pub struct RawEnemyCard {
    pub id: Option<String>,
    pub name: Option<String>,
    pub health: i64,
    pub attack: i64,
    pub defense: i64,
    #[serde(default)]
    pub favor: Option<RawFavor>,
    #[serde(default)]
    pub enemy_type: Option<String>,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// Favor is either a plain integer or the dynamic marker string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFavor {
    Fixed(i64),
    Marker(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItemCard {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRaceCard {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub class_restriction: Option<String>,
    pub health: i64,
    pub energy: i64,
    #[serde(default)]
    pub rations: i64,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawClassCard {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub starting_trapping: Option<OneOrMany>,
    #[serde(default)]
    pub health_modifier: i64,
    #[serde(default)]
    pub energy_modifier: i64,
    #[serde(default)]
    pub combat_bonus_damage_energy_cost: Vec<i64>,
    #[serde(default)]
    pub combat_bonus_damage: Vec<i64>,
    #[serde(default)]
    pub abilities: Vec<EffectDef>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// `starting_trapping` is authored as either a single id or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDeckPlan {
    pub dungeon: Vec<String>,
    pub results: Vec<String>,
}
