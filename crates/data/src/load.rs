use crate::schema::{
    OneOrMany, RawClassCard, RawDeckPlan, RawDungeonCard, RawEnemyCard, RawFavor, RawItemCard,
    RawRaceCard,
};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use shardfall_core::{
    CardData, CardDef, Catalog, ClassCard, DeckPlan, DungeonCard, EnemyCard, FavorAward, ItemCard,
    RaceCard,
};
use std::fs;
use std::path::Path;

/// Load the full card catalog and deck plan from an assets directory.
pub fn load_catalog(dir: &Path) -> anyhow::Result<(Catalog, DeckPlan)> {
    let mut cards = Vec::new();

    let rooms: Vec<RawDungeonCard> = load_json(dir.join("dungeon.json"))?;
    let results: Vec<RawDungeonCard> = load_json(dir.join("results.json"))?;
    for raw in rooms.into_iter().chain(results) {
        cards.push(convert_dungeon(raw)?);
    }

    let enemies: Vec<RawEnemyCard> = load_json(dir.join("enemies.json"))?;
    for raw in enemies {
        cards.push(convert_enemy(raw)?);
    }

    for (file, kind) in [
        ("loot.json", ItemKind::Loot),
        ("traps.json", ItemKind::Trap),
        ("trappings.json", ItemKind::Trapping),
    ] {
        let items: Vec<RawItemCard> = load_json(dir.join(file))?;
        for raw in items {
            cards.push(convert_item(raw, kind)?);
        }
    }

    let races: Vec<RawRaceCard> = load_json(dir.join("races.json"))?;
    for raw in races {
        cards.push(convert_race(raw)?);
    }
    let classes: Vec<RawClassCard> = load_json(dir.join("classes.json"))?;
    for raw in classes {
        cards.push(convert_class(raw)?);
    }

    let catalog = Catalog::from_cards(cards).context("build card catalog")?;
    let raw_plan: RawDeckPlan = load_json(dir.join("decks.json"))?;
    let plan = DeckPlan {
        dungeon: raw_plan.dungeon,
        results: raw_plan.results,
    };
    Ok((catalog, plan))
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

/// Cards without both an id and a name are rejected at load time.
fn identity(id: Option<String>, name: Option<String>, what: &str) -> anyhow::Result<(String, String)> {
    match (id, name) {
        (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => Ok((id, name)),
        (id, _) => bail!("{what} card {id:?} is missing an id or name"),
    }
}

fn convert_dungeon(raw: RawDungeonCard) -> anyhow::Result<CardDef> {
    let (id, name) = identity(raw.id, raw.name, "dungeon")?;
    Ok(CardDef {
        id,
        name,
        kind: CardData::Dungeon(DungeonCard {
            icons: raw.icons.unwrap_or_default(),
            linked_result_id: raw.linked_result_id,
            loot: raw.loot,
            trap: raw.trap,
            random: raw.random,
            enemy: raw.enemy,
            abilities: raw.abilities,
            effects: raw.effects,
        }),
    })
}

fn convert_enemy(raw: RawEnemyCard) -> anyhow::Result<CardDef> {
    let (id, name) = identity(raw.id, raw.name, "enemy")?;
    let favor = match raw.favor {
        None => FavorAward::Fixed(0),
        Some(RawFavor::Fixed(value)) => FavorAward::Fixed(value.max(0)),
        Some(RawFavor::Marker(marker)) => {
            if marker != "EqualsDungeonLevel" {
                bail!("enemy {id} has unknown favor marker '{marker}'");
            }
            FavorAward::EqualsDungeonLevel
        }
    };
    Ok(CardDef {
        id,
        name,
        kind: CardData::Enemy(EnemyCard {
            health: raw.health.max(0),
            attack: raw.attack.max(0),
            defense: raw.defense.max(0),
            favor,
            enemy_type: raw.enemy_type,
            abilities: raw.abilities,
            effects: raw.effects,
        }),
    })
}

#[derive(Clone, Copy)]
enum ItemKind {
    Loot,
    Trap,
    Trapping,
}

fn convert_item(raw: RawItemCard, kind: ItemKind) -> anyhow::Result<CardDef> {
    let (id, name) = identity(raw.id, raw.name, "item")?;
    let payload = ItemCard {
        abilities: raw.abilities,
        effects: raw.effects,
        details: raw.details,
    };
    Ok(CardDef {
        id,
        name,
        kind: match kind {
            ItemKind::Loot => CardData::Loot(payload),
            ItemKind::Trap => CardData::Trap(payload),
            ItemKind::Trapping => CardData::Trapping(payload),
        },
    })
}

fn convert_race(raw: RawRaceCard) -> anyhow::Result<CardDef> {
    let (id, name) = identity(raw.id, raw.name, "race")?;
    Ok(CardDef {
        id,
        name,
        kind: CardData::Race(RaceCard {
            class_restriction: raw.class_restriction,
            health: raw.health.max(0),
            energy: raw.energy.max(0),
            rations: raw.rations.max(0),
            abilities: raw.abilities,
            effects: raw.effects,
        }),
    })
}

fn convert_class(raw: RawClassCard) -> anyhow::Result<CardDef> {
    let (id, name) = identity(raw.id, raw.name, "class")?;
    let costs = raw.combat_bonus_damage_energy_cost;
    let bonuses = raw.combat_bonus_damage;
    if costs.len() != bonuses.len() {
        bail!("class {id} has mismatched combat bonus tables");
    }
    Ok(CardDef {
        id,
        name,
        kind: CardData::Class(ClassCard {
            starting_trappings: raw
                .starting_trapping
                .map(OneOrMany::into_vec)
                .unwrap_or_default(),
            health_modifier: raw.health_modifier,
            energy_modifier: raw.energy_modifier,
            bonus_damage_energy_cost: costs,
            bonus_damage: bonuses,
            abilities: raw.abilities,
            effects: raw.effects,
        }),
    })
}
