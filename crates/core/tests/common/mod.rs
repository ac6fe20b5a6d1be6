#![allow(dead_code)]

use shardfall_core::{
    CardData, CardDef, Catalog, ClassCard, DeckPlan, DiscardPiles, DungeonCard, EffectDef,
    EnemyCard, FavorAward, ItemCard, PlayerRunState, PlayerStats, RaceCard, Session, VisibleCards,
};

pub const RACE_ID: &str = "RACE_TEST";
pub const CLASS_ID: &str = "CLS_TEST";
pub const SEED: u64 = 7;

pub fn effect(trigger: &str, action: &str) -> EffectDef {
    EffectDef {
        trigger: Some(trigger.to_string()),
        action: action.to_string(),
        ..EffectDef::default()
    }
}

pub fn effect_on(trigger: &str, action: &str, target: Option<&str>, amount: i64) -> EffectDef {
    EffectDef {
        trigger: Some(trigger.to_string()),
        action: action.to_string(),
        target: target.map(str::to_string),
        amount: Some(amount),
        details: None,
    }
}

pub fn room(id: &str, name: &str, icons: &str, linked: Option<&str>) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Dungeon(DungeonCard {
            icons: icons.to_string(),
            linked_result_id: linked.map(str::to_string),
            ..DungeonCard::default()
        }),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn result(
    id: &str,
    name: &str,
    icons: &str,
    loot: Option<&str>,
    trap: Option<&str>,
    random: Option<&str>,
    enemy: Option<&str>,
) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Dungeon(DungeonCard {
            icons: icons.to_string(),
            linked_result_id: None,
            loot: loot.map(str::to_string),
            trap: trap.map(str::to_string),
            random: random.map(str::to_string),
            enemy: enemy.map(str::to_string),
            abilities: Vec::new(),
            effects: Vec::new(),
        }),
    }
}

pub fn enemy(id: &str, name: &str, health: i64, attack: i64, defense: i64, favor: i64) -> CardDef {
    enemy_with(
        id,
        name,
        health,
        attack,
        defense,
        FavorAward::Fixed(favor),
        Vec::new(),
    )
}

pub fn enemy_with(
    id: &str,
    name: &str,
    health: i64,
    attack: i64,
    defense: i64,
    favor: FavorAward,
    abilities: Vec<EffectDef>,
) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Enemy(EnemyCard {
            health,
            attack,
            defense,
            favor,
            enemy_type: None,
            abilities,
            effects: Vec::new(),
        }),
    }
}

pub fn trapping(id: &str, name: &str, effects: Vec<EffectDef>) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Trapping(ItemCard {
            abilities: Vec::new(),
            effects,
            details: None,
        }),
    }
}

pub fn loot_card(id: &str, name: &str, effects: Vec<EffectDef>) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Loot(ItemCard {
            abilities: Vec::new(),
            effects,
            details: None,
        }),
    }
}

pub fn race(
    id: &str,
    name: &str,
    health: i64,
    energy: i64,
    rations: i64,
    restriction: Option<&str>,
) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Race(RaceCard {
            class_restriction: restriction.map(str::to_string),
            health,
            energy,
            rations,
            abilities: Vec::new(),
            effects: Vec::new(),
        }),
    }
}

pub fn class(
    id: &str,
    name: &str,
    trappings: &[&str],
    health_modifier: i64,
    energy_modifier: i64,
    costs: &[i64],
    bonuses: &[i64],
) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Class(ClassCard {
            starting_trappings: ids(trappings),
            health_modifier,
            energy_modifier,
            bonus_damage_energy_cost: costs.to_vec(),
            bonus_damage: bonuses.to_vec(),
            abilities: Vec::new(),
            effects: Vec::new(),
        }),
    }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|id| id.to_string()).collect()
}

/// Catalog with the standard test race (10 HP, 3 energy, 2 rations) and a
/// class whose bonus table maps 1 energy to +1 and 2 energy to +3.
pub fn catalog_with(mut cards: Vec<CardDef>, trappings: &[&str]) -> Catalog {
    cards.push(race(RACE_ID, "Test Race", 10, 3, 2, None));
    cards.push(class(CLASS_ID, "Test Class", trappings, 0, 0, &[1, 2], &[1, 3]));
    Catalog::from_cards(cards).unwrap()
}

pub fn start_with(
    cards: Vec<CardDef>,
    trappings: &[&str],
    dungeon: &[&str],
    results: &[&str],
) -> Session {
    let catalog = catalog_with(cards, trappings);
    let plan = DeckPlan {
        dungeon: ids(dungeon),
        results: ids(results),
    };
    Session::new(catalog, &plan, RACE_ID, CLASS_ID, SEED).unwrap()
}

pub fn start(cards: Vec<CardDef>, dungeon: &[&str], results: &[&str]) -> Session {
    start_with(cards, &[], dungeon, results)
}

/// A mid-run aggregate for restore-based tests; tweak the public fields
/// before handing it to [`resume`].
pub fn run_state(level: u8, current_room: u8, dungeon: &[&str], results: &[&str]) -> PlayerRunState {
    PlayerRunState {
        player: PlayerStats {
            hp: 10,
            max_health: 10,
            energy: 3,
            max_energy: 3,
            food: 2,
            favor: 0,
            shards: 0,
        },
        level,
        current_room,
        race_id: RACE_ID.to_string(),
        class_id: CLASS_ID.to_string(),
        inventory: Vec::new(),
        discard: DiscardPiles::default(),
        visible: VisibleCards::default(),
        encounter: None,
        dungeon_deck: ids(dungeon),
        dungeon_result_deck: ids(results),
        axe_reroll_used: false,
    }
}

pub fn resume(cards: Vec<CardDef>, state: PlayerRunState) -> Session {
    Session::restore(catalog_with(cards, &[]), state, SEED).unwrap()
}
