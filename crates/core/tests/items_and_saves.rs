mod common;

use common::*;
use shardfall_core::{
    apply_trigger, AbilityContext, CardData, CardDef, ClassCard, EncounterState, Event, EventBus,
    PlayerRunState, RaceCard, Session, SessionError, TriggerPoint,
};

#[test]
fn using_a_tonic_heals_and_consumes_it() {
    let cards = vec![loot_card(
        "LOOT_TONIC",
        "Bitter Tonic",
        vec![effect_on("on_use", "heal", None, 3)],
    )];
    let mut state = run_state(1, 0, &[], &[]);
    state.player.hp = 6;
    state.inventory = ids(&["LOOT_TONIC"]);
    let mut session = resume(cards, state);
    let mut events = EventBus::default();

    session.use_item(0, &mut events).unwrap();
    assert_eq!(session.state().player.hp, 9);
    assert!(session.state().inventory.is_empty());
    assert_eq!(session.state().discard.loot, ids(&["LOOT_TONIC"]));
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen
        .iter()
        .any(|event| matches!(event, Event::ItemUsed { card_id } if card_id == "LOOT_TONIC")));
}

#[test]
fn an_item_with_no_use_effect_stays_put() {
    let cards = vec![trapping("TRP_ROPE", "Coil of Rope", Vec::new())];
    let mut state = run_state(1, 0, &[], &[]);
    state.inventory = ids(&["TRP_ROPE"]);
    let mut session = resume(cards, state);
    let mut events = EventBus::default();

    session.use_item(0, &mut events).unwrap();
    assert_eq!(session.state().inventory, ids(&["TRP_ROPE"]));
}

#[test]
fn discarding_fires_the_discard_trigger() {
    let cards = vec![loot_card(
        "LOOT_BANNER",
        "Broken Banner",
        vec![effect_on("on_discard", "gain_resource", Some("favor"), 1)],
    )];
    let mut state = run_state(1, 0, &[], &[]);
    state.inventory = ids(&["LOOT_BANNER"]);
    let mut session = resume(cards, state);
    let mut events = EventBus::default();

    session.discard_item(0, &mut events).unwrap();
    assert_eq!(session.state().player.favor, 1);
    assert!(session.state().inventory.is_empty());
    assert_eq!(session.state().discard.loot, ids(&["LOOT_BANNER"]));
}

#[test]
fn an_empty_slot_is_an_error() {
    let mut session = resume(Vec::new(), run_state(1, 0, &[], &[]));
    let mut events = EventBus::default();
    let err = session.use_item(5, &mut events).unwrap_err();
    assert!(matches!(err, SessionError::InvalidItemIndex(5)));
}

#[test]
fn restore_drops_dangling_ids() {
    let cards = vec![loot_card("LOOT_TONIC", "Bitter Tonic", Vec::new())];
    let mut state = run_state(1, 0, &["GHOST_ROOM"], &["GHOST_RESULT"]);
    state.inventory = ids(&["LOOT_TONIC", "GHOST_ITEM"]);
    let session = resume(cards, state);
    assert_eq!(session.state().inventory, ids(&["LOOT_TONIC"]));
    assert!(session.state().dungeon_deck.is_empty());
    assert!(session.state().dungeon_result_deck.is_empty());
}

#[test]
fn a_run_survives_the_json_round_trip() {
    let mut state = run_state(2, 3, &["DUN_A"], &["RES_A"]);
    state.player.favor = 4;
    state.player.hp = 7;
    state.inventory = ids(&["LOOT_TONIC"]);
    state.discard.loot = ids(&["LOOT_BANNER"]);
    state.visible.room_card_id = Some("DUN_A".to_string());
    state.encounter = Some(EncounterState {
        in_progress: true,
        enemy_id: "ENM_X".to_string(),
        enemy_hp: 4,
        player_hp: 7,
    });
    state.axe_reroll_used = true;

    let text = serde_json::to_string(&state).unwrap();
    let back: PlayerRunState = serde_json::from_str(&text).unwrap();
    assert_eq!(back, state);
}

#[test]
fn restore_requires_the_race_and_class() {
    let mut state = run_state(1, 0, &[], &[]);
    state.class_id = "CLS_GONE".to_string();
    let err = Session::restore(catalog_with(Vec::new(), &[]), state, SEED).unwrap_err();
    assert!(matches!(err, SessionError::UnknownCard(id) if id == "CLS_GONE"));
}

fn race_with(id: &str, name: &str, abilities: Vec<shardfall_core::EffectDef>) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Race(RaceCard {
            class_restriction: None,
            health: 10,
            energy: 3,
            rations: 2,
            abilities,
            effects: Vec::new(),
        }),
    }
}

fn class_with(id: &str, name: &str, abilities: Vec<shardfall_core::EffectDef>) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardData::Class(ClassCard {
            starting_trappings: Vec::new(),
            health_modifier: 0,
            energy_modifier: 0,
            bonus_damage_energy_cost: Vec::new(),
            bonus_damage: Vec::new(),
            abilities,
            effects: Vec::new(),
        }),
    }
}

#[test]
fn trigger_sources_fold_in_a_fixed_order() {
    let bonus = || vec![effect_on("on_attack", "damage", None, 1)];
    let first = trapping("IT_A", "First Charm", bonus());
    let second = trapping("IT_B", "Second Charm", bonus());
    let foe = enemy_with(
        "ENM_X",
        "Gnasher",
        1,
        0,
        0,
        shardfall_core::FavorAward::Fixed(0),
        bonus(),
    );
    let folk = race_with("RACE_X", "Wild Folk", bonus());
    let caller = class_with("CLS_X", "War Caller", bonus());

    let mut ctx = AbilityContext::new()
        .with_inventory(vec![&first, &second])
        .with_enemy(Some(&foe))
        .with_race(Some(&folk))
        .with_class(Some(&caller))
        .with_rolls(4, 1);
    apply_trigger(TriggerPoint::OnAttack, &mut ctx);
    let outcome = ctx.into_outcome();

    assert_eq!(outcome.attack_bonus, 5);
    let order: Vec<&str> = outcome
        .logs
        .iter()
        .map(|line| line.split(':').next().unwrap())
        .collect();
    assert_eq!(
        order,
        vec!["First Charm", "Second Charm", "Gnasher", "Wild Folk", "War Caller"]
    );
}

#[test]
fn unknown_actions_log_but_apply_nothing() {
    let odd = trapping(
        "IT_ODD",
        "Odd Fetish",
        vec![effect("on_attack", "summon_dragon")],
    );
    let mut ctx = AbilityContext::new().with_inventory(vec![&odd]);
    apply_trigger(TriggerPoint::OnAttack, &mut ctx);
    let outcome = ctx.into_outcome();
    assert!(!outcome.applied_anything());
    assert!(outcome.logs[0].contains("unrecognized action 'summon_dragon'"));
}
