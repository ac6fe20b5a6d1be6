mod common;

use common::*;
use shardfall_core::{
    choice, DeckPlan, Event, EventBus, HostResponse, Prompt, RoomDecision, RunOutcome, Session,
    SessionError, Step,
};

fn plain_pair() -> Vec<shardfall_core::CardDef> {
    vec![
        room("DUN_A", "Quiet Door", "", Some("RES_L")),
        result("RES_X", "Empty Hall", "", None, None, None, None),
        result("RES_L", "Linked Hall", "", None, None, None, None),
    ]
}

#[test]
fn resolve_keeps_the_peeked_card_as_the_room() {
    let mut session = start(plain_pair(), &["DUN_A"], &["RES_X"]);
    let mut events = EventBus::default();

    let step = session.begin_room(&mut events).unwrap();
    assert!(matches!(
        step,
        Step::Prompt(Prompt::RoomDecision { ref card_id, .. }) if card_id == "DUN_A"
    ));

    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(step, Step::RoomCleared { rooms_cleared: 1 });
    assert_eq!(session.state().discard.room, ids(&["DUN_A"]));
    assert_eq!(session.state().discard.result, ids(&["RES_X"]));
}

#[test]
fn skip_makes_the_second_card_the_room() {
    let mut session = start(plain_pair(), &["DUN_A"], &["RES_X"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Skip), &mut events)
        .unwrap();
    assert_eq!(step, Step::RoomCleared { rooms_cleared: 1 });
    // The skipped card becomes the result basis; its linked card is the
    // effective result but the basis itself is what gets discarded.
    assert_eq!(session.state().discard.room, ids(&["RES_X"]));
    assert_eq!(session.state().discard.result, ids(&["DUN_A"]));
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen.iter().any(|event| matches!(
        event,
        Event::RoomPaired { room_id, result_id } if room_id == "RES_X" && result_id == "RES_L"
    )));
}

#[test]
fn trap_descriptor_costs_hit_points() {
    let cards = vec![
        room("DUN_T", "Trapped Hall", "Trap", None),
        result("RES_T", "Spike Floor", "", None, Some("HP -2"), None, None),
    ];
    let mut session = start(cards, &["DUN_T"], &["RES_T"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert!(matches!(step, Step::Prompt(Prompt::Choice { .. })));
    assert_eq!(session.state().player.hp, 8);
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen
        .iter()
        .any(|event| matches!(event, Event::TrapSprung { stat, amount: 2 } if stat == "hp")));

    let step = session
        .respond(HostResponse::Choice(choice::OK.to_string()), &mut events)
        .unwrap();
    assert_eq!(step, Step::RoomCleared { rooms_cleared: 1 });
}

#[test]
fn bypass_effect_avoids_the_trap() {
    let cards = vec![
        room("DUN_T", "Trapped Hall", "Trap", None),
        result("RES_T", "Spike Floor", "", None, Some("HP -2"), None, None),
        trapping(
            "TRP_CHARM",
            "Warding Charm",
            vec![effect("on_trap_encounter", "bypass")],
        ),
    ];
    let mut session = start_with(cards, &["TRP_CHARM"], &["DUN_T"], &["RES_T"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(session.state().player.hp, 10);
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen.iter().any(|event| matches!(event, Event::TrapBypassed)));
}

#[test]
fn fishing_rod_upgrades_the_water_roll() {
    let cards = vec![
        room("DUN_W", "Cistern", "Water", None),
        result("RES_W", "Still Pool", "", None, None, None, None),
        trapping("TRP_FISHING_ROD", "Fishing Rod", Vec::new()),
    ];
    let mut session = start_with(cards, &["TRP_FISHING_ROD"], &["DUN_W"], &["RES_W"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert!(matches!(
        step,
        Step::Prompt(Prompt::Choice { die_count: 3, .. })
    ));
    // Each die at 4+ lands a fish.
    let step = session
        .respond(HostResponse::Rolls(vec![4, 5, 2]), &mut events)
        .unwrap();
    assert_eq!(step, Step::RoomCleared { rooms_cleared: 1 });
    assert_eq!(session.state().player.food, 4);
}

#[test]
fn water_without_the_rod_is_one_die() {
    let cards = vec![
        room("DUN_W", "Cistern", "Water", None),
        result("RES_W", "Still Pool", "", None, None, None, None),
    ];
    let mut session = start(cards, &["DUN_W"], &["RES_W"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert!(matches!(
        step,
        Step::Prompt(Prompt::Choice { die_count: 1, .. })
    ));
    session
        .respond(HostResponse::Rolls(vec![3]), &mut events)
        .unwrap();
    assert_eq!(session.state().player.food, 2);
}

#[test]
fn unknown_icons_fall_through() {
    let cards = vec![
        room("DUN_S", "Odd Room", "Sparkle", None),
        result("RES_S", "Odd Result", "", None, None, None, None),
    ];
    let mut session = start(cards, &["DUN_S"], &["RES_S"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(step, Step::RoomCleared { rooms_cleared: 1 });
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen
        .iter()
        .any(|event| matches!(event, Event::UnknownIcon { icon } if icon == "Sparkle")));
}

#[test]
fn loot_offer_can_be_taken_or_left() {
    let cards = vec![
        room("DUN_L", "Storeroom", "Loot", None),
        result("RES_L", "Old Crate", "", Some("Loot=Lucky Coin"), None, None, None),
        loot_card("LOOT_COIN", "Lucky Coin", Vec::new()),
    ];
    let mut session = start(cards.clone(), &["DUN_L"], &["RES_L"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert!(matches!(
        step,
        Step::Prompt(Prompt::Choice { ref image, .. }) if image.as_deref() == Some("LOOT_COIN")
    ));
    session
        .respond(HostResponse::Choice(choice::ACCEPT.to_string()), &mut events)
        .unwrap();
    assert_eq!(session.state().inventory, ids(&["LOOT_COIN"]));

    let mut session = start(cards, &["DUN_L"], &["RES_L"]);
    session.begin_room(&mut events).unwrap();
    session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    session
        .respond(HostResponse::Choice(choice::DECLINE.to_string()), &mut events)
        .unwrap();
    assert!(session.state().inventory.is_empty());
    assert_eq!(session.state().discard.loot, ids(&["LOOT_COIN"]));
}

#[test]
fn treasure_can_grant_a_shard() {
    let cards = vec![
        room("DUN_V", "Vault", "Treasure", None),
        result("RES_V", "Treasure Vault", "", Some("GainShard"), None, None, None),
    ];
    let mut session = start(cards, &["DUN_V"], &["RES_V"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(session.state().player.shards, 1);
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen.iter().any(|event| matches!(event, Event::ShardGained)));
}

#[test]
fn the_ornate_chest_bites() {
    let cards = vec![
        room("DUN_M", "Gilded Room", "Treasure", None),
        result("RES_08", "Ornate Chest", "", Some("Enemy=Mimic"), None, None, None),
        enemy("ENM_MIMIC", "Mimic", 5, 2, 1, 2),
    ];
    let mut session = start(cards, &["DUN_M"], &["RES_08"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert!(matches!(
        step,
        Step::Prompt(Prompt::CombatTurn { ref enemy_id, .. }) if enemy_id == "ENM_MIMIC"
    ));
    let seen: Vec<Event> = events.drain().collect();
    assert!(seen
        .iter()
        .any(|event| matches!(event, Event::CombatStarted { enemy_id, enemy_hp: 6 } if enemy_id == "ENM_MIMIC")));
}

#[test]
fn campsite_forage_choice_grants_food() {
    let cards = vec![
        room("DUN_C", "Quiet Corner", "Campsite", None),
        result("RES_C", "Old Camp", "", None, None, None, None),
    ];
    let mut session = start(cards, &["DUN_C"], &["RES_C"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert!(matches!(
        step,
        Step::Prompt(Prompt::Choice { ref choices, .. }) if choices.len() == 2
    ));
    session
        .respond(HostResponse::Choice(choice::FOOD.to_string()), &mut events)
        .unwrap();
    assert_eq!(session.state().player.food, 4);
}

#[test]
fn the_halfling_takes_both_campsite_packages() {
    let cards = vec![
        room("DUN_C", "Quiet Corner", "Campsite", None),
        result("RES_C", "Old Camp", "", None, None, None, None),
        race("RACE_HALFLING", "Halfling", 8, 3, 4, None),
    ];
    let catalog = catalog_with(cards, &[]);
    let plan = DeckPlan {
        dungeon: ids(&["DUN_C"]),
        results: ids(&["RES_C"]),
    };
    let mut session = Session::new(catalog, &plan, "RACE_HALFLING", CLASS_ID, SEED).unwrap();
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    // No choice offered: rest and forage both apply.
    assert!(matches!(
        step,
        Step::Prompt(Prompt::Choice { ref choices, .. }) if choices.len() == 1
    ));
    assert_eq!(session.state().player.food, 6);
    assert_eq!(session.state().player.hp, 8);
}

#[test]
fn level_rollover_returns_discards_to_the_decks() {
    let mut session = resume(plain_pair(), run_state(1, 5, &["DUN_A"], &["RES_X"]));
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(step, Step::LevelCleared { level: 2 });
    assert_eq!(session.state().level, 2);
    assert_eq!(session.state().current_room, 0);
    assert!(session.state().discard.room.is_empty());
    assert_eq!(session.state().dungeon_deck, ids(&["DUN_A"]));
    assert_eq!(session.state().dungeon_result_deck, ids(&["RES_X"]));
}

#[test]
fn the_final_level_demands_shards() {
    let mut state = run_state(5, 5, &["DUN_A"], &["RES_X"]);
    state.player.shards = 3;
    let mut session = resume(plain_pair(), state);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(step, Step::Ended(RunOutcome::Victory));
    assert_eq!(session.outcome(), Some(RunOutcome::Victory));
    assert!(matches!(
        session.begin_room(&mut events),
        Err(SessionError::RunEnded)
    ));

    let mut state = run_state(5, 5, &["DUN_A"], &["RES_X"]);
    state.player.shards = 2;
    let mut session = resume(plain_pair(), state);
    session.begin_room(&mut events).unwrap();
    let step = session
        .respond(HostResponse::RoomDecision(RoomDecision::Resolve), &mut events)
        .unwrap();
    assert_eq!(step, Step::Ended(RunOutcome::Defeat));
}

#[test]
fn class_restrictions_reject_the_pair() {
    let cards = vec![race("RACE_PICKY", "Picky Folk", 10, 3, 2, Some("Test Class"))];
    let catalog = catalog_with(cards, &[]);
    let plan = DeckPlan::default();
    let err = Session::new(catalog, &plan, "RACE_PICKY", CLASS_ID, SEED).unwrap_err();
    assert!(matches!(err, SessionError::ClassRestricted { .. }));
}

#[test]
fn a_mismatched_answer_leaves_the_suspension_alone() {
    let mut session = start(plain_pair(), &["DUN_A"], &["RES_X"]);
    let mut events = EventBus::default();

    session.begin_room(&mut events).unwrap();
    let err = session
        .respond(HostResponse::Rolls(vec![1, 2]), &mut events)
        .unwrap_err();
    assert!(matches!(err, SessionError::UnexpectedResponse));
    // The room decision is still pending.
    assert!(matches!(
        session.prompt(),
        Some(Prompt::RoomDecision { .. })
    ));
}
