use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shardfall_core::{
    CardData, Catalog, CombatAction, DeckPlan, Event, EventBus, HostResponse, PlayerRunState,
    Prompt, RngState, RoomDecision, RunOutcome, Session, SessionError, Step,
};
use shardfall_data::load_catalog;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const SAVE_SCHEMA_VERSION: u32 = 1;
const DEFAULT_RUN_SEED: u64 = 0xD1CE;

fn default_run_seed() -> u64 {
    DEFAULT_RUN_SEED
}

/// On-disk save: the persisted run aggregate plus the seed the session was
/// started with, so a restored run keeps its shuffle stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedRun {
    version: u32,
    #[serde(default = "default_run_seed")]
    seed: u64,
    state: PlayerRunState,
}

#[derive(Debug, Clone)]
struct CliOptions {
    assets: PathBuf,
    seed: u64,
    load: Option<PathBuf>,
}

fn parse_args() -> Result<CliOptions> {
    let mut options = CliOptions {
        assets: PathBuf::from("crates/data/assets"),
        seed: DEFAULT_RUN_SEED,
        load: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets" => {
                let value = args.next().context("--assets needs a directory")?;
                options.assets = PathBuf::from(value);
            }
            "--seed" => {
                let value = args.next().context("--seed needs a number")?;
                options.seed = value.parse().context("--seed needs a number")?;
            }
            "--load" => {
                let value = args.next().context("--load needs a file")?;
                options.load = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => bail!("unknown argument '{other}' (try --help)"),
        }
    }
    Ok(options)
}

fn print_usage() {
    println!("shardfall-cli [--assets DIR] [--seed N] [--load FILE]");
    println!("  --assets DIR  card content directory (default crates/data/assets)");
    println!("  --seed N      deterministic shuffle seed");
    println!("  --load FILE   resume a saved run");
}

fn main() -> Result<()> {
    let options = parse_args()?;
    let (catalog, plan) = load_catalog(&options.assets)?;
    println!("Loaded {} cards.", catalog.len());

    let session = match &options.load {
        Some(path) => restore_session(catalog, path)?,
        None => new_session(catalog, &plan, options.seed)?,
    };
    // Host-side dice stay outside the engine's shuffle stream.
    let dice = RngState::from_seed(options.seed.wrapping_add(1));
    run_loop(session, dice)
}

fn restore_session(catalog: Catalog, path: &Path) -> Result<Session> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let saved: SavedRun =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    if saved.version != SAVE_SCHEMA_VERSION {
        bail!("save file version {} is not supported", saved.version);
    }
    let session = Session::restore(catalog, saved.state, saved.seed)
        .context("restore the saved run")?;
    println!(
        "Resumed at level {}, room {}.",
        session.state().level,
        session.state().current_room
    );
    Ok(session)
}

fn new_session(catalog: Catalog, plan: &DeckPlan, seed: u64) -> Result<Session> {
    loop {
        let race_id = pick_card(&catalog, "race", |kind| matches!(kind, CardData::Race(_)))?;
        let class_id = pick_card(&catalog, "class", |kind| matches!(kind, CardData::Class(_)))?;
        match Session::new(catalog.clone(), plan, &race_id, &class_id, seed) {
            Ok(session) => return Ok(session),
            Err(SessionError::ClassRestricted { .. }) => {
                println!("That race refuses that class. Pick again.");
            }
            Err(err) => bail!("start the run: {err}"),
        }
    }
}

fn pick_card(
    catalog: &Catalog,
    what: &str,
    matches: impl Fn(&CardData) -> bool,
) -> Result<String> {
    let mut cards: Vec<_> = catalog.cards().filter(|card| matches(&card.kind)).collect();
    cards.sort_by(|a, b| a.id.cmp(&b.id));
    if cards.is_empty() {
        bail!("the content directory has no {what} cards");
    }
    println!("Choose a {what}:");
    for (index, card) in cards.iter().enumerate() {
        println!("  {}. {}", index + 1, card.name);
    }
    loop {
        let line = read_line(&format!("{what}> "))?;
        if let Ok(index) = line.trim().parse::<usize>() {
            if let Some(card) = index.checked_sub(1).and_then(|i| cards.get(i)) {
                return Ok(card.id.clone());
            }
        }
        println!("Pick a number between 1 and {}.", cards.len());
    }
}

fn run_loop(mut session: Session, mut dice: RngState) -> Result<()> {
    let mut events = EventBus::default();
    println!("Type 'help' between rooms for commands.");
    loop {
        if let Some(outcome) = session.outcome() {
            print_outcome(outcome);
            return Ok(());
        }
        let step = match session.prompt() {
            Some(prompt) => {
                let Some(response) = answer_prompt(&session, &prompt, &mut dice)? else {
                    return Ok(());
                };
                match session.respond(response, &mut events) {
                    Ok(step) => step,
                    Err(SessionError::UnexpectedResponse) => {
                        println!("That answer does not fit here.");
                        continue;
                    }
                    Err(err) => bail!("advance the run: {err}"),
                }
            }
            None => {
                if !idle_command(&mut session, &mut events)? {
                    return Ok(());
                }
                drain_events(&session, &mut events);
                continue;
            }
        };
        drain_events(&session, &mut events);
        match step {
            Step::Prompt(_) => {}
            Step::RoomCleared { rooms_cleared } => {
                println!("Room {rooms_cleared} cleared.");
            }
            Step::LevelCleared { level } => {
                println!("You descend. Level {level} begins.");
            }
            Step::Ended(outcome) => {
                print_outcome(outcome);
                return Ok(());
            }
        }
    }
}

/// Commands available while the engine is parked between rooms.
fn idle_command(session: &mut Session, events: &mut EventBus) -> Result<bool> {
    let line = read_line("> ")?;
    let mut parts = line.split_whitespace();
    match parts.next().unwrap_or("") {
        "" | "n" | "next" => match session.begin_room(events) {
            Ok(_) => {}
            Err(SessionError::DeckExhausted) => bail!("the dungeon deck ran dry"),
            Err(err) => println!("{err}"),
        },
        "stats" => print_stats(session),
        "inv" | "inventory" => print_inventory(session),
        "use" => item_command(session, events, parts.next(), true),
        "drop" => item_command(session, events, parts.next(), false),
        "save" => {
            let path = parts.next().unwrap_or("shardfall_save.json");
            save_run(session, Path::new(path))?;
            println!("Saved to {path}.");
        }
        "help" | "?" => {
            println!("next (or enter)   explore the next room");
            println!("stats             show player stats");
            println!("inv               show inventory");
            println!("use N / drop N    use or discard inventory slot N");
            println!("save [FILE]       write the run to disk");
            println!("quit              leave the dungeon");
        }
        "quit" | "exit" | "q" => return Ok(false),
        other => println!("unknown command '{other}' (try help)"),
    }
    Ok(true)
}

fn item_command(session: &mut Session, events: &mut EventBus, arg: Option<&str>, use_it: bool) {
    let Some(index) = arg.and_then(|raw| raw.parse::<usize>().ok()).and_then(|n| n.checked_sub(1))
    else {
        println!("give the inventory slot number (see inv)");
        return;
    };
    let result = if use_it {
        session.use_item(index, events)
    } else {
        session.discard_item(index, events)
    };
    if let Err(err) = result {
        println!("{err}");
    }
}

fn save_run(session: &Session, path: &Path) -> Result<()> {
    let saved = SavedRun {
        version: SAVE_SCHEMA_VERSION,
        seed: session.seed(),
        state: session.save(),
    };
    let raw = serde_json::to_string_pretty(&saved).context("encode the save")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))
}

/// Render the pending prompt and collect the host answer. Dice prompts are
/// rolled here; the engine never rolls combat or icon dice itself.
fn answer_prompt(
    session: &Session,
    prompt: &Prompt,
    dice: &mut RngState,
) -> Result<Option<HostResponse>> {
    match prompt {
        Prompt::RoomDecision { name, icons, .. } => {
            println!("Ahead: {name} [{icons}]");
            loop {
                let line = read_line("resolve or skip? ")?;
                match line.trim() {
                    "r" | "resolve" => {
                        return Ok(Some(HostResponse::RoomDecision(RoomDecision::Resolve)))
                    }
                    "s" | "skip" => {
                        return Ok(Some(HostResponse::RoomDecision(RoomDecision::Skip)))
                    }
                    "q" | "quit" => return Ok(None),
                    _ => println!("answer r or s"),
                }
            }
        }
        Prompt::Choice {
            title,
            message,
            choices,
            die_count,
            ..
        } => {
            println!("== {title} ==");
            println!("{message}");
            if *die_count > 0 {
                let rolls: Vec<u8> = (0..*die_count).map(|_| dice.d6()).collect();
                let shown: Vec<String> = rolls.iter().map(u8::to_string).collect();
                println!("You roll: {}", shown.join(", "));
                return Ok(Some(HostResponse::Rolls(rolls)));
            }
            for (index, option) in choices.iter().enumerate() {
                println!("  {}. {}", index + 1, option.label);
            }
            loop {
                let line = read_line("choice> ")?;
                if let Ok(index) = line.trim().parse::<usize>() {
                    if let Some(option) = index.checked_sub(1).and_then(|i| choices.get(i)) {
                        return Ok(Some(HostResponse::Choice(option.value.clone())));
                    }
                }
                println!("Pick a number between 1 and {}.", choices.len());
            }
        }
        Prompt::CombatTurn {
            enemy_name,
            enemy_hp,
            player_hp,
            player_energy,
            energy_options,
            abilities,
            can_discard_axe,
            ..
        } => {
            println!("-- {enemy_name}: {enemy_hp} HP | you: {player_hp} HP, {player_energy} energy --");
            if !abilities.is_empty() {
                println!("In play: {}", abilities.join(", "));
            }
            let costs: Vec<String> = energy_options.iter().map(i64::to_string).collect();
            println!("attack [E]  spend E energy for bonus damage (available: 0 {})", costs.join(" "));
            if *can_discard_axe {
                println!("axe         hurl the axe (two dice, ignores armor)");
            }
            loop {
                let line = read_line("combat> ")?;
                let mut parts = line.split_whitespace();
                match parts.next().unwrap_or("") {
                    "" | "a" | "attack" => {
                        let energy = parts.next().and_then(|raw| raw.parse().ok()).unwrap_or(0);
                        return Ok(Some(HostResponse::Combat(CombatAction::Attack { energy })));
                    }
                    "axe" if *can_discard_axe => {
                        return Ok(Some(HostResponse::Combat(CombatAction::DiscardAxe)));
                    }
                    _ => println!("answer attack [energy]{}", if *can_discard_axe { " or axe" } else { "" }),
                }
            }
        }
    }
}

fn drain_events(session: &Session, events: &mut EventBus) {
    let drained: Vec<Event> = events.drain().collect();
    for event in drained {
        print_event(session, &event);
    }
}

fn card_name(session: &Session, id: &str) -> String {
    session
        .catalog()
        .get(id)
        .map(|card| card.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn print_event(session: &Session, event: &Event) {
    match event {
        Event::StatsChanged(_) | Event::InventoryChanged(_) | Event::IconResolved { .. } => {}
        Event::RoomRevealed { card_id } => {
            println!("* You approach the {}.", card_name(session, card_id));
        }
        Event::RoomPaired { room_id, result_id } => {
            println!(
                "* The room is the {}; its fate is the {}.",
                card_name(session, room_id),
                card_name(session, result_id)
            );
        }
        Event::UnknownIcon { icon } => println!("* The {icon} marking means nothing to you."),
        Event::AbilityLog(line) => println!("* {line}"),
        Event::TrapSprung { stat, amount } => println!("* Trap! You lose {amount} {stat}."),
        Event::TrapBypassed => println!("* You avoid the trap."),
        Event::LootGained { card_id } => {
            println!("* You take the {}.", card_name(session, card_id));
        }
        Event::LootDeclined { card_id } => {
            println!("* You leave the {} behind.", card_name(session, card_id));
        }
        Event::ShardGained => println!("* A shard! ({} held)", session.state().player.shards),
        Event::CombatStarted { enemy_id, enemy_hp } => {
            println!(
                "* A {} attacks! ({enemy_hp} HP)",
                card_name(session, enemy_id)
            );
        }
        Event::CombatTurnResolved {
            player_turn,
            roll1,
            roll2,
            damage,
            miss,
        } => {
            let who = if *player_turn { "You" } else { "The enemy" };
            if *miss {
                println!("* {who} rolled {roll1} and {roll2}: doubles, a miss.");
            } else {
                println!("* {who} rolled {roll1} and {roll2} for {damage} damage.");
            }
        }
        Event::SpecialItemDiscarded { card_id, damage } => {
            println!(
                "* The {} strikes for {damage} and is lost.",
                card_name(session, card_id)
            );
        }
        Event::EnemyDefeated { enemy_id, favor } => {
            println!(
                "* The {} falls. +{favor} favor.",
                card_name(session, enemy_id)
            );
        }
        Event::EncounterBypassed { enemy_id } => {
            println!("* You slip past the {}.", card_name(session, enemy_id));
        }
        Event::ItemUsed { card_id } => {
            println!("* You use the {}.", card_name(session, card_id));
        }
        Event::ItemDiscarded { card_id } => {
            println!("* You discard the {}.", card_name(session, card_id));
        }
        Event::RoomCleared { .. } | Event::LevelCleared { .. } | Event::RunEnded(_) => {}
    }
}

fn print_stats(session: &Session) {
    let state = session.state();
    let stats = &state.player;
    println!(
        "HP {}/{}  energy {}/{}  food {}  favor {}  shards {}",
        stats.hp, stats.max_health, stats.energy, stats.max_energy, stats.food, stats.favor,
        stats.shards
    );
    println!("level {}  room {}", state.level, state.current_room);
}

fn print_inventory(session: &Session) {
    let inventory = &session.state().inventory;
    if inventory.is_empty() {
        println!("Your pack is empty.");
        return;
    }
    for (index, id) in inventory.iter().enumerate() {
        println!("  {}. {}", index + 1, card_name(session, id));
    }
}

fn print_outcome(outcome: RunOutcome) {
    match outcome {
        RunOutcome::Victory => {
            println!("You climb out of the depths with the shards. Victory.")
        }
        RunOutcome::Defeat => println!("The dungeon keeps you. Defeat."),
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).context("read stdin")?;
    Ok(line.trim().to_string())
}
