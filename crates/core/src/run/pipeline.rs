use super::*;
use crate::cards::{BEDROLL_ID, FISHING_ROD_ID, FORAGER_RACE_ID, MIMIC_ENEMY_ID, MIMIC_RESULT_ID};
use crate::{
    choice, run_outcome, ChoiceOption, DungeonCard, Event, Prompt, RoomDecision, TriggerPoint,
    ROOMS_PER_LEVEL,
};

impl Session {
    /// Peek the next room card and suspend on the Resolve/Skip decision.
    /// An empty dungeon deck is a deck-construction invariant violation and
    /// aborts the pipeline run.
    pub fn begin_room(&mut self, events: &mut EventBus) -> Result<Step, SessionError> {
        match self.phase {
            Phase::Idle => {}
            Phase::Ended(_) => return Err(SessionError::RunEnded),
            _ => return Err(SessionError::RoomInProgress),
        }
        let Some(peeked) = self.state.dungeon_deck.first().cloned() else {
            return Err(SessionError::DeckExhausted);
        };
        events.push(Event::RoomRevealed {
            card_id: peeked.clone(),
        });
        self.state.visible.room_card_id = Some(peeked.clone());
        let prompt = self.room_decision_prompt(&peeked);
        self.phase = Phase::AwaitRoomDecision { peeked };
        Ok(Step::Prompt(prompt))
    }

    pub(crate) fn room_decision_prompt(&self, peeked: &str) -> Prompt {
        let (name, icons) = self
            .catalog
            .get(peeked)
            .and_then(|card| {
                card.as_dungeon()
                    .map(|room| (card.name.clone(), room.icons.clone()))
            })
            .unwrap_or_default();
        Prompt::RoomDecision {
            card_id: peeked.to_string(),
            name,
            icons,
        }
    }

    /// The peeked card is consumed either way; the decision only chooses
    /// which of the two cards is the room and which is the result basis.
    /// The basis card's linked result substitutes the actual result card;
    /// absent a link the basis stands in itself.
    pub(crate) fn form_pair(
        &mut self,
        peeked: String,
        decision: RoomDecision,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        if !self.state.dungeon_deck.is_empty() {
            self.state.dungeon_deck.remove(0);
        }
        if self.state.dungeon_result_deck.is_empty() {
            return Err(SessionError::DeckExhausted);
        }
        let second = self.state.dungeon_result_deck.remove(0);
        let (room_id, basis_id) = match decision {
            RoomDecision::Resolve => (peeked, second),
            RoomDecision::Skip => (second, peeked),
        };
        let result_id = self
            .catalog
            .get(&basis_id)
            .and_then(|card| card.as_dungeon())
            .and_then(|basis| basis.linked_result_id.clone())
            .filter(|id| self.catalog.contains(id))
            .unwrap_or_else(|| basis_id.clone());
        let icons = self
            .catalog
            .get(&room_id)
            .and_then(|card| card.as_dungeon())
            .map(|room| {
                room.icons
                    .split(',')
                    .map(|token| token.trim().to_string())
                    .filter(|token| !token.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        events.push(Event::RoomPaired {
            room_id: room_id.clone(),
            result_id: result_id.clone(),
        });
        self.state.visible.room_card_id = Some(room_id.clone());
        self.state.visible.result_card_id = Some(result_id.clone());
        self.room = Some(RoomProgress {
            room_id,
            basis_id,
            result_id,
            icons,
        });
        self.advance_icons(events)
    }

    /// Resolve icons strictly left to right; later icons may depend on
    /// state mutated by earlier ones. Icons that need no interaction (or
    /// that fail to resolve) fall through to the next.
    pub(crate) fn advance_icons(&mut self, events: &mut EventBus) -> Result<Step, SessionError> {
        loop {
            let Some(icon) = self.room.as_mut().and_then(|room| room.icons.pop_front()) else {
                return self.room_complete(events);
            };
            if let Some(step) = self.dispatch_icon(&icon, events)? {
                return Ok(step);
            }
            events.push(Event::IconResolved { icon });
        }
    }

    fn result_card(&self) -> Option<&DungeonCard> {
        let room = self.room.as_ref()?;
        self.catalog.get(&room.result_id)?.as_dungeon()
    }

    fn dispatch_icon(
        &mut self,
        icon: &str,
        events: &mut EventBus,
    ) -> Result<Option<Step>, SessionError> {
        match icon {
            "Enemy" => self.enemy_icon(events),
            "Loot" => self.loot_icon(false, events),
            "Treasure" => self.loot_icon(true, events),
            "Trap" => self.trap_icon(events),
            "Campsite" => self.campsite_icon(events),
            "Water" => {
                let dice = if self.has_item(FISHING_ROD_ID) { 3 } else { 1 };
                Ok(Some(self.icon_step(IconWait::WaterRoll { dice })))
            }
            "Random" => self.random_icon(events),
            _ => {
                events.push(Event::UnknownIcon {
                    icon: icon.to_string(),
                });
                Ok(None)
            }
        }
    }

    fn enemy_icon(&mut self, events: &mut EventBus) -> Result<Option<Step>, SessionError> {
        let descriptor = self.result_card().and_then(|card| card.enemy.clone());
        let Some(name) = descriptor.as_deref().and_then(|d| descriptor_value(d, "Enemy")) else {
            events.push(Event::AbilityLog(
                "the enemy descriptor is missing or malformed".into(),
            ));
            return Ok(None);
        };
        let Some((card, _)) = self.catalog.enemy_by_name(&name) else {
            events.push(Event::AbilityLog(format!("no enemy card named {name}")));
            return Ok(None);
        };
        let enemy_id = card.id.clone();
        self.start_combat(enemy_id, events).map(Some)
    }

    /// Shared by the Loot and Treasure icons; only Treasure understands the
    /// `GainShard` outcome.
    fn loot_icon(
        &mut self,
        treasure: bool,
        events: &mut EventBus,
    ) -> Result<Option<Step>, SessionError> {
        let descriptor = self.result_card().and_then(|card| card.loot.clone());
        let result_id = self.room.as_ref().map(|room| room.result_id.clone());
        match descriptor.as_deref() {
            None | Some("Empty") => Ok(Some(self.icon_step(IconWait::Info {
                title: "Nothing here".into(),
                message: "You search the room but find nothing of value.".into(),
            }))),
            Some("GainShard") if treasure => {
                self.update_stat("shards", 1, events);
                events.push(Event::ShardGained);
                Ok(Some(self.icon_step(IconWait::Info {
                    title: "A shard!".into(),
                    message: "A glimmering shard joins your pack.".into(),
                })))
            }
            Some("Enemy=Mimic") if result_id.as_deref() == Some(MIMIC_RESULT_ID) => {
                // The chest bites back.
                self.start_combat(MIMIC_ENEMY_ID.to_string(), events)
                    .map(Some)
            }
            Some(desc) => {
                let Some(name) = descriptor_value(desc, "Loot") else {
                    events.push(Event::AbilityLog(format!(
                        "unrecognized loot descriptor '{desc}'"
                    )));
                    return Ok(None);
                };
                let Some(card) = self.catalog.item_by_name(&name) else {
                    events.push(Event::AbilityLog(format!("no loot card named {name}")));
                    return Ok(None);
                };
                let card_id = card.id.clone();
                Ok(Some(self.icon_step(IconWait::LootOffer { card_id })))
            }
        }
    }

    fn trap_icon(&mut self, events: &mut EventBus) -> Result<Option<Step>, SessionError> {
        let outcome = self.fire_trigger(TriggerPoint::OnTrapEncounter, None, None);
        let bypass = outcome.bypass;
        self.emit_logs(&outcome.logs, events);
        if bypass {
            events.push(Event::TrapBypassed);
            return Ok(Some(self.icon_step(IconWait::Info {
                title: "Trap avoided".into(),
                message: "You slip past the trap unharmed.".into(),
            })));
        }
        let descriptor = self.result_card().and_then(|card| card.trap.clone());
        match descriptor.as_deref().map(parse_trap_penalty) {
            None | Some(TrapPenalty::None) => Ok(Some(self.icon_step(IconWait::Info {
                title: "Trap".into(),
                message: "The mechanism is long dead. Nothing happens.".into(),
            }))),
            Some(TrapPenalty::Hp(amount)) => {
                self.apply_damage(amount, None, events);
                events.push(Event::TrapSprung {
                    stat: "hp".into(),
                    amount,
                });
                if let Some(step) = self.check_defeat(events) {
                    return Ok(Some(step));
                }
                Ok(Some(self.icon_step(IconWait::Info {
                    title: "Trap!".into(),
                    message: format!("The trap bites for {amount} damage."),
                })))
            }
            Some(TrapPenalty::Energy(amount)) => {
                self.update_stat("energy", -amount, events);
                events.push(Event::TrapSprung {
                    stat: "energy".into(),
                    amount,
                });
                Ok(Some(self.icon_step(IconWait::Info {
                    title: "Trap!".into(),
                    message: format!("The trap drains {amount} energy."),
                })))
            }
            Some(TrapPenalty::Malformed(desc)) => {
                events.push(Event::AbilityLog(format!(
                    "unrecognized trap descriptor '{desc}'"
                )));
                Ok(None)
            }
        }
    }

    pub(crate) fn campsite_icon(
        &mut self,
        events: &mut EventBus,
    ) -> Result<Option<Step>, SessionError> {
        let boosted = self.has_item(BEDROLL_ID);
        if self.state.race_id == FORAGER_RACE_ID {
            self.apply_campsite_heal(boosted, events);
            self.apply_campsite_food(events);
            return Ok(Some(self.icon_step(IconWait::Info {
                title: "Campsite".into(),
                message: "You forage and rest, taking both comforts.".into(),
            })));
        }
        Ok(Some(self.icon_step(IconWait::CampsiteChoice { boosted })))
    }

    pub(crate) fn apply_campsite_heal(&mut self, boosted: bool, events: &mut EventBus) {
        let (hp, energy) = if boosted { (4, 2) } else { (2, 1) };
        self.update_stat("hp", hp, events);
        self.update_stat("energy", energy, events);
    }

    pub(crate) fn apply_campsite_food(&mut self, events: &mut EventBus) {
        self.update_stat("food", 2, events);
    }

    fn random_icon(&mut self, events: &mut EventBus) -> Result<Option<Step>, SessionError> {
        let descriptor = self.result_card().and_then(|card| card.random.clone());
        let Some(desc) = descriptor else {
            events.push(Event::AbilityLog("the random descriptor is missing".into()));
            return Ok(None);
        };
        if let Some(name) = descriptor_value(&desc, "Ref") {
            return self.dispatch_ref(&name, events);
        }
        if let Some(name) = descriptor_value(&desc, "Enemy") {
            let Some((card, _)) = self.catalog.enemy_by_name(&name) else {
                events.push(Event::AbilityLog(format!("no enemy card named {name}")));
                return Ok(None);
            };
            let enemy_id = card.id.clone();
            return self.start_combat(enemy_id, events).map(Some);
        }
        events.push(Event::AbilityLog(format!(
            "unrecognized random descriptor '{desc}'"
        )));
        Ok(None)
    }

    pub(crate) fn icon_step(&mut self, wait: IconWait) -> Step {
        let prompt = self.icon_prompt(&wait);
        self.phase = Phase::AwaitIcon(wait);
        Step::Prompt(prompt)
    }

    pub(crate) fn icon_prompt(&self, wait: &IconWait) -> Prompt {
        match wait {
            IconWait::Info { title, message } => Prompt::Choice {
                title: title.clone(),
                message: message.clone(),
                image: None,
                choices: vec![ChoiceOption::new("Continue", choice::OK)],
                die_count: 0,
            },
            IconWait::LootOffer { card_id } => {
                let name = self
                    .catalog
                    .get(card_id)
                    .map(|card| card.name.clone())
                    .unwrap_or_else(|| card_id.clone());
                Prompt::Choice {
                    title: "Loot".into(),
                    message: format!("Take the {name}?"),
                    image: Some(card_id.clone()),
                    choices: vec![
                        ChoiceOption::new("Take it", choice::ACCEPT),
                        ChoiceOption::new("Leave it", choice::DECLINE),
                    ],
                    die_count: 0,
                }
            }
            IconWait::CampsiteChoice { boosted } => {
                let heal_label = if *boosted {
                    "Rest (bedroll: +4 HP, +2 energy)"
                } else {
                    "Rest (+2 HP, +1 energy)"
                };
                Prompt::Choice {
                    title: "Campsite".into(),
                    message: "A safe place. How do you use it?".into(),
                    image: None,
                    choices: vec![
                        ChoiceOption::new(heal_label, choice::HEAL),
                        ChoiceOption::new("Forage (+2 food)", choice::FOOD),
                    ],
                    die_count: 0,
                }
            }
            IconWait::WaterRoll { dice } => Prompt::Choice {
                title: "Water".into(),
                message: "Cast for fish. Each die showing 4 or more lands one.".into(),
                image: None,
                choices: Vec::new(),
                die_count: *dice,
            },
            IconWait::GroveRoll => Prompt::Choice {
                title: "Grove".into(),
                message: "You gather what the grove offers.".into(),
                image: None,
                choices: Vec::new(),
                die_count: 1,
            },
            IconWait::AltarChoice => Prompt::Choice {
                title: "Altar".into(),
                message: "An old altar. The favored are rewarded.".into(),
                image: None,
                choices: vec![
                    ChoiceOption::new("Pray", choice::PRAY),
                    ChoiceOption::new("Leave", choice::LEAVE),
                ],
                die_count: 0,
            },
            IconWait::PigmanChoice => Prompt::Choice {
                title: "Pigman".into(),
                message: "A pigman blocks the way, sniffing at your pack.".into(),
                image: None,
                choices: vec![
                    ChoiceOption::new("Feed it (1 food)", choice::FEED),
                    ChoiceOption::new("Fight", choice::FIGHT),
                ],
                die_count: 0,
            },
            IconWait::ShrineChoice => Prompt::Choice {
                title: "Shrine".into(),
                message: "A shrine hums softly. An offering of energy may mend you.".into(),
                image: None,
                choices: vec![
                    ChoiceOption::new("Offer 2 energy (+4 HP)", choice::OFFER),
                    ChoiceOption::new("Leave", choice::LEAVE),
                ],
                die_count: 0,
            },
        }
    }

    pub(crate) fn icon_respond(
        &mut self,
        wait: IconWait,
        response: HostResponse,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        match (wait, response) {
            (IconWait::Info { .. }, HostResponse::Choice(_)) => self.advance_icons(events),
            (IconWait::LootOffer { card_id }, HostResponse::Choice(value)) => {
                match value.as_str() {
                    choice::ACCEPT => {
                        self.state.inventory.push(card_id.clone());
                        self.state.visible.inventory = self.state.inventory.clone();
                        events.push(Event::LootGained {
                            card_id: card_id.clone(),
                        });
                        events.push(Event::InventoryChanged(self.state.inventory.clone()));
                    }
                    _ => {
                        self.state.discard.loot.push(card_id.clone());
                        events.push(Event::LootDeclined { card_id });
                    }
                }
                self.advance_icons(events)
            }
            (IconWait::CampsiteChoice { boosted }, HostResponse::Choice(value)) => {
                match value.as_str() {
                    choice::HEAL => self.apply_campsite_heal(boosted, events),
                    choice::FOOD => self.apply_campsite_food(events),
                    _ => {
                        self.phase = Phase::AwaitIcon(IconWait::CampsiteChoice { boosted });
                        return Err(SessionError::UnexpectedResponse);
                    }
                }
                self.advance_icons(events)
            }
            (IconWait::WaterRoll { dice }, HostResponse::Rolls(rolls))
                if rolls.len() == usize::from(dice) =>
            {
                let caught = rolls.iter().filter(|die| **die >= 4).count() as i64;
                if caught > 0 {
                    self.update_stat("food", caught, events);
                }
                self.advance_icons(events)
            }
            (IconWait::GroveRoll, HostResponse::Rolls(rolls)) if rolls.len() == 1 => {
                let die = rolls[0];
                let food = if die >= 4 { 2 } else { 1 };
                self.update_stat("food", food, events);
                if die == 6 {
                    self.update_stat("hp", 1, events);
                }
                self.advance_icons(events)
            }
            (IconWait::AltarChoice, HostResponse::Choice(value)) => {
                if value == choice::PRAY {
                    self.altar_pray(events);
                }
                self.advance_icons(events)
            }
            (IconWait::PigmanChoice, HostResponse::Choice(value)) => match value.as_str() {
                choice::FEED if self.state.player.food >= 1 => {
                    self.update_stat("food", -1, events);
                    self.update_stat("favor", 2, events);
                    self.advance_icons(events)
                }
                _ => match self.pigman_combat(events)? {
                    Some(step) => Ok(step),
                    None => self.advance_icons(events),
                },
            },
            (IconWait::ShrineChoice, HostResponse::Choice(value)) => {
                if value == choice::OFFER && self.state.player.energy >= 2 {
                    self.update_stat("energy", -2, events);
                    self.update_stat("hp", 4, events);
                }
                self.advance_icons(events)
            }
            (wait, _) => {
                self.phase = Phase::AwaitIcon(wait);
                Err(SessionError::UnexpectedResponse)
            }
        }
    }

    /// Discard the spent pair, count the room, and either hand control back
    /// for the next room or close out the level.
    fn room_complete(&mut self, events: &mut EventBus) -> Result<Step, SessionError> {
        if let Some(room) = self.room.take() {
            self.state.discard.room.push(room.room_id);
            self.state.discard.result.push(room.basis_id);
        }
        self.state.visible.room_card_id = None;
        self.state.visible.result_card_id = None;
        self.state.current_room += 1;
        events.push(Event::RoomCleared {
            rooms_cleared: self.state.current_room,
        });
        if self.state.current_room >= ROOMS_PER_LEVEL {
            if let Some(outcome) = run_outcome(&self.state) {
                return Ok(self.end_run(outcome, events));
            }
            self.level_up(events);
            return Ok(Step::LevelCleared {
                level: self.state.level,
            });
        }
        self.phase = Phase::Idle;
        Ok(Step::RoomCleared {
            rooms_cleared: self.state.current_room,
        })
    }

    /// Level rollover: spent cards return to their decks and per-level
    /// flags reset. `current_room` resets exactly here.
    fn level_up(&mut self, events: &mut EventBus) {
        self.state.level += 1;
        self.state.current_room = 0;
        self.state.axe_reroll_used = false;
        let mut rooms = std::mem::take(&mut self.state.discard.room);
        self.state.dungeon_deck.append(&mut rooms);
        let mut results = std::mem::take(&mut self.state.discard.result);
        self.state.dungeon_result_deck.append(&mut results);
        self.rng.shuffle(&mut self.state.dungeon_deck);
        self.rng.shuffle(&mut self.state.dungeon_result_deck);
        self.phase = Phase::Idle;
        events.push(Event::LevelCleared {
            level: self.state.level,
        });
    }
}

/// `Key=Value` descriptor parsing, e.g. `Enemy=Mimic` or `Loot=Rusty Axe`.
fn descriptor_value(descriptor: &str, key: &str) -> Option<String> {
    let (head, value) = descriptor.split_once('=')?;
    if head.trim() != key {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

enum TrapPenalty {
    None,
    Hp(i64),
    Energy(i64),
    Malformed(String),
}

/// Trap descriptors read `None`, `HP -N` or `EN -N`.
fn parse_trap_penalty(descriptor: &str) -> TrapPenalty {
    let trimmed = descriptor.trim();
    if trimmed == "None" {
        return TrapPenalty::None;
    }
    let mut parts = trimmed.split_whitespace();
    let (Some(stat), Some(delta)) = (parts.next(), parts.next()) else {
        return TrapPenalty::Malformed(trimmed.to_string());
    };
    let Ok(delta) = delta.parse::<i64>() else {
        return TrapPenalty::Malformed(trimmed.to_string());
    };
    let amount = delta.unsigned_abs() as i64;
    match stat {
        "HP" => TrapPenalty::Hp(amount),
        "EN" => TrapPenalty::Energy(amount),
        _ => TrapPenalty::Malformed(trimmed.to_string()),
    }
}
