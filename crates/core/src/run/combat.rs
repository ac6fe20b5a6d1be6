use super::*;
use crate::cards::AXE_ID;
use crate::{choice, ChoiceOption, EncounterState, Event, Prompt, TriggerPoint};

/// Read-only view of a suspended encounter for host display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatSnapshot {
    pub enemy_id: String,
    pub enemy_hp: i64,
    pub player_hp: i64,
}

impl Session {
    pub fn combat(&self) -> Option<CombatSnapshot> {
        match &self.phase {
            Phase::Combat(combat) => Some(CombatSnapshot {
                enemy_id: combat.enemy_id.clone(),
                enemy_hp: combat.enemy_hp,
                player_hp: self.state.player.hp,
            }),
            _ => None,
        }
    }

    /// Enter combat. Effective enemy health scales with the dungeon level.
    /// `on_combat_start` runs in two folds before the first turn: the
    /// player's sources first, whose bypass and defeat effects end the
    /// encounter outright, then the enemy alone, whose `attack_first`
    /// seizes the opening turn.
    pub(crate) fn start_combat(
        &mut self,
        enemy_id: String,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        let Some((_, enemy)) = self.catalog.enemy(&enemy_id) else {
            events.push(Event::AbilityLog(format!("missing enemy card {enemy_id}")));
            return self.advance_icons(events);
        };
        let enemy_hp = enemy.health + i64::from(self.state.level);

        let outcome = self.fire_trigger(TriggerPoint::OnCombatStart, None, None);
        let (bypass, defeat) = (outcome.bypass, outcome.defeat_enemy);
        self.emit_logs(&outcome.logs, events);
        self.apply_outcome_resources(&outcome, events);
        if let Some(step) = self.check_defeat(events) {
            return Ok(step);
        }

        if bypass {
            events.push(Event::EncounterBypassed {
                enemy_id: enemy_id.clone(),
            });
            return self.advance_icons(events);
        }
        events.push(Event::CombatStarted {
            enemy_id: enemy_id.clone(),
            enemy_hp,
        });
        self.state.visible.enemy_card_id = Some(enemy_id.clone());
        if defeat {
            return self.combat_victory(enemy_id, events);
        }

        // The enemy's own start abilities cannot bypass or concede its
        // fight; they take the opening turn or land on the player.
        let opening = self.fire_enemy_trigger(TriggerPoint::OnCombatStart, &enemy_id, None);
        let attack_first = opening.attack_first;
        self.emit_logs(&opening.logs, events);
        self.apply_outcome_resources(&opening, events);
        if let Some(step) = self.check_defeat(events) {
            return Ok(step);
        }
        let wait = if attack_first {
            CombatWait::AwaitEnemyRoll
        } else {
            CombatWait::AwaitAction
        };
        let combat = CombatState {
            enemy_id,
            enemy_hp,
            wait,
        };
        self.sync_encounter(&combat);
        Ok(self.combat_step(combat))
    }

    pub(crate) fn combat_respond(
        &mut self,
        mut combat: CombatState,
        response: HostResponse,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        let wait = combat.wait.clone();
        match (wait, response) {
            (CombatWait::AwaitAction, HostResponse::Combat(crate::CombatAction::Attack { energy })) => {
                let energy = energy.clamp(0, self.state.player.energy);
                if energy > 0 {
                    self.update_stat("energy", -energy, events);
                }
                combat.wait = CombatWait::AwaitPlayerRoll {
                    energy,
                    rerolled: false,
                };
                self.sync_encounter(&combat);
                Ok(self.combat_step(combat))
            }
            (CombatWait::AwaitAction, HostResponse::Combat(crate::CombatAction::DiscardAxe)) => {
                let Some(slot) = self.state.inventory.iter().position(|id| id == AXE_ID) else {
                    self.phase = Phase::Combat(combat);
                    return Err(SessionError::UnexpectedResponse);
                };
                let outcome = self.fire_item_trigger(TriggerPoint::OnDiscard, AXE_ID);
                self.emit_logs(&outcome.logs, events);
                self.apply_outcome_resources(&outcome, events);
                self.state.inventory.remove(slot);
                self.state.visible.inventory = self.state.inventory.clone();
                self.state.discard.trappings.push(AXE_ID.to_string());
                events.push(Event::InventoryChanged(self.state.inventory.clone()));
                combat.wait = CombatWait::AwaitDiscardRoll;
                Ok(self.combat_step(combat))
            }
            (CombatWait::AwaitPlayerRoll { energy, rerolled }, HostResponse::Rolls(rolls))
                if rolls.len() == 2 =>
            {
                self.player_roll(combat, energy, rerolled, rolls[0], rolls[1], events)
            }
            (
                CombatWait::AwaitTurnPause { energy, damage, .. },
                HostResponse::Choice(value),
            ) => match value.as_str() {
                choice::REROLL if self.has_item(AXE_ID) && !self.state.axe_reroll_used => {
                    self.state.axe_reroll_used = true;
                    combat.wait = CombatWait::AwaitPlayerRoll {
                        energy,
                        rerolled: false,
                    };
                    Ok(self.combat_step(combat))
                }
                choice::CONTINUE => {
                    combat.enemy_hp -= damage;
                    self.sync_encounter(&combat);
                    if combat.enemy_hp <= 0 {
                        return self.combat_victory(combat.enemy_id, events);
                    }
                    combat.wait = CombatWait::AwaitEnemyRoll;
                    Ok(self.combat_step(combat))
                }
                _ => {
                    self.phase = Phase::Combat(combat);
                    Err(SessionError::UnexpectedResponse)
                }
            },
            (CombatWait::AwaitEnemyRoll, HostResponse::Rolls(rolls)) if rolls.len() == 2 => {
                self.enemy_roll(combat, rolls[0], rolls[1], events)
            }
            (CombatWait::AwaitDiscardRoll, HostResponse::Rolls(rolls)) if rolls.len() == 2 => {
                // Flat two-die sum, straight through the enemy's defense.
                let damage = i64::from(rolls[0]) + i64::from(rolls[1]);
                combat.enemy_hp -= damage;
                events.push(Event::SpecialItemDiscarded {
                    card_id: AXE_ID.to_string(),
                    damage,
                });
                self.sync_encounter(&combat);
                if combat.enemy_hp <= 0 {
                    return self.combat_victory(combat.enemy_id, events);
                }
                // The discard does not consume the turn.
                combat.wait = CombatWait::AwaitAction;
                Ok(self.combat_step(combat))
            }
            (_, _) => {
                self.phase = Phase::Combat(combat);
                Err(SessionError::UnexpectedResponse)
            }
        }
    }

    fn player_roll(
        &mut self,
        mut combat: CombatState,
        energy: i64,
        rerolled: bool,
        roll1: u8,
        roll2: u8,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        let outcome = self.fire_trigger(
            TriggerPoint::OnAttack,
            Some(&combat.enemy_id),
            Some((roll1, roll2)),
        );
        let doubles = roll1 == roll2;
        let effect_reroll =
            doubles && outcome.reroll && !outcome.ignore_miss && !rerolled;
        let (ignore_miss, attack_bonus, defeat) =
            (outcome.ignore_miss, outcome.attack_bonus, outcome.defeat_enemy);
        self.emit_logs(&outcome.logs, events);
        self.apply_outcome_resources(&outcome, events);
        if let Some(step) = self.check_defeat(events) {
            return Ok(step);
        }

        if effect_reroll {
            combat.wait = CombatWait::AwaitPlayerRoll {
                energy,
                rerolled: true,
            };
            return Ok(self.combat_step(combat));
        }

        let defense = self
            .catalog
            .enemy(&combat.enemy_id)
            .map(|(_, enemy)| enemy.defense)
            .unwrap_or(0);
        let class_bonus = self
            .catalog
            .class(&self.state.class_id)
            .map(|(_, class)| class.bonus_for_energy(energy))
            .unwrap_or(0);

        let miss = doubles && !ignore_miss;
        let damage = if defeat {
            combat.enemy_hp
        } else if miss {
            0
        } else {
            let base = (i64::from(roll1) - i64::from(roll2)).abs();
            (base + class_bonus + attack_bonus - defense).max(0)
        };
        events.push(Event::CombatTurnResolved {
            player_turn: true,
            roll1,
            roll2,
            damage,
            miss,
        });
        combat.wait = CombatWait::AwaitTurnPause {
            energy,
            roll1,
            roll2,
            damage,
            miss,
        };
        self.sync_encounter(&combat);
        Ok(self.combat_step(combat))
    }

    fn enemy_roll(
        &mut self,
        mut combat: CombatState,
        roll1: u8,
        roll2: u8,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        let outcome = self.fire_enemy_trigger(
            TriggerPoint::OnAttack,
            &combat.enemy_id,
            Some((roll1, roll2)),
        );
        let (ignore_miss, attack_bonus) = (outcome.ignore_miss, outcome.attack_bonus);
        self.emit_logs(&outcome.logs, events);

        let attack = self
            .catalog
            .enemy(&combat.enemy_id)
            .map(|(_, enemy)| enemy.attack)
            .unwrap_or(0);
        let doubles = roll1 == roll2;
        let miss = doubles && !ignore_miss;
        // No defense subtraction on the enemy's side.
        let damage = if miss {
            0
        } else {
            (i64::from(roll1) - i64::from(roll2)).abs() + attack + attack_bonus
        };
        events.push(Event::CombatTurnResolved {
            player_turn: false,
            roll1,
            roll2,
            damage,
            miss,
        });
        if damage > 0 {
            let enemy_id = combat.enemy_id.clone();
            self.apply_damage(damage, Some(&enemy_id), events);
        }
        // The fold's resource effects land alongside the blow; a miss does
        // not suppress them.
        self.apply_outcome_resources(&outcome, events);
        self.sync_encounter(&combat);
        if let Some(step) = self.check_defeat(events) {
            return Ok(step);
        }
        combat.wait = CombatWait::AwaitAction;
        Ok(self.combat_step(combat))
    }

    /// Victory is checked before defeat; a simultaneous zero favors the
    /// player. Favor printed as the dynamic marker resolves to the current
    /// level.
    fn combat_victory(
        &mut self,
        enemy_id: String,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        let favor = self
            .catalog
            .enemy(&enemy_id)
            .map(|(_, enemy)| enemy.favor.resolve(self.state.level))
            .unwrap_or(0);
        if favor > 0 {
            self.update_stat("favor", favor, events);
        }
        events.push(Event::EnemyDefeated { enemy_id, favor });
        self.state.encounter = None;
        self.state.visible.enemy_card_id = None;
        self.advance_icons(events)
    }

    fn combat_step(&mut self, combat: CombatState) -> Step {
        let prompt = self.combat_prompt(&combat);
        self.phase = Phase::Combat(combat);
        Step::Prompt(prompt)
    }

    /// Mirror the machine into the persisted aggregate after every step so
    /// a save taken here resumes exactly.
    fn sync_encounter(&mut self, combat: &CombatState) {
        self.state.encounter = Some(EncounterState {
            in_progress: true,
            enemy_id: combat.enemy_id.clone(),
            enemy_hp: combat.enemy_hp,
            player_hp: self.state.player.hp,
        });
    }

    pub(crate) fn combat_prompt(&self, combat: &CombatState) -> Prompt {
        let enemy_name = self
            .catalog
            .get(&combat.enemy_id)
            .map(|card| card.name.clone())
            .unwrap_or_else(|| combat.enemy_id.clone());
        match &combat.wait {
            CombatWait::AwaitAction => {
                let energy_options = self
                    .catalog
                    .class(&self.state.class_id)
                    .map(|(_, class)| {
                        class
                            .bonus_damage_energy_cost
                            .iter()
                            .copied()
                            .filter(|cost| *cost <= self.state.player.energy)
                            .collect()
                    })
                    .unwrap_or_default();
                let abilities = self
                    .state
                    .inventory
                    .iter()
                    .filter_map(|id| self.catalog.get(id))
                    .filter(|card| {
                        let (abilities, effects) = card.ability_lists();
                        abilities
                            .iter()
                            .chain(effects.iter())
                            .any(|effect| effect.matches(TriggerPoint::OnAttack))
                    })
                    .map(|card| card.name.clone())
                    .collect();
                Prompt::CombatTurn {
                    enemy_id: combat.enemy_id.clone(),
                    enemy_name,
                    enemy_hp: combat.enemy_hp,
                    player_hp: self.state.player.hp,
                    player_energy: self.state.player.energy,
                    energy_options,
                    abilities,
                    can_reroll: self.has_item(AXE_ID) && !self.state.axe_reroll_used,
                    can_discard_axe: self.has_item(AXE_ID),
                }
            }
            CombatWait::AwaitPlayerRoll { .. } => Prompt::Choice {
                title: "Your attack".into(),
                message: format!("Roll against the {enemy_name}."),
                image: Some(combat.enemy_id.clone()),
                choices: Vec::new(),
                die_count: 2,
            },
            CombatWait::AwaitTurnPause {
                roll1,
                roll2,
                damage,
                miss,
                ..
            } => {
                let message = if *miss {
                    format!("You rolled {roll1} and {roll2}. Doubles! The blow goes wide.")
                } else {
                    format!("You rolled {roll1} and {roll2}: {damage} damage.")
                };
                let mut choices = vec![ChoiceOption::new("Continue", choice::CONTINUE)];
                if self.has_item(AXE_ID) && !self.state.axe_reroll_used {
                    choices.push(ChoiceOption::new("Reroll (axe)", choice::REROLL));
                }
                Prompt::Choice {
                    title: "Your turn".into(),
                    message,
                    image: Some(combat.enemy_id.clone()),
                    choices,
                    die_count: 0,
                }
            }
            CombatWait::AwaitEnemyRoll => Prompt::Choice {
                title: format!("{enemy_name} attacks"),
                message: "Roll for the enemy.".into(),
                image: Some(combat.enemy_id.clone()),
                choices: Vec::new(),
                die_count: 2,
            },
            CombatWait::AwaitDiscardRoll => Prompt::Choice {
                title: "The axe flies".into(),
                message: "Roll both dice; the sum lands regardless of armor.".into(),
                image: Some(combat.enemy_id.clone()),
                choices: Vec::new(),
                die_count: 2,
            },
        }
    }
}
