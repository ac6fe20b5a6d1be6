use super::*;
use crate::Event;

impl Session {
    /// Named set-pieces reached through `Random/Ref=<Name>` descriptors.
    /// Unknown names are designer data and fall through to the next icon.
    pub(crate) fn dispatch_ref(
        &mut self,
        name: &str,
        events: &mut EventBus,
    ) -> Result<Option<Step>, SessionError> {
        match name {
            "Altar" => Ok(Some(self.icon_step(IconWait::AltarChoice))),
            "Campsite" => self.campsite_icon(events),
            "Grove" => Ok(Some(self.icon_step(IconWait::GroveRoll))),
            "Labyrinth" => self.labyrinth(events),
            "Pigman" => {
                if self.state.player.food >= 1 {
                    Ok(Some(self.icon_step(IconWait::PigmanChoice)))
                } else {
                    self.pigman_combat(events)
                }
            }
            "Shrine" => Ok(Some(self.icon_step(IconWait::ShrineChoice))),
            _ => {
                events.push(Event::AbilityLog(format!("no reference card named {name}")));
                Ok(None)
            }
        }
    }

    /// Reward tier keyed off accumulated favor. The top tier trades favor
    /// for a shard.
    pub(crate) fn altar_pray(&mut self, events: &mut EventBus) {
        let favor = self.state.player.favor;
        if favor >= 6 {
            self.update_stat("favor", -6, events);
            self.update_stat("shards", 1, events);
            events.push(Event::ShardGained);
        } else if favor >= 3 {
            self.update_stat("hp", 2, events);
            self.update_stat("energy", 1, events);
        } else {
            self.update_stat("hp", 1, events);
        }
    }

    /// The way through costs whatever the player can still pay, worst
    /// option last: a ration, then energy, then blood.
    fn labyrinth(&mut self, events: &mut EventBus) -> Result<Option<Step>, SessionError> {
        let stats = self.state.player;
        let message = if stats.food >= 1 {
            self.update_stat("food", -1, events);
            "You eat as you walk the winding way."
        } else if stats.energy >= 2 {
            self.update_stat("energy", -2, events);
            "The winding way drains you."
        } else {
            self.apply_damage(2, None, events);
            "You stumble out scraped and bleeding."
        };
        self.update_stat("favor", 2, events);
        if let Some(step) = self.check_defeat(events) {
            return Ok(Some(step));
        }
        Ok(Some(self.icon_step(IconWait::Info {
            title: "Labyrinth".into(),
            message: format!("{message} Beyond it, an old blessing: +2 favor."),
        })))
    }

    pub(crate) fn pigman_combat(
        &mut self,
        events: &mut EventBus,
    ) -> Result<Option<Step>, SessionError> {
        let Some((card, _)) = self.catalog.enemy_by_name("Pigman") else {
            events.push(Event::AbilityLog("no enemy card named Pigman".into()));
            return Ok(None);
        };
        let enemy_id = card.id.clone();
        self.start_combat(enemy_id, events).map(Some)
    }
}
