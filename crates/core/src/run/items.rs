use super::*;
use crate::{CardData, Event, TriggerPoint};

impl Session {
    /// Fire `on_use` for one inventory item through the trigger engine.
    /// Items with no matching effect are left alone; anything that applied
    /// consumes the item.
    pub fn use_item(&mut self, index: usize, events: &mut EventBus) -> Result<(), SessionError> {
        self.check_items_unlocked()?;
        let id = self
            .state
            .inventory
            .get(index)
            .cloned()
            .ok_or(SessionError::InvalidItemIndex(index))?;
        let outcome = self.fire_item_trigger(TriggerPoint::OnUse, &id);
        if !outcome.applied_anything() {
            return Ok(());
        }
        self.emit_logs(&outcome.logs, events);
        self.apply_outcome_resources(&outcome, events);
        self.remove_item(index, &id, events);
        events.push(Event::ItemUsed { card_id: id });
        self.check_defeat(events);
        Ok(())
    }

    /// Fire `on_discard` for one inventory item, then remove it.
    pub fn discard_item(
        &mut self,
        index: usize,
        events: &mut EventBus,
    ) -> Result<(), SessionError> {
        self.check_items_unlocked()?;
        let id = self
            .state
            .inventory
            .get(index)
            .cloned()
            .ok_or(SessionError::InvalidItemIndex(index))?;
        let outcome = self.fire_item_trigger(TriggerPoint::OnDiscard, &id);
        self.emit_logs(&outcome.logs, events);
        self.apply_outcome_resources(&outcome, events);
        self.remove_item(index, &id, events);
        events.push(Event::ItemDiscarded { card_id: id });
        self.check_defeat(events);
        Ok(())
    }

    fn check_items_unlocked(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Combat(_) => Err(SessionError::ItemsLocked),
            Phase::Ended(_) => Err(SessionError::RunEnded),
            _ => Ok(()),
        }
    }

    fn remove_item(&mut self, index: usize, id: &str, events: &mut EventBus) {
        self.state.inventory.remove(index);
        self.state.visible.inventory = self.state.inventory.clone();
        let pile = match self.catalog.get(id).map(|card| &card.kind) {
            Some(CardData::Trapping(_)) => &mut self.state.discard.trappings,
            _ => &mut self.state.discard.loot,
        };
        pile.push(id.to_string());
        events.push(Event::InventoryChanged(self.state.inventory.clone()));
    }
}
