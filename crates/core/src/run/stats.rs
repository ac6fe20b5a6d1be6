use super::*;
use crate::{apply_trigger, AbilityContext, Event, TriggerOutcome, TriggerPoint};

impl Session {
    /// Single funnel for every stat change. HP and energy clamp to their
    /// maxima; everything else floors at zero. Unknown resource names are
    /// designer data and are ignored.
    pub(crate) fn update_stat(&mut self, name: &str, delta: i64, events: &mut EventBus) {
        let stats = &mut self.state.player;
        match name {
            "hp" => stats.hp = (stats.hp + delta).clamp(0, stats.max_health),
            "energy" => stats.energy = (stats.energy + delta).clamp(0, stats.max_energy),
            "food" => stats.food = (stats.food + delta).max(0),
            "favor" => stats.favor = (stats.favor + delta).max(0),
            "shards" => stats.shards = (stats.shards + delta).max(0),
            _ => return,
        }
        events.push(Event::StatsChanged(self.state.player));
    }

    /// HP-damage wrapper: fires `on_receive_damage` before the delta lands,
    /// so mitigation effects have their hook point. The current effect
    /// vocabulary applies nothing here; the logs still surface.
    pub(crate) fn apply_damage(
        &mut self,
        amount: i64,
        enemy_id: Option<&str>,
        events: &mut EventBus,
    ) {
        if amount > 0 {
            let outcome = self.fire_trigger(TriggerPoint::OnReceiveDamage, enemy_id, None);
            self.emit_logs(&outcome.logs, events);
        }
        self.update_stat("hp", -amount, events);
    }

    /// Fold one trigger over the live sources: inventory in order, then the
    /// active enemy, race and class.
    pub(crate) fn fire_trigger(
        &self,
        point: TriggerPoint,
        enemy_id: Option<&str>,
        rolls: Option<(u8, u8)>,
    ) -> TriggerOutcome {
        let inventory = self
            .state
            .inventory
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect();
        let mut ctx = AbilityContext::new()
            .with_inventory(inventory)
            .with_enemy(enemy_id.and_then(|id| self.catalog.get(id)))
            .with_race(self.catalog.get(&self.state.race_id))
            .with_class(self.catalog.get(&self.state.class_id));
        if let Some((roll1, roll2)) = rolls {
            ctx = ctx.with_rolls(roll1, roll2);
        }
        apply_trigger(point, &mut ctx);
        ctx.into_outcome()
    }

    /// Enemy turns fold over the enemy alone; inventory, race and class are
    /// excluded.
    pub(crate) fn fire_enemy_trigger(
        &self,
        point: TriggerPoint,
        enemy_id: &str,
        rolls: Option<(u8, u8)>,
    ) -> TriggerOutcome {
        let mut ctx = AbilityContext::new().with_enemy(self.catalog.get(enemy_id));
        if let Some((roll1, roll2)) = rolls {
            ctx = ctx.with_rolls(roll1, roll2);
        }
        apply_trigger(point, &mut ctx);
        ctx.into_outcome()
    }

    /// Per-item dispatch: the named item is the only source.
    pub(crate) fn fire_item_trigger(&self, point: TriggerPoint, item_id: &str) -> TriggerOutcome {
        let inventory = self.catalog.get(item_id).into_iter().collect();
        let mut ctx = AbilityContext::new().with_inventory(inventory);
        apply_trigger(point, &mut ctx);
        ctx.into_outcome()
    }

    pub(crate) fn emit_logs(&self, logs: &[String], events: &mut EventBus) {
        for line in logs {
            events.push(Event::AbilityLog(line.clone()));
        }
    }

    /// Land the resource accumulators of a completed fold.
    pub(crate) fn apply_outcome_resources(
        &mut self,
        outcome: &TriggerOutcome,
        events: &mut EventBus,
    ) {
        if outcome.heal > 0 {
            self.update_stat("hp", outcome.heal, events);
        }
        for (stat, amount) in &outcome.gain {
            self.update_stat(stat, *amount, events);
        }
        for (stat, amount) in &outcome.lose {
            self.update_stat(stat, -*amount, events);
        }
    }

    pub(crate) fn has_item(&self, id: &str) -> bool {
        self.state.inventory.iter().any(|item| item == id)
    }

    pub(crate) fn end_run(&mut self, outcome: RunOutcome, events: &mut EventBus) -> Step {
        self.phase = Phase::Ended(outcome);
        self.state.encounter = None;
        events.push(Event::RunEnded(outcome));
        Step::Ended(outcome)
    }

    pub(crate) fn check_defeat(&mut self, events: &mut EventBus) -> Option<Step> {
        if self.state.player.hp <= 0 {
            return Some(self.end_run(RunOutcome::Defeat, events));
        }
        None
    }
}
