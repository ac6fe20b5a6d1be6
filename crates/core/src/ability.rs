use crate::{ActionKind, CardDef, EffectDef, TriggerPoint};

/// Snapshot of every ability source for one trigger invocation, plus the
/// accumulators the matching effects fold into. Rebuilt per call, never
/// persisted.
#[derive(Debug, Default)]
pub struct AbilityContext<'a> {
    pub inventory: Vec<&'a CardDef>,
    pub enemy: Option<&'a CardDef>,
    pub race: Option<&'a CardDef>,
    pub class: Option<&'a CardDef>,
    pub roll1: Option<u8>,
    pub roll2: Option<u8>,
    pub attack_bonus: i64,
    pub heal: i64,
    pub gain: Vec<(String, i64)>,
    pub lose: Vec<(String, i64)>,
    pub attack_first: bool,
    pub ignore_miss: bool,
    pub reroll: bool,
    pub defeat_enemy: bool,
    pub bypass: bool,
    pub logs: Vec<String>,
}

impl<'a> AbilityContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(mut self, items: Vec<&'a CardDef>) -> Self {
        self.inventory = items;
        self
    }

    pub fn with_enemy(mut self, enemy: Option<&'a CardDef>) -> Self {
        self.enemy = enemy;
        self
    }

    pub fn with_race(mut self, race: Option<&'a CardDef>) -> Self {
        self.race = race;
        self
    }

    pub fn with_class(mut self, class: Option<&'a CardDef>) -> Self {
        self.class = class;
        self
    }

    pub fn with_rolls(mut self, roll1: u8, roll2: u8) -> Self {
        self.roll1 = Some(roll1);
        self.roll2 = Some(roll2);
        self
    }

    /// Source order is fixed: inventory entries in inventory order, then
    /// enemy, race, class. The fold order (and therefore the log order)
    /// depends on it.
    fn sources(&self) -> Vec<&'a CardDef> {
        let mut sources = self.inventory.clone();
        sources.extend(self.enemy);
        sources.extend(self.race);
        sources.extend(self.class);
        sources
    }
}

/// Owned copy of the accumulators after a trigger fold, safe to carry out
/// of the borrowed context.
#[derive(Debug, Clone, Default)]
pub struct TriggerOutcome {
    pub attack_bonus: i64,
    pub heal: i64,
    pub gain: Vec<(String, i64)>,
    pub lose: Vec<(String, i64)>,
    pub attack_first: bool,
    pub ignore_miss: bool,
    pub reroll: bool,
    pub defeat_enemy: bool,
    pub bypass: bool,
    pub logs: Vec<String>,
}

impl TriggerOutcome {
    /// True when the fold produced any concrete mutation or flag. Unknown
    /// actions leave logs but apply nothing.
    pub fn applied_anything(&self) -> bool {
        self.attack_bonus != 0
            || self.heal != 0
            || !self.gain.is_empty()
            || !self.lose.is_empty()
            || self.attack_first
            || self.ignore_miss
            || self.reroll
            || self.defeat_enemy
            || self.bypass
    }
}

impl<'a> AbilityContext<'a> {
    pub fn into_outcome(self) -> TriggerOutcome {
        TriggerOutcome {
            attack_bonus: self.attack_bonus,
            heal: self.heal,
            gain: self.gain,
            lose: self.lose,
            attack_first: self.attack_first,
            ignore_miss: self.ignore_miss,
            reroll: self.reroll,
            defeat_enemy: self.defeat_enemy,
            bypass: self.bypass,
            logs: self.logs,
        }
    }
}

/// Scan every attached source for effects matching `point` and fold their
/// actions into the context. Pure over game state: the only outputs are the
/// mutated accumulators and the log lines.
pub fn apply_trigger(point: TriggerPoint, ctx: &mut AbilityContext<'_>) {
    for source in ctx.sources() {
        let (abilities, effects) = source.ability_lists();
        for effect in abilities.iter().chain(effects.iter()) {
            if effect.matches(point) {
                apply_effect(&source.name, effect, ctx);
            }
        }
    }
}

fn apply_effect(source: &str, effect: &EffectDef, ctx: &mut AbilityContext<'_>) {
    let Some(kind) = ActionKind::from_keyword(&effect.action) else {
        // Unknown designer vocabulary: log it, never fail.
        ctx.logs
            .push(format!("{source}: unrecognized action '{}'", effect.action));
        return;
    };
    match kind {
        ActionKind::Damage => {
            let Some(amount) = effect.amount else { return };
            match effect.target.as_deref() {
                Some("player") => {
                    ctx.lose.push(("hp".into(), amount));
                    ctx.logs.push(format!("{source}: {amount} damage to you"));
                }
                _ => {
                    ctx.attack_bonus += amount;
                    ctx.logs.push(format!("{source}: +{amount} damage"));
                }
            }
        }
        ActionKind::Heal => {
            let Some(amount) = effect.amount else { return };
            ctx.heal += amount;
            ctx.logs.push(format!("{source}: heal {amount}"));
        }
        ActionKind::GainResource => {
            let (Some(target), Some(amount)) = (effect.target.as_deref(), effect.amount) else {
                return;
            };
            ctx.gain.push((target.to_string(), amount));
            ctx.logs.push(format!("{source}: gain {amount} {target}"));
        }
        ActionKind::LoseResource => {
            let (Some(target), Some(amount)) = (effect.target.as_deref(), effect.amount) else {
                return;
            };
            ctx.lose.push((target.to_string(), amount));
            ctx.logs.push(format!("{source}: lose {amount} {target}"));
        }
        ActionKind::AttackFirst => {
            ctx.attack_first = true;
            ctx.logs.push(format!("{source}: attacks first"));
        }
        ActionKind::IgnoreMiss => {
            ctx.ignore_miss = true;
            ctx.logs.push(format!("{source}: doubles no longer miss"));
        }
        ActionKind::Reroll => {
            ctx.reroll = true;
            ctx.logs.push(format!("{source}: grants a dice reroll"));
        }
        ActionKind::Defeat => {
            ctx.defeat_enemy = true;
            ctx.logs.push(format!("{source}: the enemy is defeated"));
        }
        ActionKind::Bypass => {
            ctx.bypass = true;
            ctx.logs.push(format!("{source}: encounter bypassed"));
        }
    }
}
