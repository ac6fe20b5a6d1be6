use serde::{Deserialize, Serialize};

/// One designer-authored ability or effect line on a card. Free-form by
/// policy: unknown triggers or actions must never fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectDef {
    /// Absent trigger matches every trigger point.
    #[serde(default)]
    pub trigger: Option<String>,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
}

impl EffectDef {
    pub fn matches(&self, point: TriggerPoint) -> bool {
        match &self.trigger {
            None => true,
            Some(name) => name == point.as_str(),
        }
    }
}

/// The trigger points the engine fires. Effect data matches these by their
/// string names, so designer data stays forward-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerPoint {
    OnAttack,
    OnCombatStart,
    OnTrapEncounter,
    OnUse,
    OnDiscard,
    OnReceiveDamage,
}

impl TriggerPoint {
    pub const ALL: [Self; 6] = [
        Self::OnAttack,
        Self::OnCombatStart,
        Self::OnTrapEncounter,
        Self::OnUse,
        Self::OnDiscard,
        Self::OnReceiveDamage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnAttack => "on_attack",
            Self::OnCombatStart => "on_combat_start",
            Self::OnTrapEncounter => "on_trap_encounter",
            Self::OnUse => "on_use",
            Self::OnDiscard => "on_discard",
            Self::OnReceiveDamage => "on_receive_damage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Damage,
    Heal,
    GainResource,
    LoseResource,
    AttackFirst,
    IgnoreMiss,
    Reroll,
    Defeat,
    Bypass,
}

impl ActionKind {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "damage" => Some(Self::Damage),
            "heal" => Some(Self::Heal),
            "gain_resource" => Some(Self::GainResource),
            "lose_resource" => Some(Self::LoseResource),
            "attack_first" => Some(Self::AttackFirst),
            "ignore_miss" => Some(Self::IgnoreMiss),
            "reroll" | "reroll_dice" => Some(Self::Reroll),
            "defeat" => Some(Self::Defeat),
            "bypass" | "bypass_encounter" => Some(Self::Bypass),
            _ => None,
        }
    }
}
