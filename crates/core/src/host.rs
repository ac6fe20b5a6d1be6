use crate::RunOutcome;
use serde::{Deserialize, Serialize};

/// What the engine asks the host to present. The engine suspends on every
/// prompt; the host answers with a [`HostResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Prompt {
    /// The icon-independent suspension point: resolve or skip the peeked
    /// room card.
    RoomDecision {
        card_id: String,
        name: String,
        icons: String,
    },
    /// Uniform interaction for icons, reference cards and combat pauses.
    /// `die_count > 0` means the host rolls that many dice and answers with
    /// `HostResponse::Rolls`.
    Choice {
        title: String,
        message: String,
        image: Option<String>,
        choices: Vec<ChoiceOption>,
        die_count: u8,
    },
    /// Start-of-turn combat prompt, repeated once per player turn.
    CombatTurn {
        enemy_id: String,
        enemy_name: String,
        enemy_hp: i64,
        player_hp: i64,
        player_energy: i64,
        energy_options: Vec<i64>,
        abilities: Vec<String>,
        can_reroll: bool,
        can_discard_axe: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomDecision {
    Resolve,
    Skip,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CombatAction {
    Attack { energy: i64 },
    DiscardAxe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HostResponse {
    RoomDecision(RoomDecision),
    Choice(String),
    Rolls(Vec<u8>),
    Combat(CombatAction),
}

/// Result of advancing the engine: either another suspension, or a room,
/// level or run boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Prompt(Prompt),
    RoomCleared { rooms_cleared: u8 },
    LevelCleared { level: u8 },
    Ended(RunOutcome),
}

/// Choice values the engine understands. Hosts echo these back verbatim.
pub mod choice {
    pub const OK: &str = "ok";
    pub const ACCEPT: &str = "accept";
    pub const DECLINE: &str = "decline";
    pub const HEAL: &str = "heal";
    pub const FOOD: &str = "food";
    pub const CONTINUE: &str = "continue";
    pub const REROLL: &str = "reroll";
    pub const PRAY: &str = "pray";
    pub const LEAVE: &str = "leave";
    pub const FEED: &str = "feed";
    pub const FIGHT: &str = "fight";
    pub const OFFER: &str = "offer";
}
