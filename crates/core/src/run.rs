use crate::{
    Catalog, EventBus, HostResponse, PlayerRunState, Prompt, RngState, RunOutcome, Step,
};
use std::collections::VecDeque;
use thiserror::Error;

mod combat;
mod items;
mod pipeline;
mod refcards;
mod save;
mod setup;
mod stats;

pub use combat::CombatSnapshot;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown card id {0}")]
    UnknownCard(String),
    #[error("race {race} cannot take class {class}")]
    ClassRestricted { race: String, class: String },
    #[error("the dungeon deck is exhausted")]
    DeckExhausted,
    #[error("a room is already in progress")]
    RoomInProgress,
    #[error("no pending interaction matches this response")]
    UnexpectedResponse,
    #[error("the run has ended")]
    RunEnded,
    #[error("inventory slot {0} is empty")]
    InvalidItemIndex(usize),
    #[error("items cannot be managed during combat")]
    ItemsLocked,
}

/// Room currently being resolved: the paired cards plus the icons still to
/// process, strictly left to right.
#[derive(Debug, Clone)]
pub(crate) struct RoomProgress {
    pub room_id: String,
    /// Deck card the result was derived from; this is what goes to the
    /// result discard pile, not the linked catalog card.
    pub basis_id: String,
    pub result_id: String,
    pub icons: VecDeque<String>,
}

/// Suspension the engine is parked on. The whole machine is plain data so
/// hosts and tests can inspect it without a UI.
#[derive(Debug, Clone)]
pub(crate) enum Phase {
    Idle,
    AwaitRoomDecision { peeked: String },
    AwaitIcon(IconWait),
    Combat(CombatState),
    Ended(RunOutcome),
}

#[derive(Debug, Clone)]
pub(crate) enum IconWait {
    /// Informational pause; any answer resumes the pipeline.
    Info { title: String, message: String },
    LootOffer { card_id: String },
    CampsiteChoice { boosted: bool },
    WaterRoll { dice: u8 },
    GroveRoll,
    AltarChoice,
    PigmanChoice,
    ShrineChoice,
}

#[derive(Debug, Clone)]
pub(crate) struct CombatState {
    pub enemy_id: String,
    pub enemy_hp: i64,
    pub wait: CombatWait,
}

#[derive(Debug, Clone)]
pub(crate) enum CombatWait {
    AwaitAction,
    AwaitPlayerRoll {
        energy: i64,
        rerolled: bool,
    },
    /// Player damage is computed but not yet applied; the pause surfaces the
    /// roll and, while the axe reroll is unspent, offers to replace it.
    AwaitTurnPause {
        energy: i64,
        roll1: u8,
        roll2: u8,
        damage: i64,
        miss: bool,
    },
    AwaitEnemyRoll,
    AwaitDiscardRoll,
}

/// One dungeon run: the catalog, the persisted state and the suspension
/// machine. The session is the single writer of its `PlayerRunState`; hosts
/// read it for display and mutate only through the session's operations.
#[derive(Debug)]
pub struct Session {
    pub(crate) catalog: Catalog,
    pub(crate) state: PlayerRunState,
    pub(crate) rng: RngState,
    pub(crate) phase: Phase,
    pub(crate) room: Option<RoomProgress>,
}

impl Session {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &PlayerRunState {
        &self.state
    }

    /// Seed the session was created with, for hosts that persist it.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            Phase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The prompt the engine is currently suspended on, if any. Used by
    /// hosts to re-display after a restore.
    pub fn prompt(&self) -> Option<Prompt> {
        match &self.phase {
            Phase::Idle | Phase::Ended(_) => None,
            Phase::AwaitRoomDecision { peeked } => Some(self.room_decision_prompt(peeked)),
            Phase::AwaitIcon(wait) => Some(self.icon_prompt(wait)),
            Phase::Combat(combat) => Some(self.combat_prompt(combat)),
        }
    }

    /// Feed a host answer to the pending suspension and advance until the
    /// next one. A mismatched response leaves the suspension untouched.
    pub fn respond(
        &mut self,
        response: HostResponse,
        events: &mut EventBus,
    ) -> Result<Step, SessionError> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match (phase, response) {
            (Phase::AwaitRoomDecision { peeked }, HostResponse::RoomDecision(decision)) => {
                self.form_pair(peeked, decision, events)
            }
            (Phase::AwaitIcon(wait), response) => self.icon_respond(wait, response, events),
            (Phase::Combat(combat), response) => self.combat_respond(combat, response, events),
            (Phase::Ended(outcome), _) => {
                self.phase = Phase::Ended(outcome);
                Err(SessionError::RunEnded)
            }
            (phase, _) => {
                self.phase = phase;
                Err(SessionError::UnexpectedResponse)
            }
        }
    }
}
