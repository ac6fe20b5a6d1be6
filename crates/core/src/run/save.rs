use super::*;

impl Session {
    /// The persisted aggregate is the save file; it already mirrors any
    /// suspended encounter.
    pub fn save(&self) -> PlayerRunState {
        self.state.clone()
    }

    /// Rebuild a session from a saved aggregate. Ids that no longer resolve
    /// are dropped rather than failing the load. A saved encounter resumes
    /// at the start-of-turn suspension with the stored HP values; any room
    /// icons that were queued behind it do not survive a save.
    pub fn restore(
        catalog: Catalog,
        mut state: PlayerRunState,
        seed: u64,
    ) -> Result<Self, SessionError> {
        state.sanitize(&catalog);
        if catalog.race(&state.race_id).is_none() {
            return Err(SessionError::UnknownCard(state.race_id));
        }
        if catalog.class(&state.class_id).is_none() {
            return Err(SessionError::UnknownCard(state.class_id));
        }
        let phase = match &state.encounter {
            Some(encounter) if encounter.in_progress => Phase::Combat(CombatState {
                enemy_id: encounter.enemy_id.clone(),
                enemy_hp: encounter.enemy_hp,
                wait: CombatWait::AwaitAction,
            }),
            _ => Phase::Idle,
        };
        Ok(Self {
            catalog,
            state,
            rng: RngState::from_seed(seed),
            phase,
            room: None,
        })
    }
}
