use super::*;
use crate::{DeckPlan, DiscardPiles, PlayerStats, VisibleCards};

impl Session {
    /// Character selection: validate the race/class pair, derive starting
    /// stats, grant the class trappings and shuffle both decks. Ids in the
    /// deck plan that fail to resolve are dropped.
    pub fn new(
        catalog: Catalog,
        plan: &DeckPlan,
        race_id: &str,
        class_id: &str,
        seed: u64,
    ) -> Result<Self, SessionError> {
        let (stats, inventory) = {
            let (_, race) = catalog
                .race(race_id)
                .ok_or_else(|| SessionError::UnknownCard(race_id.to_string()))?;
            let (class_card, class) = catalog
                .class(class_id)
                .ok_or_else(|| SessionError::UnknownCard(class_id.to_string()))?;
            let restricted = race
                .class_restriction
                .as_deref()
                .is_some_and(|name| name == class_id || name == class_card.name);
            if restricted {
                return Err(SessionError::ClassRestricted {
                    race: race_id.to_string(),
                    class: class_id.to_string(),
                });
            }
            let max_health = (race.health + class.health_modifier).max(1);
            let max_energy = (race.energy + class.energy_modifier).max(0);
            let stats = PlayerStats {
                hp: max_health,
                max_health,
                energy: max_energy,
                max_energy,
                food: race.rations.max(0),
                favor: 0,
                shards: 0,
            };
            let inventory: Vec<String> = class
                .starting_trappings
                .iter()
                .filter(|id| catalog.contains(id))
                .cloned()
                .collect();
            (stats, inventory)
        };

        let mut rng = RngState::from_seed(seed);
        let mut dungeon_deck: Vec<String> = plan
            .dungeon
            .iter()
            .filter(|id| catalog.contains(id))
            .cloned()
            .collect();
        let mut dungeon_result_deck: Vec<String> = plan
            .results
            .iter()
            .filter(|id| catalog.contains(id))
            .cloned()
            .collect();
        rng.shuffle(&mut dungeon_deck);
        rng.shuffle(&mut dungeon_result_deck);

        let state = PlayerRunState {
            player: stats,
            level: 1,
            current_room: 0,
            race_id: race_id.to_string(),
            class_id: class_id.to_string(),
            visible: VisibleCards {
                race_id: Some(race_id.to_string()),
                class_id: Some(class_id.to_string()),
                inventory: inventory.clone(),
                room_card_id: None,
                result_card_id: None,
                enemy_card_id: None,
            },
            inventory,
            discard: DiscardPiles::default(),
            encounter: None,
            dungeon_deck,
            dungeon_result_deck,
            axe_reroll_used: false,
        };

        Ok(Self {
            catalog,
            state,
            rng,
            phase: Phase::Idle,
            room: None,
        })
    }
}
