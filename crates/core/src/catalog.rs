use crate::{CardData, CardDef, ClassCard, EnemyCard, RaceCard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate card id {0}")]
    DuplicateId(String),
    #[error("card is missing an id or name")]
    MissingIdentity,
}

/// Immutable id -> definition lookup shared by every component.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: HashMap<String, CardDef>,
}

impl Catalog {
    pub fn from_cards(cards: Vec<CardDef>) -> Result<Self, CatalogError> {
        let mut map = HashMap::with_capacity(cards.len());
        for card in cards {
            if card.id.is_empty() || card.name.is_empty() {
                return Err(CatalogError::MissingIdentity);
            }
            let id = card.id.clone();
            if map.insert(id.clone(), card).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { cards: map })
    }

    pub fn get(&self, id: &str) -> Option<&CardDef> {
        self.cards.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardDef> {
        self.cards.values()
    }

    pub fn enemy(&self, id: &str) -> Option<(&CardDef, &EnemyCard)> {
        let card = self.get(id)?;
        card.as_enemy().map(|enemy| (card, enemy))
    }

    pub fn race(&self, id: &str) -> Option<(&CardDef, &RaceCard)> {
        let card = self.get(id)?;
        card.as_race().map(|race| (card, race))
    }

    pub fn class(&self, id: &str) -> Option<(&CardDef, &ClassCard)> {
        let card = self.get(id)?;
        card.as_class().map(|class| (card, class))
    }

    /// Lookup for `Enemy=<Name>` descriptors, which reference enemies by
    /// display name rather than id.
    pub fn enemy_by_name(&self, name: &str) -> Option<(&CardDef, &EnemyCard)> {
        self.cards
            .values()
            .find(|card| matches!(card.kind, CardData::Enemy(_)) && card.name == name)
            .and_then(|card| card.as_enemy().map(|enemy| (card, enemy)))
    }

    /// Lookup for `Loot=<Name>` descriptors; loot and trapping cards both
    /// qualify.
    pub fn item_by_name(&self, name: &str) -> Option<&CardDef> {
        self.cards.values().find(|card| {
            matches!(card.kind, CardData::Loot(_) | CardData::Trapping(_)) && card.name == name
        })
    }
}

/// Ordered deck compositions, shuffled once at session start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckPlan {
    pub dungeon: Vec<String>,
    pub results: Vec<String>,
}
