use super::card::{Card, CardId};
use super::game::GameError;
use serde::{Deserialize, Serialize};

pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub is_host: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hand: Vec::new(),
            is_host,
        }
    }

    /// Adds a card to the player's hand.
    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    pub fn find_card(&self, card_id: CardId) -> Option<&Card> {
        self.hand.iter().find(|card| card.id == card_id)
    }

    /// Removes the card with the given id from the player's hand.
    /// Returns `Err(GameError::CardNotInHand)` if the player does not hold it.
    pub fn remove_card(&mut self, card_id: CardId) -> Result<Card, GameError> {
        let index = self
            .hand
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(GameError::CardNotInHand)?;
        Ok(self.hand.remove(index))
    }

    /// Checks if the player has won (i.e., their hand is empty).
    pub fn has_won(&self) -> bool {
        self.hand.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uno_game::card::{CardType, Color};

    #[test]
    fn test_remove_card_by_id() {
        let mut player = Player::new("p1", "Alice", true);
        player.add_card(Card::new(4, Color::Red, CardType::Number(4)));
        player.add_card(Card::new(9, Color::Blue, CardType::Skip));

        let removed = player.remove_card(CardId(9)).unwrap();
        assert_eq!(removed.card_type, CardType::Skip);
        assert_eq!(player.hand.len(), 1);
        assert!(player.find_card(CardId(9)).is_none());
        assert!(!player.has_won());
    }

    #[test]
    fn test_remove_missing_card() {
        let mut player = Player::new("p1", "Alice", false);
        assert!(matches!(
            player.remove_card(CardId(1)),
            Err(GameError::CardNotInHand)
        ));
        assert!(player.has_won());
    }
}
