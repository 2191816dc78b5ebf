use super::card::{Card, CardType, Color};
use serde::{Deserialize, Serialize};

/// How far a skipping effect moves the turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipRule {
    /// Skip, and Reverse between two players, advance the turn once.
    #[default]
    Pass,
    /// Skip, and Reverse between two players, advance past the next player.
    SkipNext,
}

impl SkipRule {
    pub fn advances(&self) -> usize {
        match self {
            SkipRule::Pass => 1,
            SkipRule::SkipNext => 2,
        }
    }
}

/// Table rules fixed when a game is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub skip: SkipRule,
}

/// Checks if `card` can be played on `top_card`.
///
/// When a wild card is on top only the nominated `wild_color` matters.
pub fn can_play(card: &Card, top_card: &Card, wild_color: Option<Color>) -> bool {
    if card.is_wild() {
        return true;
    }

    if top_card.is_wild() {
        return Some(card.color) == wild_color;
    }

    card.color == top_card.color
        || card.card_type.same_kind(&top_card.card_type)
        || match (card.card_type, top_card.card_type) {
            (CardType::Number(n), CardType::Number(m)) => n == m,
            _ => false,
        }
}
