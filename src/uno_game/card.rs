use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Wild,
}

impl Color {
    /// The four colors a player may nominate for a wild card.
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl CardType {
    pub fn is_wild(&self) -> bool {
        matches!(self, CardType::Wild | CardType::WildDrawFour)
    }

    /// Same kind, ignoring the rank carried by number cards.
    pub fn same_kind(&self, other: &CardType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Stable identity of a physical card, independent of its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub color: Color,
    pub card_type: CardType,
}

impl Card {
    pub fn new(id: u32, color: Color, card_type: CardType) -> Self {
        Self {
            id: CardId(id),
            color,
            card_type,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.card_type.is_wild()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.card_type {
            CardType::Number(n) => write!(f, "{:?} {}", self.color, n),
            CardType::Wild => write!(f, "Wild"),
            CardType::WildDrawFour => write!(f, "Wild Draw Four"),
            other => write!(f, "{:?} {:?}", self.color, other),
        }
    }
}

pub const DECK_SIZE: usize = 108;

/// Builds the canonical unshuffled 108-card deck, ids assigned in order from 1.
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 1;
    let mut push = |deck: &mut Vec<Card>, color, card_type| {
        deck.push(Card::new(next_id, color, card_type));
        next_id += 1;
    };

    for &color in &Color::PLAYABLE {
        // One 0 per color
        push(&mut deck, color, CardType::Number(0));

        // Two copies of each numbered card (1-9)
        for number in 1..=9 {
            push(&mut deck, color, CardType::Number(number));
            push(&mut deck, color, CardType::Number(number));
        }

        for card_type in [CardType::Skip, CardType::Reverse, CardType::DrawTwo] {
            push(&mut deck, color, card_type);
            push(&mut deck, color, card_type);
        }
    }

    for _ in 0..4 {
        push(&mut deck, Color::Wild, CardType::Wild);
        push(&mut deck, Color::Wild, CardType::WildDrawFour);
    }

    deck
}

/// Uniform Fisher-Yates shuffle driven by `rng`, so a seeded rng gives a
/// reproducible order.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// A freshly built and shuffled deck.
pub fn new_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = build_deck();
    shuffle(&mut deck, rng);
    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_build_deck_composition() {
        let deck = build_deck();
        assert_eq!(deck.len(), DECK_SIZE);

        for color in Color::PLAYABLE {
            let of_color: Vec<_> = deck.iter().filter(|c| c.color == color).collect();
            assert_eq!(of_color.len(), 25);
            let zeros = of_color
                .iter()
                .filter(|c| c.card_type == CardType::Number(0))
                .count();
            assert_eq!(zeros, 1);
            for n in 1..=9 {
                let count = of_color
                    .iter()
                    .filter(|c| c.card_type == CardType::Number(n))
                    .count();
                assert_eq!(count, 2, "{:?} {}", color, n);
            }
            for kind in [CardType::Skip, CardType::Reverse, CardType::DrawTwo] {
                assert_eq!(of_color.iter().filter(|c| c.card_type == kind).count(), 2);
            }
        }

        let wilds = deck.iter().filter(|c| c.card_type == CardType::Wild).count();
        let draw_fours = deck
            .iter()
            .filter(|c| c.card_type == CardType::WildDrawFour)
            .count();
        assert_eq!(wilds, 4);
        assert_eq!(draw_fours, 4);
        assert!(deck.iter().filter(|c| c.is_wild()).all(|c| c.color == Color::Wild));
    }

    #[test]
    fn test_card_ids_are_unique() {
        let deck = build_deck();
        let ids: HashSet<_> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), DECK_SIZE);
        assert_eq!(deck[0].id.to_string(), "card-1");
        assert_eq!(deck[DECK_SIZE - 1].id.to_string(), "card-108");
    }

    #[test]
    fn test_new_deck_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut shuffled = new_deck(&mut rng);
        assert_eq!(shuffled.len(), DECK_SIZE);
        shuffled.sort_by_key(|c| c.id);
        assert_eq!(shuffled, build_deck());
    }

    #[test]
    fn test_shuffle_is_deterministic_for_a_seed() {
        let a = new_deck(&mut StdRng::seed_from_u64(42));
        let b = new_deck(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![9];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, vec![9]);
    }

    #[test]
    fn test_shuffle_uniformity() {
        let mut rng = StdRng::seed_from_u64(2024);
        let rounds = 60_000;
        let mut counts: HashMap<[u8; 3], usize> = HashMap::new();

        for _ in 0..rounds {
            let mut items = [0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }

        // 3! orderings, each expected 10_000 times (std dev ~91)
        assert_eq!(counts.len(), 6);
        let expected = rounds / 6;
        for (perm, count) in counts {
            let diff = count.abs_diff(expected);
            assert!(diff < 600, "{:?} appeared {} times", perm, count);
        }
    }

    #[test]
    fn test_same_kind_ignores_rank() {
        assert!(CardType::Number(3).same_kind(&CardType::Number(8)));
        assert!(CardType::Skip.same_kind(&CardType::Skip));
        assert!(!CardType::Skip.same_kind(&CardType::Reverse));
        assert!(!CardType::Wild.same_kind(&CardType::WildDrawFour));
    }
}
