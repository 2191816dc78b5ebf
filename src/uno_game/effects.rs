use super::card::CardType;
use super::game::GameState;

impl GameState {
    /// Applies the played card's effect. Runs only after a successful play
    /// that did not end the game.
    ///
    /// Number and plain wild cards do nothing here; the caller passes the turn.
    /// Every other card moves the turn itself.
    pub(super) fn resolve_effect(&mut self, card_type: CardType) {
        match card_type {
            CardType::Skip => {
                for _ in 0..self.rules.skip.advances() {
                    self.advance_turn();
                }
            }
            CardType::Reverse => {
                self.reverse_direction();
                // Between two players a reverse acts as a skip
                if self.players.len() == 2 {
                    for _ in 0..self.rules.skip.advances() {
                        self.advance_turn();
                    }
                }
            }
            CardType::DrawTwo => self.force_draw(2),
            CardType::WildDrawFour => self.force_draw(4),
            CardType::Number(_) | CardType::Wild => {}
        }
    }

    /// Moves to the target, hands them up to `count` cards from the draw pile,
    /// then moves past them. An exhausted pile is not reshuffled.
    fn force_draw(&mut self, count: usize) {
        self.advance_turn();
        let target = self.current_turn;
        for _ in 0..count {
            match self.deck.pop_front() {
                Some(card) => self.players[target].add_card(card),
                None => break,
            }
        }
        self.advance_turn();
    }
}
