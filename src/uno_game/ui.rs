use super::card::{Card, Color};
use super::game::GameState;
use super::rules::can_play;
use std::io::{self, BufRead, BufReader, Write};

pub struct ConsoleUI {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Default for ConsoleUI {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleUI {
    pub fn new() -> Self {
        Self {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }

    pub fn with_streams(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, text: &str) -> io::Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    pub fn get_player_names(&mut self) -> io::Result<Vec<String>> {
        let mut player_names = Vec::new();
        loop {
            let name = self.prompt("Enter player name (or '.' to finish): ")?;

            if name == "." {
                if player_names.len() < 2 {
                    writeln!(self.output, "You need at least 2 players to start the game.")?;
                    continue;
                }
                break;
            }
            if !name.is_empty() {
                player_names.push(name);
            }
        }
        Ok(player_names)
    }

    pub fn display_game_state(&mut self, game: &GameState) -> io::Result<()> {
        writeln!(self.output, "\n--- Game {} ---", game.id)?;
        writeln!(self.output, "Direction: {:?}", game.direction)?;
        if let Some(top_card) = game.top_card() {
            match game.wild_color {
                Some(color) => writeln!(self.output, "Top Card: {} ({:?})", top_card, color)?,
                None => writeln!(self.output, "Top Card: {}", top_card)?,
            }
        }
        writeln!(self.output, "Deck Cards Remaining: {}", game.deck.len())?;
        for (i, player) in game.players.iter().enumerate() {
            let marker = if i == game.current_turn { ">" } else { " " };
            writeln!(
                self.output,
                "{} {} - {} cards{}",
                marker,
                player.name,
                player.hand.len(),
                if player.hand.len() == 1 { " UNO!" } else { "" }
            )?;
        }
        Ok(())
    }

    /// Lists the hand, starring the cards that can go on `game`'s top card.
    pub fn display_player_hand(
        &mut self,
        game: &GameState,
        player_name: &str,
        hand: &[Card],
    ) -> io::Result<()> {
        writeln!(self.output, "\nPlayer {}'s hand:", player_name)?;
        for (i, card) in hand.iter().enumerate() {
            let playable = game
                .top_card()
                .is_some_and(|top| can_play(card, top, game.wild_color));
            writeln!(self.output, "{}{}. {}", if playable { "*" } else { " " }, i, card)?;
        }
        Ok(())
    }

    pub fn get_player_action(&mut self) -> io::Result<String> {
        writeln!(self.output, "\nWhat would you like to do?")?;
        writeln!(self.output, "1. Play a card")?;
        writeln!(self.output, "2. Draw a card")?;
        writeln!(self.output, "3. Pass turn")?;
        writeln!(self.output, "q. Quit")?;
        self.prompt("Enter your choice: ")
    }

    /// Returns `Ok(Err(..))` for input that is not a number.
    pub fn get_card_index(&mut self) -> io::Result<Result<usize, String>> {
        let index = self.prompt("Enter the index of the card you want to play: ")?;
        Ok(index
            .parse::<usize>()
            .map_err(|_| "Invalid input. Please enter a number.".to_string()))
    }

    pub fn choose_color(&mut self) -> io::Result<Color> {
        loop {
            writeln!(self.output, "Choose a color:")?;
            writeln!(self.output, "1. Red")?;
            writeln!(self.output, "2. Green")?;
            writeln!(self.output, "3. Blue")?;
            writeln!(self.output, "4. Yellow")?;

            match self.prompt("Enter your choice: ")?.as_str() {
                "1" => return Ok(Color::Red),
                "2" => return Ok(Color::Green),
                "3" => return Ok(Color::Blue),
                "4" => return Ok(Color::Yellow),
                _ => writeln!(self.output, "Invalid choice. Please enter 1, 2, 3, or 4.")?,
            }
        }
    }

    pub fn show_message(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }
}
