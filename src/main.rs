use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use uno_engine::uno_game::controller::GameController;
use uno_engine::uno_game::replay::replay_file;
use uno_engine::uno_game::rules::{RuleSet, SkipRule};
use uno_engine::uno_game::session::{MemoryStore, SessionManager};
use uno_engine::uno_game::ui::ConsoleUI;

#[derive(Parser)]
#[command(name = "uno-engine", version, about = "UNO rules engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a hot-seat game in this terminal
    Play {
        /// Player names in turn order; prompted for when omitted
        #[arg(short, long = "player")]
        players: Vec<String>,
        /// Seed for a reproducible deal
        #[arg(long)]
        seed: Option<u64>,
        /// Skip cards pass over the next player
        #[arg(long)]
        skip_next: bool,
    },
    /// Apply a JSON-lines action script and print the final game state
    Replay {
        script: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        skip_next: bool,
    },
}

fn rules(skip_next: bool) -> RuleSet {
    RuleSet {
        skip: if skip_next {
            SkipRule::SkipNext
        } else {
            SkipRule::Pass
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            players,
            seed,
            skip_next,
        } => {
            let mut ui = ConsoleUI::new();
            let players = if players.len() < 2 {
                ui.get_player_names()?
            } else {
                players
            };

            let store = MemoryStore::new();
            let manager = match seed {
                Some(seed) => SessionManager::seeded(store, seed),
                None => SessionManager::new(store),
            }
            .with_rules(rules(skip_next));

            let mut controller = GameController::new(manager, ui, &players)?;
            if controller.run()?.is_none() {
                info!("Game abandoned");
            }
        }
        Command::Replay {
            script,
            seed,
            skip_next,
        } => {
            let report = replay_file(&script, seed, rules(skip_next))?;
            println!("{}", serde_json::to_string_pretty(&report.game)?);
        }
    }

    Ok(())
}
