use super::game::{Action, GameError, GameState};
use super::rules::RuleSet;
use super::session::generate_game_id;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug)]
pub enum ReplayError {
    Io(io::Error),
    Parse { line: usize, source: serde_json::Error },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "Failed to read script: {}", e),
            ReplayError::Parse { line, source } => write!(f, "Line {}: {}", line, source),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::Io(e) => Some(e),
            ReplayError::Parse { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        ReplayError::Io(e)
    }
}

/// One script action with the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub action: Action,
}

#[derive(Debug)]
pub struct ReplayReport {
    pub game: GameState,
    pub rejected: Vec<(usize, GameError)>,
}

/// Parses one JSON action per line. Blank lines and `#` comments are skipped.
pub fn read_script<R: BufRead>(reader: R) -> Result<Vec<ScriptLine>, ReplayError> {
    let mut script = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let action = serde_json::from_str(trimmed)
            .map_err(|source| ReplayError::Parse { line: i + 1, source })?;
        script.push(ScriptLine { line: i + 1, action });
    }
    Ok(script)
}

/// Runs `script` against a fresh game. The same seed always yields the same
/// game id, deal and reshuffles.
pub fn replay(script: &[ScriptLine], seed: u64, rules: RuleSet) -> ReplayReport {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = GameState::with_rules(generate_game_id(&mut rng), rules);
    let mut rejected = Vec::new();

    for ScriptLine { line, action } in script {
        match game.try_apply(action, &mut rng) {
            Ok(next) => game = next,
            Err(e) => {
                warn!("Line {}: {:?} rejected: {}", line, action, e);
                rejected.push((*line, e));
            }
        }
    }

    info!(
        "Replayed {} actions, {} rejected",
        script.len(),
        rejected.len()
    );
    ReplayReport { game, rejected }
}

pub fn replay_file(path: &Path, seed: u64, rules: RuleSet) -> Result<ReplayReport, ReplayError> {
    let file = File::open(path)?;
    let script = read_script(BufReader::new(file))?;
    Ok(replay(&script, seed, rules))
}
