use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phase of a run. Exactly one is current at a time; a fresh controller starts
/// at [`GameState::MainMenu`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    MainMenu,
    Tutorial,
    Playing,
    Paused,
    GameOver,
}

impl GameState {
    pub const ALL: [GameState; 5] = [
        GameState::MainMenu,
        GameState::Tutorial,
        GameState::Playing,
        GameState::Paused,
        GameState::GameOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::MainMenu => "main_menu",
            GameState::Tutorial => "tutorial",
            GameState::Playing => "playing",
            GameState::Paused => "paused",
            GameState::GameOver => "game_over",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game state '{0}'")]
pub struct UnknownGameState(pub String);

impl FromStr for GameState {
    type Err = UnknownGameState;

    /// Accepts the snake_case names plus CamelCase (`MainMenu`, `GameOver`, ...)
    /// and `menu` as a short alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "mainmenu" | "menu" => Ok(GameState::MainMenu),
            "tutorial" => Ok(GameState::Tutorial),
            "playing" => Ok(GameState::Playing),
            "paused" => Ok(GameState::Paused),
            "gameover" => Ok(GameState::GameOver),
            _ => Err(UnknownGameState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_main_menu() {
        assert_eq!(GameState::default(), GameState::MainMenu);
    }

    #[test]
    fn parses_loose_spellings() {
        assert_eq!("MainMenu".parse::<GameState>(), Ok(GameState::MainMenu));
        assert_eq!("game_over".parse::<GameState>(), Ok(GameState::GameOver));
        assert_eq!(" Paused ".parse::<GameState>(), Ok(GameState::Paused));
        assert!("sledding".parse::<GameState>().is_err());
    }

    #[test]
    fn display_matches_serde_name() {
        for state in GameState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }
}
