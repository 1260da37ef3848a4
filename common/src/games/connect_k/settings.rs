use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::rules::Rules;
use super::types::{ComputerReplyMode, ComputerStrategy, Controller, FirstPlayerMode, SearchDepth};
use crate::config::Validate;
use crate::error::{GameError, GameResult};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SideSettings {
    pub name: Option<String>,
    pub controller: Controller,
}

impl SideSettings {
    pub fn human(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            controller: Controller::Human,
        }
    }

    pub fn computer(strategy: ComputerStrategy) -> Self {
        Self {
            name: None,
            controller: Controller::Computer { strategy },
        }
    }
}

/// Everything fixed before a game starts.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GameSettings {
    pub board_size: usize,
    pub win_length: usize,
    pub first_player: FirstPlayerMode,
    pub player_a: SideSettings,
    pub player_b: SideSettings,
    /// Plies searched below each candidate move; `None` picks a depth from
    /// the number of empty cells.
    pub search_depth: Option<usize>,
    pub computer_reply: ComputerReplyMode,
    pub search_timeout_ms: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_size: 3,
            win_length: 3,
            first_player: FirstPlayerMode::PlayerA,
            player_a: SideSettings::human(None),
            player_b: SideSettings::computer(ComputerStrategy::Minimax),
            search_depth: None,
            computer_reply: ComputerReplyMode::Immediate,
            search_timeout_ms: None,
        }
    }
}

impl GameSettings {
    pub fn rules(&self) -> GameResult<Rules> {
        Rules::new(self.board_size, self.win_length)
    }

    pub fn search_depth(&self) -> SearchDepth {
        self.search_depth.into()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.search_timeout_ms.map(Duration::from_millis)
    }

    pub fn validated(&self) -> GameResult<Rules> {
        self.validate().map_err(GameError::InvalidSettings)?;
        self.rules()
    }
}

impl Validate for GameSettings {
    fn validate(&self) -> Result<(), String> {
        self.rules().map_err(|err| match err {
            GameError::InvalidSettings(message) => message,
            other => other.to_string(),
        })?;
        if self.search_depth == Some(0) {
            return Err("Search depth must be at least 1".to_string());
        }
        if self.search_timeout_ms == Some(0) {
            return Err("Search timeout must be positive".to_string());
        }
        for (label, side) in [("player_a", &self.player_a), ("player_b", &self.player_b)] {
            if side.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
                return Err(format!("{} name must not be blank", label));
            }
        }
        Ok(())
    }
}
