//! Input - Raw key names and button presses mapped to engine commands

use serde::{Deserialize, Serialize};

use crate::game_server::car::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command", content = "value")]
pub enum Command {
    Start,
    NextLevel,
    Steer(Direction),
    /// +1 or -1
    AdjustSpeed(i8),
}

impl Command {
    /// Map a DOM `KeyboardEvent.key` value. Anything else is ignored.
    pub fn from_key(key: &str) -> Option<Command> {
        match key {
            "ArrowUp" => Some(Command::AdjustSpeed(1)),
            "ArrowDown" => Some(Command::AdjustSpeed(-1)),
            "ArrowLeft" => Some(Command::Steer(Direction::Left)),
            "ArrowRight" => Some(Command::Steer(Direction::Right)),
            _ => None,
        }
    }
}
