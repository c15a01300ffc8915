//! Power-ups that scroll up the track and can be picked up by the player

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game_server::car::Lane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    SpeedBoost,
    Shield,
}

impl PowerUpKind {
    /// Speed boosts are the common drop
    pub fn random<R: Rng + ?Sized>(rng: &mut R, speed_boost_chance: f64) -> PowerUpKind {
        if rng.gen_bool(speed_boost_chance) {
            PowerUpKind::SpeedBoost
        } else {
            PowerUpKind::Shield
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub track_position: f32,
    pub lane: Lane,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, lane: Lane) -> Self {
        Self {
            id,
            kind,
            track_position: 0.0,
            lane,
        }
    }
}
