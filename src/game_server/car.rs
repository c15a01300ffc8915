//! Car - Player and opponent car state
//!
//! Cars sit in one of three discrete lanes and advance along a straight
//! track. Positions only ever grow and are clamped at the finish line.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the three discrete lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Left,
    Center,
    Right,
}

/// Requested steering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// One step toward `direction`, staying put at the edge
    pub fn step(self, direction: Direction) -> Lane {
        match (self, direction) {
            (Lane::Left, Direction::Left) => Lane::Left,
            (Lane::Center, Direction::Left) => Lane::Left,
            (Lane::Right, Direction::Left) => Lane::Center,
            (Lane::Left, Direction::Right) => Lane::Center,
            (Lane::Center, Direction::Right) => Lane::Right,
            (Lane::Right, Direction::Right) => Lane::Right,
        }
    }

    /// Edge lanes fold back to center, center drifts out to either side
    pub fn drift<R: Rng + ?Sized>(self, rng: &mut R) -> Lane {
        match self {
            Lane::Left | Lane::Right => Lane::Center,
            Lane::Center => {
                if rng.gen_bool(0.5) {
                    Lane::Left
                } else {
                    Lane::Right
                }
            }
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Lane {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Cosmetic body style for opponent cars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Racer,
    Cyber,
    Truck,
}

impl CarType {
    /// Opponents are drawn as either cyber or truck bodies
    pub fn random_opponent<R: Rng + ?Sized>(rng: &mut R) -> CarType {
        if rng.gen_bool(0.5) {
            CarType::Cyber
        } else {
            CarType::Truck
        }
    }
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCar {
    /// Distance from the start line
    pub track_position: f32,
    pub lane: Lane,
    /// Always within the configured speed bounds
    pub speed: f32,
    /// Absorbs the next collision
    pub shielded: bool,
}

impl PlayerCar {
    pub fn new(start_speed: f32) -> Self {
        Self {
            track_position: 0.0,
            lane: Lane::Center,
            speed: start_speed,
            shielded: false,
        }
    }

    pub fn steer(&mut self, direction: Direction) {
        self.lane = self.lane.step(direction);
    }

    /// Add `delta` to the speed, clamped to `[min, max]`
    pub fn adjust_speed(&mut self, delta: f32, min: f32, max: f32) {
        self.speed = (self.speed + delta).clamp(min, max);
    }
}

/// An AI-driven opponent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentCar {
    /// Unique within a session
    pub id: u32,
    pub track_position: f32,
    /// Grid slot the car returns to when a new level starts
    pub start_position: f32,
    pub lane: Lane,
    pub speed: f32,
    pub car_type: CarType,
}

impl OpponentCar {
    pub fn new(id: u32, start_position: f32, speed: f32, lane: Lane, car_type: CarType) -> Self {
        Self {
            id,
            track_position: start_position,
            start_position,
            lane,
            speed,
            car_type,
        }
    }

    /// The two opponents every fresh session starts with
    pub fn starting_grid() -> Vec<OpponentCar> {
        vec![
            OpponentCar::new(1, 20.0, 3.0, Lane::Left, CarType::Cyber),
            OpponentCar::new(2, 40.0, 4.0, Lane::Right, CarType::Truck),
        ]
    }

    /// Back to the grid slot, keeping speed, lane and body
    pub fn return_to_grid(&mut self) {
        self.track_position = self.start_position;
    }
}

/// Advance a track position by `speed * time_step`, clamped at the finish
pub fn advance_position(position: f32, speed: f32, time_step: f32, track_length: f32) -> f32 {
    (position + speed.max(0.0) * time_step).min(track_length)
}

/// Compact player state for IPC transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: f32,
    pub lane: Lane,
    pub speed: f32,
    pub shielded: bool,
    pub car_type: CarType,
}

impl From<&PlayerCar> for PlayerSnapshot {
    fn from(car: &PlayerCar) -> Self {
        Self {
            position: car.track_position,
            lane: car.lane,
            speed: car.speed,
            shielded: car.shielded,
            car_type: CarType::Racer,
        }
    }
}

/// Compact opponent state for IPC transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    pub id: u32,
    pub position: f32,
    pub lane: Lane,
    pub speed: f32,
    pub car_type: CarType,
}

impl From<&OpponentCar> for OpponentSnapshot {
    fn from(car: &OpponentCar) -> Self {
        Self {
            id: car.id,
            position: car.track_position,
            lane: car.lane,
            speed: car.speed,
            car_type: car.car_type,
        }
    }
}
