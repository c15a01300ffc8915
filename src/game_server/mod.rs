//! Game Server Module
//!
//! Runs the lane racing mini-game in Rust: one race session advanced by
//! fixed-cadence timers, exposed to the front end as snapshots.

pub mod car;
pub mod input;
pub mod power_up;
pub mod race;
pub mod simulation;
pub mod timers;

pub use car::{CarType, Direction, Lane, OpponentCar, PlayerCar};
pub use input::Command;
pub use power_up::{PowerUp, PowerUpKind};
pub use race::{Outcome, RaceConfig, RaceSession, SessionSnapshot, SessionStatus};
pub use simulation::{GameServer, ServerStats};
