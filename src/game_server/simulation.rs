//! Simulation - Main game server and loop
//!
//! Owns the race session, its timers and the random source. The front end
//! polls `tick`, which turns wall-clock time into timer firings; every
//! callback runs to completion before the next one, and all timers are
//! torn down the moment the session stops being active.

use std::time::{Duration, Instant};

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game_server::car::Direction;
use crate::game_server::input::Command;
use crate::game_server::race::{RaceConfig, RaceSession, SessionSnapshot, SessionStatus};
use crate::game_server::timers::{TimerKind, Timers};

/// Server statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    pub tick_rate: f32,
    pub avg_tick_time_ms: f32,
    pub opponent_count: u32,
    pub power_up_count: u32,
    pub status: SessionStatus,
    pub paused: bool,
}

/// Main game server
pub struct GameServer {
    session: RaceSession,
    timers: Timers,
    rng: StdRng,
    /// Last wall-clock poll
    last_tick: Instant,
    /// Recent dispatch times for averaging (ms)
    tick_times: Vec<f32>,
    paused: bool,
}

impl GameServer {
    /// Create a new game server with an entropy-seeded random source
    pub fn new(config: RaceConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible opponents and power-ups
    pub fn with_seed(config: RaceConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: RaceConfig, rng: StdRng) -> Self {
        Self {
            session: RaceSession::new(config),
            timers: Timers::new(),
            rng,
            last_tick: Instant::now(),
            tick_times: Vec::with_capacity(60),
            paused: false,
        }
    }

    /// Set track length and race duration for the next start.
    ///
    /// `None` restores the default. Non-finite or non-positive lengths and a
    /// zero duration are rejected and leave the config untouched.
    pub fn configure(
        &mut self,
        track_length: Option<f32>,
        race_seconds: Option<u32>,
    ) -> Result<(), String> {
        let defaults = RaceConfig::default();
        let track_length = track_length.unwrap_or(defaults.track_length);
        let race_seconds = race_seconds.unwrap_or(defaults.race_seconds);

        if !track_length.is_finite() || track_length <= 0.0 {
            warn!("Rejected track length {}", track_length);
            return Err(format!("track length must be a positive number, got {track_length}"));
        }
        if race_seconds == 0 {
            warn!("Rejected zero race duration");
            return Err("race duration must be at least one second".to_string());
        }

        let config = &mut self.session.config;
        config.track_length = track_length;
        config.race_seconds = race_seconds;
        Ok(())
    }

    /// Start (or restart) a race from the grid
    pub fn start_race(&mut self) {
        self.session.start();
        self.arm_timers();
    }

    /// Continue to the next level after a win
    pub fn next_level(&mut self) -> Result<(), String> {
        if !self.session.next_level(&mut self.rng) {
            warn!("Next level requested in {:?}", self.session.status());
            return Err("next level is only available after winning a race".to_string());
        }
        self.arm_timers();
        Ok(())
    }

    fn arm_timers(&mut self) {
        self.timers.arm_race();
        self.paused = false;
        self.last_tick = Instant::now();
    }

    pub fn steer(&mut self, direction: Direction) {
        self.session.request_lane_change(direction);
    }

    pub fn adjust_speed(&mut self, delta: i8) {
        self.session.request_speed_change(delta);
    }

    pub fn apply(&mut self, command: Command) -> Result<(), String> {
        match command {
            Command::Start => self.start_race(),
            Command::NextLevel => return self.next_level(),
            Command::Steer(direction) => self.steer(direction),
            Command::AdjustSpeed(delta) => self.adjust_speed(delta),
        }
        Ok(())
    }

    /// Apply a raw key press. Returns whether the key was recognised.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match Command::from_key(key) {
            Some(command) => self.apply(command).is_ok(),
            None => false,
        }
    }

    /// Advance by the wall-clock time since the last poll
    pub fn tick(&mut self) -> SessionSnapshot {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick);
        self.last_tick = now;

        if self.paused {
            return self.session.snapshot();
        }
        self.advance(delta)
    }

    /// Advance the timers by `elapsed` and run every callback that falls due
    pub fn advance(&mut self, elapsed: Duration) -> SessionSnapshot {
        if self.paused || !self.timers.is_armed() {
            return self.session.snapshot();
        }

        let dispatch_start = Instant::now();
        let deadline = self.timers.now() + elapsed;

        while let Some(kind) = self.timers.poll(deadline) {
            self.dispatch(kind);
            if !self.session.is_active() {
                info!(
                    "Session ended: {:?}, timers stopped",
                    self.session.status()
                );
                self.timers.clear();
                break;
            }
        }
        self.timers.settle(deadline);

        let dispatch_time = dispatch_start.elapsed().as_secs_f32() * 1000.0;
        self.tick_times.push(dispatch_time);
        if self.tick_times.len() > 60 {
            self.tick_times.remove(0);
        }

        self.session.snapshot()
    }

    fn dispatch(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::RaceTick => self.session.tick(),
            TimerKind::RoadScroll => self.session.scroll_road(),
            TimerKind::Countdown => self.session.tick_clock(),
            TimerKind::OpponentSpeed => self.session.randomize_opponent_speeds(&mut self.rng),
            TimerKind::OpponentLane => self.session.shift_opponent_lanes(&mut self.rng),
            TimerKind::PowerUpSpawn => {
                self.session.spawn_power_up(&mut self.rng);
            }
        }
    }

    /// Get current session snapshot
    pub fn get_snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Direct access for scripted scenarios
    pub fn session_mut(&mut self) -> &mut RaceSession {
        &mut self.session
    }

    /// Get server statistics
    pub fn get_stats(&self) -> ServerStats {
        let avg_tick_time = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32
        };

        ServerStats {
            tick_rate: 1.0 / TimerKind::RaceTick.period().as_secs_f32(),
            avg_tick_time_ms: avg_tick_time,
            opponent_count: self.session.opponents.len() as u32,
            power_up_count: self.session.power_ups.len() as u32,
            status: self.session.status(),
            paused: self.paused,
        }
    }

    /// Discard the session and every timer. Only the high score survives.
    pub fn reset(&mut self) {
        let high_score = self.session.high_score;
        self.session = RaceSession::new(self.session.config.clone());
        self.session.high_score = high_score;
        self.timers.clear();
        self.paused = false;
        self.tick_times.clear();
    }

    /// Freeze the clock; paused time is never replayed
    pub fn pause(&mut self) {
        if self.timers.is_armed() {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_tick = Instant::now();
        }
    }

    /// Check if timers are live
    pub fn is_running(&self) -> bool {
        self.timers.is_armed() && !self.paused
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new(RaceConfig::default())
    }
}
