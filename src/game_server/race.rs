//! Race - Session configuration and state machine
//!
//! A `RaceSession` owns every piece of mutable game state: the player car,
//! the opponents, power-ups on the track, score, level and the countdown.
//! Each timer callback maps to one method here; none of them can fail.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game_server::car::{
    advance_position, CarType, Direction, Lane, OpponentCar, OpponentSnapshot, PlayerCar,
    PlayerSnapshot,
};
use crate::game_server::power_up::{PowerUp, PowerUpKind};

/// Race tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Finish line position
    pub track_length: f32,
    /// Seconds of simulated travel per race tick
    pub time_step: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub start_speed: f32,
    /// Countdown length (seconds)
    pub race_seconds: u32,
    /// Same-lane distance below which cars collide
    pub collision_distance: f32,
    /// Same-lane distance below which a power-up is collected
    pub pickup_distance: f32,
    /// Power-up travel per race tick
    pub power_up_drift: f32,
    /// Power-ups past this position are dropped
    pub visible_track: f32,
    pub speed_boost: f32,
    pub speed_boost_bonus: u32,
    pub shield_bonus: u32,
    /// Awarded every race tick the session survives
    pub tick_score: u32,
    pub finish_bonus: u32,
    /// Awarded when the clock runs out with the player in front
    pub time_up_bonus: u32,
    /// Levels below this one add an opponent when advanced
    pub level_cap: u32,
    pub extra_car_position: f32,
    pub lane_change_chance: f64,
    pub spawn_chance: f64,
    pub speed_boost_chance: f64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track_length: 90.0,
            time_step: 0.1,
            min_speed: 2.0,
            max_speed: 10.0,
            start_speed: 5.0,
            race_seconds: 120,
            collision_distance: 8.0,
            pickup_distance: 5.0,
            power_up_drift: 0.5,
            visible_track: 100.0,
            speed_boost: 2.0,
            speed_boost_bonus: 50,
            shield_bonus: 100,
            tick_score: 1,
            finish_bonus: 1000,
            time_up_bonus: 500,
            level_cap: 3,
            extra_car_position: 60.0,
            lane_change_chance: 0.2,
            spawn_chance: 0.2,
            speed_boost_chance: 0.7,
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    PlayerWin,
    /// Clock ran out with the player behind, or an opponent finished first
    TimeoutLoss,
    CollisionLoss,
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "outcome")]
pub enum SessionStatus {
    Idle,
    Active,
    Ended(Outcome),
}

/// Where the player crashed, for the explosion effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub position: f32,
    pub lane: Lane,
}

const ROAD_MARKINGS: [f32; 5] = [0.0, 20.0, 40.0, 60.0, 80.0];
const ROAD_WRAP: f32 = 100.0;

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSession {
    pub config: RaceConfig,
    pub active: bool,
    pub over: bool,
    pub outcome: Option<Outcome>,
    pub time_remaining: u32,
    pub score: u32,
    /// Best score for the lifetime of this session host
    pub high_score: u32,
    pub level: u32,
    pub player: PlayerCar,
    pub opponents: Vec<OpponentCar>,
    pub power_ups: Vec<PowerUp>,
    pub collision: Option<CollisionEvent>,
    pub road_markings: [f32; 5],
    next_power_up_id: u32,
}

impl RaceSession {
    /// Create an idle session; nothing moves until `start`
    pub fn new(config: RaceConfig) -> Self {
        Self {
            player: PlayerCar::new(config.start_speed),
            time_remaining: config.race_seconds,
            config,
            active: false,
            over: false,
            outcome: None,
            score: 0,
            high_score: 0,
            level: 1,
            opponents: OpponentCar::starting_grid(),
            power_ups: Vec::new(),
            collision: None,
            road_markings: ROAD_MARKINGS,
            next_power_up_id: 1,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match (self.active, self.outcome) {
            (true, _) => SessionStatus::Active,
            (false, Some(outcome)) => SessionStatus::Ended(outcome),
            (false, None) => SessionStatus::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fresh race from the starting grid. Level and high score carry over.
    pub fn start(&mut self) {
        self.player = PlayerCar::new(self.config.start_speed);
        self.opponents = OpponentCar::starting_grid();
        self.score = 0;
        self.reset_course();
        info!("Race started at level {}", self.level);
    }

    /// Advance to the next level. Only reachable from a won race.
    ///
    /// Returns `false` and leaves the session untouched otherwise.
    pub fn next_level<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.active || self.outcome != Some(Outcome::PlayerWin) {
            return false;
        }

        self.player = PlayerCar::new(self.config.start_speed);
        for car in &mut self.opponents {
            car.return_to_grid();
        }

        if self.level < self.config.level_cap {
            let car = OpponentCar::new(
                3 + self.level,
                self.config.extra_car_position,
                3.0 + rng.gen::<f32>() * self.level as f32,
                Lane::random(rng),
                CarType::random_opponent(rng),
            );
            debug!("Opponent {} joins in the {:?} lane", car.id, car.lane);
            self.opponents.push(car);
        }

        self.level += 1;
        self.reset_course();
        info!(
            "Level {} started with {} opponents",
            self.level,
            self.opponents.len()
        );
        true
    }

    fn reset_course(&mut self) {
        self.power_ups.clear();
        self.collision = None;
        self.road_markings = ROAD_MARKINGS;
        self.time_remaining = self.config.race_seconds;
        self.outcome = None;
        self.over = false;
        self.active = true;
    }

    pub fn request_lane_change(&mut self, direction: Direction) {
        if self.active {
            self.player.steer(direction);
        }
    }

    /// Nudge the player's speed by one unit in the direction of `delta`
    pub fn request_speed_change(&mut self, delta: i8) {
        if self.active {
            self.player.adjust_speed(
                f32::from(delta.signum()),
                self.config.min_speed,
                self.config.max_speed,
            );
        }
    }

    /// One race tick: move, collide, collect, score, resolve.
    pub fn tick(&mut self) {
        if !self.active {
            return;
        }

        let track_length = self.config.track_length;
        let time_step = self.config.time_step;

        self.player.track_position = advance_position(
            self.player.track_position,
            self.player.speed,
            time_step,
            track_length,
        );
        for car in &mut self.opponents {
            car.track_position =
                advance_position(car.track_position, car.speed, time_step, track_length);
        }

        let drift = self.config.power_up_drift;
        let visible = self.config.visible_track;
        self.power_ups.retain_mut(|power_up| {
            power_up.track_position += drift;
            power_up.track_position <= visible
        });

        // a crash still collects and scores this tick, only the finish check is skipped
        let crashed = self.check_collisions();
        self.collect_power_ups();

        self.score = self.score.saturating_add(self.config.tick_score);

        if crashed {
            return;
        }
        if self.player.track_position >= track_length {
            self.finish_with_win(self.config.finish_bonus);
        } else if self
            .opponents
            .iter()
            .any(|car| car.track_position >= track_length)
        {
            self.finish_with_loss(Outcome::TimeoutLoss);
        }
    }

    /// Resolve the first same-lane contact. Returns `true` if the race ended.
    fn check_collisions(&mut self) -> bool {
        let player = &self.player;
        let contact = self.opponents.iter().find(|car| {
            car.lane == player.lane
                && (car.track_position - player.track_position).abs()
                    < self.config.collision_distance
        });

        let Some(car) = contact else {
            return false;
        };

        if self.player.shielded {
            debug!("Shield absorbed contact with opponent {}", car.id);
            self.player.shielded = false;
            return false;
        }

        info!(
            "Collision with opponent {} at {:.1} in the {:?} lane",
            car.id, self.player.track_position, self.player.lane
        );
        self.collision = Some(CollisionEvent {
            position: self.player.track_position,
            lane: self.player.lane,
        });
        self.finish_with_loss(Outcome::CollisionLoss);
        true
    }

    fn collect_power_ups(&mut self) {
        let lane = self.player.lane;
        let position = self.player.track_position;
        let reach = self.config.pickup_distance;

        let (collected, remaining): (Vec<PowerUp>, Vec<PowerUp>) =
            std::mem::take(&mut self.power_ups)
                .into_iter()
                .partition(|p| p.lane == lane && (p.track_position - position).abs() < reach);
        self.power_ups = remaining;

        for power_up in collected {
            debug!("Collected {:?} power-up {}", power_up.kind, power_up.id);
            match power_up.kind {
                PowerUpKind::SpeedBoost => {
                    self.player.adjust_speed(
                        self.config.speed_boost,
                        self.config.min_speed,
                        self.config.max_speed,
                    );
                    self.score = self.score.saturating_add(self.config.speed_boost_bonus);
                }
                PowerUpKind::Shield => {
                    self.player.shielded = true;
                    self.score = self.score.saturating_add(self.config.shield_bonus);
                }
            }
        }
    }

    /// One second off the clock. At zero, whoever is further ahead wins.
    pub fn tick_clock(&mut self) {
        if !self.active {
            return;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return;
        }

        let leader = self
            .opponents
            .iter()
            .map(|car| car.track_position)
            .reduce(f32::max);

        match leader {
            Some(opponent) if self.player.track_position <= opponent => {
                info!(
                    "Time up with the player behind ({:.1} vs {:.1})",
                    self.player.track_position, opponent
                );
                self.finish_with_loss(Outcome::TimeoutLoss);
            }
            _ => {
                info!("Time up with the player in front");
                self.finish_with_win(self.config.time_up_bonus);
            }
        }
    }

    fn finish_with_win(&mut self, bonus: u32) {
        self.score = self.score.saturating_add(bonus);
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        self.outcome = Some(Outcome::PlayerWin);
        self.active = false;
        info!("Player wins level {} with score {}", self.level, self.score);
    }

    fn finish_with_loss(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.active = false;
        self.over = true;
        info!("Race lost ({:?}) with score {}", outcome, self.score);
    }

    /// Give every opponent a fresh speed; higher levels drive faster
    pub fn randomize_opponent_speeds<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.active {
            return;
        }
        let spread = 3.0 + self.level as f32;
        for car in &mut self.opponents {
            car.speed = 2.0 + rng.gen::<f32>() * spread;
        }
    }

    pub fn shift_opponent_lanes<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.active {
            return;
        }
        let chance = self.config.lane_change_chance;
        for car in &mut self.opponents {
            if rng.gen_bool(chance) {
                car.lane = car.lane.drift(rng);
            }
        }
    }

    /// Maybe drop a power-up at the start of the track. Returns its id.
    pub fn spawn_power_up<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u32> {
        if !self.active || !rng.gen_bool(self.config.spawn_chance) {
            return None;
        }
        let id = self.next_power_up_id;
        self.next_power_up_id += 1;

        let power_up = PowerUp::new(
            id,
            PowerUpKind::random(rng, self.config.speed_boost_chance),
            Lane::random(rng),
        );
        debug!(
            "Spawned {:?} power-up {} in the {:?} lane",
            power_up.kind, id, power_up.lane
        );
        self.power_ups.push(power_up);
        Some(id)
    }

    /// Scroll the road stripes toward the player
    pub fn scroll_road(&mut self) {
        if !self.active {
            return;
        }
        for mark in &mut self.road_markings {
            *mark -= 1.0;
            if *mark < 0.0 {
                *mark = ROAD_WRAP;
            }
        }
    }

    /// Get compact snapshot for IPC transfer
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status(),
            active: self.active,
            over: self.over,
            outcome: self.outcome,
            time_remaining: self.time_remaining,
            clock: format_clock(self.time_remaining),
            score: self.score,
            high_score: self.high_score,
            level: self.level,
            track_length: self.config.track_length,
            player: PlayerSnapshot::from(&self.player),
            opponents: self.opponents.iter().map(OpponentSnapshot::from).collect(),
            power_ups: self.power_ups.clone(),
            collision: self.collision,
            road_markings: self.road_markings,
        }
    }
}

/// Format seconds as `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Read-only view of a session for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub active: bool,
    pub over: bool,
    pub outcome: Option<Outcome>,
    pub time_remaining: u32,
    pub clock: String,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub track_length: f32,
    pub player: PlayerSnapshot,
    pub opponents: Vec<OpponentSnapshot>,
    pub power_ups: Vec<PowerUp>,
    pub collision: Option<CollisionEvent>,
    pub road_markings: [f32; 5],
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started() -> RaceSession {
        let mut session = RaceSession::new(RaceConfig::default());
        session.start();
        session
    }

    fn lone_opponent(position: f32, lane: Lane, speed: f32) -> Vec<OpponentCar> {
        vec![OpponentCar::new(1, position, speed, lane, CarType::Cyber)]
    }

    #[test]
    fn new_session_is_idle_until_started() {
        let mut session = RaceSession::new(RaceConfig::default());
        assert_eq!(session.status(), SessionStatus::Idle);

        session.tick();
        session.request_lane_change(Direction::Left);
        session.request_speed_change(1);
        assert_eq!(session.player.track_position, 0.0);
        assert_eq!(session.player.lane, Lane::Center);
        assert_eq!(session.player.speed, 5.0);

        session.start();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.opponents.len(), 2);
        assert_eq!(session.time_remaining, 120);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn positions_never_decrease_or_pass_the_finish() {
        let mut session = started();
        session.opponents = lone_opponent(0.0, Lane::Left, 9.0);
        session.player.lane = Lane::Right;
        session.player.speed = 10.0;

        let mut last_player = 0.0;
        let mut last_opponent = 0.0;
        while session.is_active() {
            session.tick();
            let opponent = session.opponents[0].track_position;
            assert!(session.player.track_position >= last_player);
            assert!(opponent >= last_opponent);
            assert!(session.player.track_position <= 90.0);
            assert!(opponent <= 90.0);
            last_player = session.player.track_position;
            last_opponent = opponent;
        }
        assert_eq!(session.outcome, Some(Outcome::PlayerWin));
    }

    #[test]
    fn speed_requests_stay_in_bounds() {
        let mut session = started();
        for _ in 0..50 {
            session.request_speed_change(1);
        }
        assert_eq!(session.player.speed, 10.0);
        for _ in 0..50 {
            session.request_speed_change(-1);
        }
        assert_eq!(session.player.speed, 2.0);
    }

    #[test]
    fn position_update_precedes_collision_check() {
        let mut session = started();
        session.opponents = lone_opponent(85.0, Lane::Center, 0.0);
        session.player.track_position = 76.0;
        session.player.speed = 10.0;

        // 77 vs 85: not yet in contact
        session.tick();
        assert!(session.is_active());

        // moves to 78 first, then 7 units apart is a hit in the same tick
        session.tick();
        assert_eq!(session.outcome, Some(Outcome::CollisionLoss));
        assert!(session.over);
        let event = session.collision.expect("collision recorded");
        assert!((event.position - 78.0).abs() < 1e-4);
        assert_eq!(event.lane, Lane::Center);
    }

    #[test]
    fn unshielded_collision_ends_race_once() {
        let mut session = started();
        session.opponents = lone_opponent(3.0, Lane::Center, 0.0);
        let score_before = session.score;

        session.tick();
        assert!(!session.is_active());
        assert_eq!(session.status(), SessionStatus::Ended(Outcome::CollisionLoss));
        assert_eq!(session.score, score_before + 1);

        let event = session.collision;
        session.tick();
        assert_eq!(session.collision, event);
        assert_eq!(session.score, score_before + 1);
    }

    #[test]
    fn crash_tick_still_collects_and_scores() {
        let mut session = started();
        session.opponents = lone_opponent(3.0, Lane::Center, 0.0);
        session.power_ups.push(PowerUp::new(1, PowerUpKind::SpeedBoost, Lane::Center));

        session.tick();
        assert_eq!(session.outcome, Some(Outcome::CollisionLoss));
        assert!(session.power_ups.is_empty());
        assert_eq!(session.player.speed, 7.0);
        assert_eq!(session.score, 51);
        assert_eq!(session.high_score, 0);
    }

    #[test]
    fn crash_on_the_finish_line_is_not_a_win() {
        let mut session = started();
        session.opponents = lone_opponent(88.0, Lane::Center, 0.0);
        session.player.track_position = 89.5;

        session.tick();
        assert_eq!(session.outcome, Some(Outcome::CollisionLoss));
        assert!(session.over);
        assert_eq!(session.score, 1);
    }

    #[test]
    fn shield_absorbs_one_collision() {
        let mut session = started();
        session.opponents = lone_opponent(3.0, Lane::Center, 0.0);
        session.player.shielded = true;

        session.tick();
        assert!(session.is_active());
        assert!(!session.player.shielded);
        assert!(session.collision.is_none());
        assert_eq!(session.score, 1);
    }

    #[test]
    fn shield_pickup_after_consumed_shield_in_same_tick() {
        let mut session = started();
        session.opponents = lone_opponent(3.0, Lane::Center, 0.0);
        session.player.shielded = true;
        session.power_ups.push(PowerUp {
            id: 9,
            kind: PowerUpKind::Shield,
            track_position: 0.0,
            lane: Lane::Center,
        });

        session.tick();
        assert!(session.is_active());
        assert!(session.player.shielded);
        assert!(session.power_ups.is_empty());
        assert_eq!(session.score, 100 + 1);
    }

    #[test]
    fn speed_boost_is_collected_once() {
        let mut session = started();
        session.opponents.clear();
        session.power_ups.push(PowerUp {
            id: 1,
            kind: PowerUpKind::SpeedBoost,
            track_position: 1.0,
            lane: Lane::Center,
        });

        for _ in 0..5 {
            session.tick();
        }
        assert!(session.power_ups.is_empty());
        assert_eq!(session.player.speed, 7.0);
        assert_eq!(session.score, 50 + 5);
    }

    #[test]
    fn speed_boost_caps_at_max() {
        let mut session = started();
        session.opponents.clear();
        session.player.speed = 9.0;
        session.power_ups.push(PowerUp::new(1, PowerUpKind::SpeedBoost, Lane::Center));

        session.tick();
        assert_eq!(session.player.speed, 10.0);
    }

    #[test]
    fn power_ups_in_other_lanes_scroll_off() {
        let mut session = started();
        session.opponents.clear();
        session.power_ups.push(PowerUp {
            id: 1,
            kind: PowerUpKind::Shield,
            track_position: 99.8,
            lane: Lane::Left,
        });
        session.tick();
        assert!(session.power_ups.is_empty());
        assert!(!session.player.shielded);
    }

    #[test]
    fn finishing_first_wins_and_records_high_score() {
        let mut session = started();
        session.opponents = lone_opponent(10.0, Lane::Left, 2.0);
        session.player.track_position = 89.5;
        session.score = 200;

        session.tick();
        assert_eq!(session.outcome, Some(Outcome::PlayerWin));
        assert!(!session.over);
        assert_eq!(session.score, 200 + 1 + 1000);
        assert_eq!(session.high_score, 1201);
    }

    #[test]
    fn opponent_finishing_first_loses_the_race() {
        let mut session = started();
        session.opponents = lone_opponent(89.8, Lane::Left, 5.0);

        session.tick();
        assert_eq!(session.outcome, Some(Outcome::TimeoutLoss));
        assert!(session.over);
        assert_eq!(session.high_score, 0);
    }

    #[test]
    fn clock_expiry_player_ahead_wins() {
        let mut session = started();
        session.opponents = lone_opponent(30.0, Lane::Left, 3.0);
        session.player.track_position = 31.0;
        session.time_remaining = 1;

        session.tick_clock();
        assert_eq!(session.time_remaining, 0);
        assert!(!session.is_active());
        assert_eq!(session.outcome, Some(Outcome::PlayerWin));
        assert_eq!(session.score, 500);
        assert_eq!(session.high_score, 500);
    }

    #[test]
    fn clock_expiry_tie_is_a_loss() {
        let mut session = started();
        session.opponents = vec![
            OpponentCar::new(1, 10.0, 3.0, Lane::Left, CarType::Cyber),
            OpponentCar::new(2, 42.0, 3.0, Lane::Right, CarType::Truck),
        ];
        session.player.track_position = 42.0;
        session.time_remaining = 1;

        session.tick_clock();
        assert_eq!(session.time_remaining, 0);
        assert_eq!(session.outcome, Some(Outcome::TimeoutLoss));
        assert!(session.over);
    }

    #[test]
    fn clock_counts_down_without_resolving() {
        let mut session = started();
        session.tick_clock();
        session.tick_clock();
        assert_eq!(session.time_remaining, 118);
        assert!(session.is_active());
        assert_eq!(session.snapshot().clock, "01:58");
    }

    #[test]
    fn next_level_requires_a_win() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = started();
        assert!(!session.next_level(&mut rng));

        session.opponents = lone_opponent(3.0, Lane::Center, 0.0);
        session.tick();
        assert_eq!(session.outcome, Some(Outcome::CollisionLoss));
        assert!(!session.next_level(&mut rng));
        assert_eq!(session.level, 1);
    }

    #[test]
    fn next_level_keeps_score_and_adds_opponents_up_to_cap() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = started();

        for expected_cars in [3, 4, 4] {
            session.opponents.iter_mut().for_each(|c| c.lane = Lane::Left);
            session.player.lane = Lane::Right;
            session.player.track_position = 89.9;
            session.tick();
            assert_eq!(session.outcome, Some(Outcome::PlayerWin));
            let score = session.score;

            assert!(session.next_level(&mut rng));
            assert!(session.is_active());
            assert_eq!(session.score, score);
            assert_eq!(session.opponents.len(), expected_cars);
            assert_eq!(session.player.track_position, 0.0);
            assert_eq!(session.time_remaining, 120);
            assert!(session.collision.is_none());
            for car in &session.opponents {
                assert_eq!(car.track_position, car.start_position);
            }
        }
        assert_eq!(session.level, 4);
        let ids: Vec<u32> = session.opponents.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[test]
    fn restart_resets_score_but_keeps_high_score() {
        let mut session = started();
        session.opponents.clear();
        session.player.track_position = 89.9;
        session.tick();
        let best = session.high_score;
        assert!(best > 0);

        session.start();
        assert_eq!(session.score, 0);
        assert_eq!(session.high_score, best);
        assert_eq!(session.opponents.len(), 2);
        assert!(session.outcome.is_none());
    }

    #[test]
    fn randomized_speeds_scale_with_level() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = started();
        session.level = 2;
        for _ in 0..100 {
            session.randomize_opponent_speeds(&mut rng);
            for car in &session.opponents {
                assert!(car.speed >= 2.0 && car.speed < 7.0);
            }
        }
    }

    #[test]
    fn lanes_hold_when_change_chance_is_zero() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = started();
        session.config.lane_change_chance = 0.0;
        for _ in 0..50 {
            session.shift_opponent_lanes(&mut rng);
        }
        let lanes: Vec<Lane> = session.opponents.iter().map(|c| c.lane).collect();
        assert_eq!(lanes, vec![Lane::Left, Lane::Right]);
    }

    #[test]
    fn every_opponent_shifts_one_step_when_change_is_certain() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = started();
        session.config.lane_change_chance = 1.0;
        session.opponents = vec![
            OpponentCar::new(1, 10.0, 3.0, Lane::Left, CarType::Cyber),
            OpponentCar::new(2, 20.0, 3.0, Lane::Center, CarType::Truck),
            OpponentCar::new(3, 30.0, 3.0, Lane::Right, CarType::Cyber),
        ];

        session.shift_opponent_lanes(&mut rng);
        assert_eq!(session.opponents[0].lane, Lane::Center);
        assert_ne!(session.opponents[1].lane, Lane::Center);
        assert_eq!(session.opponents[2].lane, Lane::Center);
    }

    #[test]
    fn lane_changes_follow_the_configured_chance() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut session = started();
        session.opponents = lone_opponent(10.0, Lane::Left, 3.0);

        let mut moved = 0;
        for _ in 0..2000 {
            session.opponents[0].lane = Lane::Left;
            session.shift_opponent_lanes(&mut rng);
            if session.opponents[0].lane != Lane::Left {
                moved += 1;
            }
        }
        // 20% of 2000 is 400
        assert!((300..500).contains(&moved), "moved {moved} times");
    }

    #[test]
    fn randomizers_do_nothing_unless_active() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut session = RaceSession::new(RaceConfig {
            lane_change_chance: 1.0,
            spawn_chance: 1.0,
            ..RaceConfig::default()
        });

        let idle_and_ended = |session: &mut RaceSession, rng: &mut StdRng| {
            let lanes: Vec<Lane> = session.opponents.iter().map(|c| c.lane).collect();
            let speeds: Vec<f32> = session.opponents.iter().map(|c| c.speed).collect();
            session.randomize_opponent_speeds(rng);
            session.shift_opponent_lanes(rng);
            assert_eq!(session.spawn_power_up(rng), None);
            assert_eq!(
                session.opponents.iter().map(|c| c.lane).collect::<Vec<_>>(),
                lanes
            );
            assert_eq!(
                session.opponents.iter().map(|c| c.speed).collect::<Vec<_>>(),
                speeds
            );
            assert!(session.power_ups.is_empty());
        };

        idle_and_ended(&mut session, &mut rng);

        session.start();
        session.opponents = lone_opponent(3.0, Lane::Center, 0.0);
        session.tick();
        assert_eq!(session.outcome, Some(Outcome::CollisionLoss));
        idle_and_ended(&mut session, &mut rng);
    }

    #[test]
    fn spawned_power_ups_start_at_the_line() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut session = started();
        let mut spawned = 0;
        for _ in 0..200 {
            if session.spawn_power_up(&mut rng).is_some() {
                spawned += 1;
            }
        }
        assert!(spawned > 0 && spawned < 200);
        assert_eq!(session.power_ups.len(), spawned);
        assert!(session.power_ups.iter().all(|p| p.track_position == 0.0));

        let mut ids: Vec<u32> = session.power_ups.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), spawned);
    }

    #[test]
    fn road_markings_wrap() {
        let mut session = started();
        session.scroll_road();
        assert_eq!(session.road_markings, [100.0, 19.0, 39.0, 59.0, 79.0]);
    }

    #[test]
    fn snapshot_serializes_for_the_frontend() {
        let session = started();
        let json = serde_json::to_value(session.snapshot()).expect("serialize snapshot");
        assert_eq!(json["status"]["state"], "active");
        assert_eq!(json["player"]["lane"], "center");
        assert_eq!(json["clock"], "02:00");
        assert_eq!(json["opponents"][1]["car_type"], "truck");
    }
}
