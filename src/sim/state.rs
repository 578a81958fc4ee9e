//! Session state
//!
//! Everything one game needs between ticks: the live pieces, score, next
//! piece, phase, the session clock and the seeded RNG.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionResult, MergeOutcome, resolve_collisions};
use super::container::Container;
use super::piece::Piece;
use super::tier::{Tier, TierTable};
use crate::config::{ConfigError, GameConfig};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pieces are falling and drops are accepted
    Playing,
    /// A settled piece reached the loss line; terminal for this session
    Lost,
}

/// Notifications for collaborators (audio, effects, persistence)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Dropped { tier: Tier, x: f32, id: u32 },
    Merged { from: Tier, into: Tier, pos: Vec2, id: u32 },
    Annihilated { tier: Tier, pos: Vec2 },
    Lost { final_score: u64 },
}

impl From<MergeOutcome> for GameEvent {
    fn from(outcome: MergeOutcome) -> Self {
        match outcome {
            MergeOutcome::Merged {
                from,
                into,
                pos,
                id,
            } => GameEvent::Merged {
                from,
                into,
                pos,
                id,
            },
            MergeOutcome::Annihilated { tier, pos } => GameEvent::Annihilated { tier, pos },
        }
    }
}

/// Wall-clock bookkeeping for the drop cooldown
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionClock {
    /// Seconds since the session started, summed from tick deltas
    pub elapsed: f64,
    /// `elapsed` at the last honoured drop
    pub last_drop: Option<f64>,
}

impl SessionClock {
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt as f64;
    }

    /// True if a drop may be honoured now
    pub fn drop_ready(&self, cooldown: f64) -> bool {
        match self.last_drop {
            Some(t) => self.elapsed - t >= cooldown,
            None => true,
        }
    }
}

/// Read-only view of one piece for renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceView {
    pub id: u32,
    pub tier: Tier,
    pub pos: Vec2,
    pub radius: f32,
}

/// Read-only view of the session for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pieces: Vec<PieceView>,
    pub score: u64,
    pub next_tier: Tier,
    pub next_radius: f32,
    pub phase: GamePhase,
    pub container: Container,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the session RNG was created from
    pub seed: u64,
    pub tiers: TierTable,
    pub container: Container,
    /// Downward acceleration applied to every piece each tick
    pub gravity: Vec2,
    pub drop_cooldown: f64,
    /// Score (never decreases within a session)
    pub score: u64,
    /// Tier of the next dropped piece
    pub next_tier: Tier,
    pub phase: GamePhase,
    /// Cleared when the player quits
    pub running: bool,
    pub clock: SessionClock,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Live pieces
    pub pieces: Vec<Piece>,
    events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new session. Fails if the configuration is unusable.
    pub fn new(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        let tiers = TierTable::from_config(config)?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_tier = Tier(rng.random_range(0..tiers.droppable_count()) as u8);

        Ok(Self {
            seed,
            container: Container::from_config(&config.container),
            gravity: Vec2::new(0.0, config.gravity),
            drop_cooldown: config.drop_cooldown,
            tiers,
            score: 0,
            next_tier,
            phase: GamePhase::Playing,
            running: true,
            clock: SessionClock::default(),
            time_ticks: 0,
            pieces: Vec::new(),
            events: Vec::new(),
            rng,
            next_id: 1,
        })
    }

    /// Replace the whole session with a fresh one using the same configuration
    pub fn restart(&mut self, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_tier = Tier(rng.random_range(0..self.tiers.droppable_count()) as u8);
        *self = Self {
            seed,
            tiers: self.tiers.clone(),
            container: self.container,
            gravity: self.gravity,
            drop_cooldown: self.drop_cooldown,
            score: 0,
            next_tier,
            phase: GamePhase::Playing,
            running: true,
            clock: SessionClock::default(),
            time_ticks: 0,
            pieces: Vec::new(),
            events: Vec::new(),
            rng,
            next_id: 1,
        };
        log::info!("Session restarted with seed {}", seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// True while ticks still advance the simulation
    pub fn is_active(&self) -> bool {
        self.running && self.phase == GamePhase::Playing
    }

    /// Stop the session at the player's request
    pub fn quit(&mut self) {
        if self.running {
            log::info!("Session quit with score {}", self.score);
        }
        self.running = false;
    }

    /// Drop the next piece at `x` if the request is allowed.
    ///
    /// The request is ignored when the session is not active, the cooldown
    /// has not elapsed, or `y` is not above the container. Returns the id of
    /// the spawned piece.
    pub fn request_drop(&mut self, x: f32, y: f32) -> Option<u32> {
        if !self.is_active() || !self.clock.drop_ready(self.drop_cooldown) {
            return None;
        }
        if !self.container.is_above(y) {
            log::debug!("Drop ignored: y={} is not above the container", y);
            return None;
        }

        let tier = self.next_tier;
        let x = self.container.clamp_drop_x(x, self.tiers.radius(tier));
        let id = self.next_entity_id();
        let piece = Piece::new(id, tier, Vec2::new(x, self.container.top), &self.tiers);
        self.pieces.push(piece);

        let idx = self.rng.random_range(0..self.tiers.droppable_count());
        self.next_tier = Tier(idx as u8);
        self.clock.last_drop = Some(self.clock.elapsed);
        self.events.push(GameEvent::Dropped { tier, x, id });
        log::debug!("Dropped {:?} at x={} (next {:?})", tier, x, self.next_tier);

        Some(id)
    }

    /// Add points; the score only moves up
    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Apply gravity, integrate and clamp every piece
    pub fn step_pieces(&mut self, dt: f32) {
        for piece in &mut self.pieces {
            piece.apply_force(self.gravity);
            piece.integrate(dt);
            self.container.constrain(piece);
        }
    }

    /// Run the collision pass, bank its points and queue its events
    pub fn resolve_collisions(&mut self) -> CollisionResult {
        let next_id = &mut self.next_id;
        let result = resolve_collisions(&mut self.pieces, &self.tiers, || {
            let id = *next_id;
            *next_id += 1;
            id
        });
        self.award(result.points);
        self.events
            .extend(result.outcomes.iter().copied().map(GameEvent::from));
        result
    }

    /// Move to `Lost` if any settled piece reaches the loss line
    pub fn check_loss(&mut self) -> bool {
        if self.phase == GamePhase::Lost {
            return true;
        }
        let line = self.container.loss_line_y();
        let lost = self
            .pieces
            .iter()
            .any(|p| p.is_settled() && p.top() <= line);
        if lost {
            self.phase = GamePhase::Lost;
            self.events.push(GameEvent::Lost {
                final_score: self.score,
            });
            log::info!(
                "Game over after {} ticks with score {}",
                self.time_ticks,
                self.score
            );
        }
        lost
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self
                .pieces
                .iter()
                .map(|p| PieceView {
                    id: p.id,
                    tier: p.tier(),
                    pos: p.pos,
                    radius: p.radius(),
                })
                .collect(),
            score: self.score,
            next_tier: self.next_tier,
            next_radius: self.tiers.radius(self.next_tier),
            phase: self.phase,
            container: self.container,
        }
    }
}
