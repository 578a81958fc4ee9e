//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only enters through the `dt` handed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (pieces keep insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod container;
pub mod piece;
pub mod state;
pub mod tick;
pub mod tier;

pub use collision::{CollisionResult, MergeOutcome, resolve_collisions, separate};
pub use container::Container;
pub use piece::Piece;
pub use state::{GameEvent, GamePhase, GameState, PieceView, SessionClock, Snapshot};
pub use tick::{DropRequest, TickInput, tick};
pub use tier::{DROPPABLE_TIERS, Tier, TierTable};
