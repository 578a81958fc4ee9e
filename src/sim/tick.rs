//! Per-frame simulation tick
//!
//! One tick per rendered frame. `dt` is the wall-clock time since the last
//! frame, already clamped by the caller's frame limiter; the simulation keeps
//! no clock of its own beyond summing these deltas.

use super::state::GameState;

/// A drop request from the player (screen coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropRequest {
    pub x: f32,
    pub y: f32,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drop the next piece (click/tap)
    pub drop: Option<DropRequest>,
    /// Leave the session
    pub quit: bool,
}

/// Advance the session by one frame.
///
/// Order: quit, clock, drop, gravity and integration with boundary clamping,
/// piece collisions, loss check. Does nothing once the session is lost or
/// quit, so a tick is never observed half-applied.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.quit {
        state.quit();
    }
    if !state.is_active() {
        return;
    }

    state.time_ticks += 1;
    state.clock.advance(dt);

    if let Some(req) = input.drop {
        state.request_drop(req.x, req.y);
    }

    state.step_pieces(dt);
    state.resolve_collisions();
    state.check_loss();
}
