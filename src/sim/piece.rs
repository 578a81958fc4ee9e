//! Fruit pieces and position-based Verlet integration
//!
//! A piece carries no velocity; motion is implied by the difference between
//! its current and previous positions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tier::{Tier, TierTable};
use crate::consts::VERTICAL_DAMPING;

/// A single fruit in the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    tier: Tier,
    radius: f32,
    pub pos: Vec2,
    pub prev_pos: Vec2,
    /// Force accumulated since the last integration step
    #[serde(skip)]
    pub force: Vec2,
    settled: bool,
}

impl Piece {
    /// Create a piece at rest at `pos`
    pub fn new(id: u32, tier: Tier, pos: Vec2, tiers: &TierTable) -> Self {
        Self {
            id,
            tier,
            radius: tiers.radius(tier),
            pos,
            prev_pos: pos,
            force: Vec2::ZERO,
            settled: false,
        }
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// True once the piece has touched the floor, the right wall or another piece
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// One-way: a settled piece stays settled
    #[inline]
    pub fn mark_settled(&mut self) {
        self.settled = true;
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Advance one step with the accumulated force, then clear it.
    ///
    /// Vertical motion is damped relative to the previous position, which
    /// stands in for an inelastic bounce. `dt` must be positive; other values
    /// give meaningless positions.
    pub fn integrate(&mut self, dt: f32) {
        let mut next = 2.0 * self.pos - self.prev_pos + self.force * dt * dt;
        next.y = self.prev_pos.y + (next.y - self.prev_pos.y) * VERTICAL_DAMPING;

        self.prev_pos = self.pos;
        self.pos = next;
        self.force = Vec2::ZERO;
    }

    /// Displacement over the last step
    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.pos - self.prev_pos
    }

    /// Highest point of the piece (screen space, +y down)
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    /// Strict overlap; touching pieces do not collide
    pub fn overlaps(&self, other: &Piece) -> bool {
        self.pos.distance(other.pos) < self.radius + other.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn tiers() -> TierTable {
        TierTable::from_config(&GameConfig::default()).unwrap()
    }

    #[test]
    fn test_new_piece_is_at_rest() {
        let piece = Piece::new(1, Tier(2), Vec2::new(10.0, 20.0), &tiers());
        assert_eq!(piece.radius(), 45.0);
        assert_eq!(piece.pos, piece.prev_pos);
        assert!(!piece.is_settled());
    }

    #[test]
    fn test_integrate_from_rest_under_gravity() {
        let mut piece = Piece::new(1, Tier(0), Vec2::new(100.0, 100.0), &tiers());
        let dt = 0.1;
        piece.apply_force(Vec2::new(0.0, 900.0));
        piece.integrate(dt);

        // next.y = 100 + 900 * 0.01 = 109, damped toward prev: 100 + 9 * 0.99
        assert!((piece.pos.y - 108.91).abs() < 1e-3);
        assert_eq!(piece.pos.x, 100.0);
        assert_eq!(piece.prev_pos, Vec2::new(100.0, 100.0));
        assert_eq!(piece.force, Vec2::ZERO);
    }

    #[test]
    fn test_horizontal_motion_is_not_damped() {
        let mut piece = Piece::new(1, Tier(0), Vec2::new(100.0, 100.0), &tiers());
        piece.prev_pos = Vec2::new(90.0, 100.0);
        piece.integrate(1.0 / 60.0);
        assert!((piece.pos.x - 110.0).abs() < 1e-4);
        assert!((piece.displacement().x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_velocity_decays() {
        let mut piece = Piece::new(1, Tier(0), Vec2::new(0.0, 100.0), &tiers());
        piece.prev_pos = Vec2::new(0.0, 90.0);
        piece.integrate(1.0 / 60.0);
        // Damping spans two steps of travel: 90 + 20 * 0.99 = 109.8
        assert!((piece.pos.y - 109.8).abs() < 1e-3);
        assert!(piece.displacement().y < 10.0);
    }

    #[test]
    fn test_forces_accumulate_until_integrated() {
        let mut piece = Piece::new(1, Tier(0), Vec2::ZERO, &tiers());
        piece.apply_force(Vec2::new(1.0, 2.0));
        piece.apply_force(Vec2::new(3.0, 4.0));
        assert_eq!(piece.force, Vec2::new(4.0, 6.0));
        piece.integrate(1.0);
        assert_eq!(piece.force, Vec2::ZERO);
    }

    #[test]
    fn test_overlap_is_strict() {
        let t = tiers();
        let a = Piece::new(1, Tier(0), Vec2::new(0.0, 0.0), &t);
        let touching = Piece::new(2, Tier(0), Vec2::new(50.0, 0.0), &t);
        let close = Piece::new(3, Tier(0), Vec2::new(49.0, 0.0), &t);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&close));
    }
}
