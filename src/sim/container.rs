//! Container geometry and boundary resolution
//!
//! The container is open at the top: pieces are clamped against the two side
//! walls and the floor only.

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use crate::config::ContainerConfig;
use crate::consts::WALL_VERTICAL_DAMPING;

/// Interior of the container in screen space (+y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Inner face of the left wall
    pub left: f32,
    /// Inner face of the right wall
    pub right: f32,
    /// Top edge of the interior; also the loss line
    pub top: f32,
    /// Inner face of the floor
    pub floor: f32,
    pub wall_thickness: f32,
}

impl Container {
    pub fn from_config(config: &ContainerConfig) -> Self {
        let [x, y] = config.anchor;
        let left = x + config.wall_thickness;
        Self {
            left,
            right: left + config.inner_width,
            top: y,
            floor: y + config.inner_height,
            wall_thickness: config.wall_thickness,
        }
    }

    #[inline]
    pub fn inner_width(&self) -> f32 {
        self.right - self.left
    }

    /// A settled piece whose top edge reaches this line ends the game
    #[inline]
    pub fn loss_line_y(&self) -> f32 {
        self.top
    }

    /// Clamp a drop coordinate so a piece of `radius` fits between the walls
    pub fn clamp_drop_x(&self, x: f32, radius: f32) -> f32 {
        x.clamp(self.left + radius, self.right - radius)
    }

    /// True when `y` lies above the container's top edge
    #[inline]
    pub fn is_above(&self, y: f32) -> bool {
        y < self.top
    }

    /// Push a piece back inside the side walls and floor.
    ///
    /// Left, right and floor are checked in that order and independently, so
    /// a piece in a corner is corrected twice. Touching the right wall or the
    /// floor settles the piece; touching the left wall does not.
    pub fn constrain(&self, piece: &mut Piece) {
        let r = piece.radius();

        if piece.pos.x - r < self.left {
            piece.pos.x = self.left + r;
            piece.prev_pos.x = piece.pos.x;
            piece.prev_pos.y += (piece.pos.y - piece.prev_pos.y) * WALL_VERTICAL_DAMPING;
        }

        if piece.pos.x + r > self.right {
            piece.pos.x = self.right - r;
            piece.prev_pos.x = piece.pos.x;
            piece.prev_pos.y += (piece.pos.y - piece.prev_pos.y) * WALL_VERTICAL_DAMPING;
            piece.mark_settled();
        }

        if piece.pos.y + r > self.floor {
            piece.pos.y = self.floor - r;
            piece.prev_pos.y = piece.pos.y;
            piece.mark_settled();
        }
    }
}
