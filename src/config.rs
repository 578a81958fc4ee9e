//! Game configuration
//!
//! Container geometry, the tier table and physics constants. Loaded from JSON
//! (missing fields fall back to the reference configuration) and validated
//! once when a session is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File system error
    Io(std::io::Error),
    /// Malformed JSON
    Json(serde_json::Error),
    /// The tier table has no entries
    EmptyTierTable,
    /// A tier entry is unusable
    InvalidTier { index: usize, reason: String },
    /// Container geometry is unusable
    InvalidContainer(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::EmptyTierTable => write!(f, "Tier table is empty"),
            ConfigError::InvalidTier { index, reason } => {
                write!(f, "Invalid tier {}: {}", index, reason)
            }
            ConfigError::InvalidContainer(msg) => write!(f, "Invalid container: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// One entry of the tier table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierDef {
    /// Piece diameter (pixels)
    pub diameter: f32,
    /// Points awarded when a piece of this tier is merged away or annihilated
    pub score: u64,
}

/// Container placement and size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Top-left corner of the container's outer box
    pub anchor: [f32; 2],
    /// Side wall and floor thickness
    pub wall_thickness: f32,
    /// Distance between the inner faces of the side walls
    pub inner_width: f32,
    /// Distance between the container top and the inner face of the floor
    pub inner_height: f32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            anchor: [CONTAINER_X, CONTAINER_Y],
            wall_thickness: WALL_THICKNESS,
            inner_width: INNER_WIDTH,
            inner_height: INNER_HEIGHT,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub container: ContainerConfig,
    /// Ordered tier table, smallest first; the last tier is terminal
    pub tiers: Vec<TierDef>,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Minimum wall-clock time between honoured drops (seconds)
    pub drop_cooldown: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            container: ContainerConfig::default(),
            tiers: TIER_DIAMETERS
                .iter()
                .zip(TIER_SCORES)
                .map(|(&diameter, score)| TierDef { diameter, score })
                .collect(),
            gravity: GRAVITY,
            drop_cooldown: DROP_COOLDOWN,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded config from {} ({} tiers)",
            path.display(),
            config.tiers.len()
        );
        Ok(config)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::EmptyTierTable);
        }

        let mut prev_diameter = 0.0;
        for (index, tier) in self.tiers.iter().enumerate() {
            if !tier.diameter.is_finite() || tier.diameter <= 0.0 {
                return Err(ConfigError::InvalidTier {
                    index,
                    reason: format!("diameter must be positive, got {}", tier.diameter),
                });
            }
            if tier.diameter <= prev_diameter {
                return Err(ConfigError::InvalidTier {
                    index,
                    reason: format!(
                        "diameter {} is not larger than the previous tier ({})",
                        tier.diameter, prev_diameter
                    ),
                });
            }
            prev_diameter = tier.diameter;
        }

        let c = &self.container;
        if !(c.wall_thickness >= 0.0) {
            return Err(ConfigError::InvalidContainer(format!(
                "wall thickness must be non-negative, got {}",
                c.wall_thickness
            )));
        }
        if !(c.inner_width > 0.0 && c.inner_height > 0.0) {
            return Err(ConfigError::InvalidContainer(format!(
                "interior must have positive size, got {}x{}",
                c.inner_width, c.inner_height
            )));
        }
        if prev_diameter > c.inner_width {
            return Err(ConfigError::InvalidContainer(format!(
                "largest tier ({}) does not fit the interior width ({})",
                prev_diameter, c.inner_width
            )));
        }
        if !(self.drop_cooldown >= 0.0) {
            return Err(ConfigError::InvalidContainer(format!(
                "drop cooldown must be non-negative, got {}",
                self.drop_cooldown
            )));
        }

        Ok(())
    }
}
