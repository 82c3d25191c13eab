//! # Simulation Configuration
//!
//! Pool and pipeline tunables, loadable from TOML. Every field has a
//! default so a partial file (or an empty one) is valid.
//!
//! ```toml
//! [pool]
//! capacity = 5000
//! reclaim_margin = 10
//! reclaim_order = ["expiring_debris", "perishable_fireballs", "stale_weapons", "weapons"]
//! network_role = "server"
//!
//! [pipeline]
//! collision_enabled = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use orbital_shared::{DEFAULT_SHIELD_SECTIONS, MAX_OBJECTS, RECLAIM_MARGIN};

use crate::diagnostics::InvariantPolicy;
use crate::error::{ObjectError, ObjectResult};

/// What this process is in a networked game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRole {
    /// Single player.
    #[default]
    Standalone,
    /// Multiplayer host.
    Server,
    /// Multiplayer client.
    Client,
}

impl NetworkRole {
    /// True for either side of a multiplayer game.
    #[inline]
    #[must_use]
    pub const fn is_multiplayer(self) -> bool {
        !matches!(self, Self::Standalone)
    }
}

/// One stage of pressure-driven slot reclamation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclaimStage {
    /// Debris its owner flagged as expiring.
    ExpiringDebris,
    /// Fireballs its owner flagged as perishable.
    PerishableFireballs,
    /// Weapons the collision subsystem considers stale.
    StaleWeapons,
    /// Any remaining weapon.
    Weapons,
}

impl ReclaimStage {
    /// Cheapest losses first.
    pub const DEFAULT_ORDER: [Self; 4] = [
        Self::ExpiringDebris,
        Self::PerishableFireballs,
        Self::StaleWeapons,
        Self::Weapons,
    ];
}

/// Object pool settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of slots.
    pub capacity: usize,
    /// Reclamation starts once this few slots remain.
    pub reclaim_margin: usize,
    /// Shield quadrants given to every new object.
    pub default_shield_sections: usize,
    /// Reclamation stage order.
    pub reclaim_order: Vec<ReclaimStage>,
    /// What happens on a contract violation.
    pub invariant_policy: InvariantPolicy,
    /// Network role; changes ghost and player-flag rules.
    pub network_role: NetworkRole,
    /// Mission editor: player ships are deleted instead of ghosted and
    /// docked objects always follow their parent.
    pub editor_mode: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_OBJECTS,
            reclaim_margin: RECLAIM_MARGIN,
            default_shield_sections: DEFAULT_SHIELD_SECTIONS,
            reclaim_order: ReclaimStage::DEFAULT_ORDER.to_vec(),
            invariant_policy: InvariantPolicy::default(),
            network_role: NetworkRole::Standalone,
            editor_mode: false,
        }
    }
}

impl PoolConfig {
    /// Pool of `capacity` slots, everything else default.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Same settings with a different reclaim margin.
    #[must_use]
    pub fn with_reclaim_margin(mut self, margin: usize) -> Self {
        self.reclaim_margin = margin;
        self
    }

    /// Checks the settings a pool cannot run with.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidConfig`] for a zero or oversized capacity, a
    /// margin that leaves no usable slots, or a reclaim order naming a
    /// stage twice.
    pub fn validate(&self) -> ObjectResult<()> {
        if self.capacity == 0 {
            return Err(ObjectError::InvalidConfig(
                "pool capacity must be greater than zero".into(),
            ));
        }
        if self.capacity > (u32::MAX - 3) as usize {
            return Err(ObjectError::InvalidConfig(format!(
                "pool capacity {} exceeds the slot index range",
                self.capacity
            )));
        }
        if self.reclaim_margin >= self.capacity {
            return Err(ObjectError::InvalidConfig(format!(
                "reclaim margin {} must be below capacity {}",
                self.reclaim_margin, self.capacity
            )));
        }
        for (i, stage) in self.reclaim_order.iter().enumerate() {
            if self.reclaim_order[..i].contains(stage) {
                return Err(ObjectError::InvalidConfig(format!(
                    "reclaim stage {stage:?} listed twice"
                )));
            }
        }
        Ok(())
    }
}

/// Frame pipeline switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run the collision pass.
    pub collision_enabled: bool,
    /// Skip physics integration for every object.
    pub physics_paused: bool,
    /// Pin positions and velocities to the y = 0 plane after integration.
    pub planar: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collision_enabled: true,
            physics_paused: false,
            planar: false,
        }
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Pool settings.
    pub pool: PoolConfig,
    /// Pipeline settings.
    pub pipeline: PipelineConfig,
}

impl SimConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidConfig`] on a parse or validation failure.
    pub fn from_toml_str(text: &str) -> ObjectResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ObjectError::InvalidConfig(e.to_string()))?;
        config.pool.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ObjectError::InvalidConfig`] if the file cannot be read or is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ObjectResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ObjectError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            capacity = config.pool.capacity,
            "simulation config loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.pool.capacity, 5000);
        assert_eq!(config.pool.reclaim_margin, 10);
        assert_eq!(config.pool.reclaim_order, ReclaimStage::DEFAULT_ORDER.to_vec());
        assert!(config.pipeline.collision_enabled);
        assert!(!config.pool.network_role.is_multiplayer());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = SimConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let text = r#"
            [pool]
            capacity = 64
            network_role = "server"
            reclaim_order = ["weapons", "expiring_debris"]

            [pipeline]
            planar = true
        "#;
        let config = SimConfig::from_toml_str(text).unwrap();

        assert_eq!(config.pool.capacity, 64);
        assert_eq!(config.pool.reclaim_margin, 10);
        assert_eq!(config.pool.network_role, NetworkRole::Server);
        assert_eq!(
            config.pool.reclaim_order,
            vec![ReclaimStage::Weapons, ReclaimStage::ExpiringDebris]
        );
        assert!(config.pipeline.planar);
        assert!(config.pipeline.collision_enabled);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SimConfig::from_toml_str("[pool]\ncapacity = 0"),
            Err(ObjectError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("[pool]\nreclaim_order = [\"weapons\", \"weapons\"]"),
            Err(ObjectError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("[pool]\ncapacity = 8\nreclaim_margin = 8"),
            Err(ObjectError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("[pool]\ncapacity = \"lots\""),
            Err(ObjectError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = SimConfig::from_toml_file("/nonexistent/orbital.toml");
        assert!(matches!(result, Err(ObjectError::InvalidConfig(_))));
    }
}
