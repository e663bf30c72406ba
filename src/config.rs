use std::path::Path;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Parameters for one generation pass.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Level size in cells; Y is the number of floors
    pub size: IVec3,
    pub room_count: usize,
    /// Inclusive range for box room sizes
    pub room_min_size: IVec3,
    pub room_max_size: IVec3,
    /// Chance for each non-tree candidate edge to get a hallway anyway
    pub extra_hallway_chance: f64,
    /// Consecutive failed placements before giving up on more rooms
    pub max_placement_attempts: u32,
    /// Fixed seed for reproducible output; entropy when absent
    pub seed: Option<u64>,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            size: IVec3::new(DUNGEON_DEFAULT_WIDTH, DUNGEON_DEFAULT_HEIGHT, DUNGEON_DEFAULT_DEPTH),
            room_count: DUNGEON_DEFAULT_ROOM_COUNT,
            room_min_size: IVec3::from_array(DUNGEON_ROOM_MIN_SIZE),
            room_max_size: IVec3::from_array(DUNGEON_ROOM_MAX_SIZE),
            extra_hallway_chance: DUNGEON_EXTRA_HALLWAY_CHANCE,
            max_placement_attempts: DUNGEON_MAX_PLACEMENT_ATTEMPTS,
            seed: None,
        }
    }
}

impl DungeonConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Extra cells a room keeps free around itself: one on each side in X
    /// and Z, one below.
    pub fn room_buffer() -> (IVec3, IVec3) {
        let b = DUNGEON_ROOM_BUFFER;
        (IVec3::splat(-b), IVec3::new(2 * b, b, 2 * b))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });

        if self.size.cmple(IVec3::ZERO).any() {
            return invalid("size", format!("every axis must be positive, got {}", self.size));
        }
        if self.room_min_size.cmple(IVec3::ZERO).any() {
            return invalid(
                "room_min_size",
                format!("every axis must be positive, got {}", self.room_min_size),
            );
        }
        if self.room_min_size.cmpgt(self.room_max_size).any() {
            return invalid(
                "room_max_size",
                format!("{} is smaller than room_min_size {}", self.room_max_size, self.room_min_size),
            );
        }
        let (_, grow) = Self::room_buffer();
        let smallest = self.room_min_size + grow;
        if smallest.cmpgt(self.size).any() {
            return invalid(
                "room_min_size",
                format!("a {} room with its buffer does not fit a {} level", self.room_min_size, self.size),
            );
        }
        if !(0.0..=1.0).contains(&self.extra_hallway_chance) {
            return invalid(
                "extra_hallway_chance",
                format!("must be within [0, 1], got {}", self.extra_hallway_chance),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DungeonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size, IVec3::new(40, 6, 40));
        assert_eq!(config.room_count, 12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DungeonConfig::from_json_str(r#"{ "room_count": 3, "seed": 7 }"#).unwrap();
        assert_eq!(config.room_count, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.size, DungeonConfig::default().size);
    }

    #[test]
    fn test_vectors_parse_as_arrays() {
        let config = DungeonConfig::from_json_str(r#"{ "size": [20, 3, 20] }"#).unwrap();
        assert_eq!(config.size, IVec3::new(20, 3, 20));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            (r#"{ "size": [0, 6, 40] }"#, "size"),
            (r#"{ "room_min_size": [3, 1, 3], "room_max_size": [2, 1, 2] }"#, "room_max_size"),
            (r#"{ "size": [4, 2, 4], "room_min_size": [3, 1, 3] }"#, "room_min_size"),
            (r#"{ "extra_hallway_chance": 1.5 }"#, "extra_hallway_chance"),
        ];
        for (json, expected) in cases {
            match DungeonConfig::from_json_str(json) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{json}"),
                other => panic!("expected invalid {expected} for {json}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DungeonConfig::from_json_str("{ room_count: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("voxel-dungeon-missing-config.json");
        assert!(matches!(
            DungeonConfig::from_json_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("voxel-dungeon-config-{}.json", std::process::id()));
        let written = DungeonConfig {
            room_count: 5,
            seed: Some(99),
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string(&written).unwrap()).unwrap();
        let loaded = DungeonConfig::from_json_file(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.unwrap(), written);
    }
}
