//! # Level Configuration
//!
//! A level is static declarative data: the room layout, what each room
//! contains and any presets the level adds or overrides.
//!
//! ```toml
//! start_room = 1
//! player_start = [120.0, 80.0]
//! layout = [[1, 2], [3, 0]]
//!
//! [[rooms]]
//! id = 1
//! tilemap = "meadow"
//! spawns = [
//!     { preset = "skeleton", x = 48.0, y = 48.0 },
//!     { preset = "warp", x = 200.0, y = 32.0, warp_to = 3 },
//! ]
//!
//! [presets.ghost]
//! category = "enemy"
//! w = 16.0
//! h = 16.0
//! health = { total = 1 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use keystone_core::{EntityConfig, PresetRegistry};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::room::RoomGraph;

/// Top-level level document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    /// Room the player starts in.
    pub start_room: u32,
    /// Where the player appears at level start.
    #[serde(default = "default_player_start")]
    pub player_start: [f64; 2],
    /// Table of room ids, 0 for empty cells. Rows may be ragged.
    pub layout: Vec<Vec<u32>>,
    /// Contents of each room.
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
    /// Presets added or overridden by this level.
    #[serde(default)]
    pub presets: BTreeMap<String, EntityConfig>,
}

fn default_player_start() -> [f64; 2] {
    [120.0, 80.0]
}

/// Contents of one room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomConfig {
    /// Room id; must appear in the layout.
    pub id: u32,
    /// Tile map drawn behind the room.
    #[serde(default)]
    pub tilemap: String,
    /// Where a warp into this room drops the player.
    #[serde(default)]
    pub player_start: Option<[f64; 2]>,
    /// Entities placed in the room.
    #[serde(default)]
    pub spawns: Vec<SpawnConfig>,
}

/// One entity placed in a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnConfig {
    /// Preset name.
    pub preset: String,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Destination for warps.
    #[serde(default)]
    pub warp_to: Option<u32>,
}

/// A level ready to play: its room graph with every room's entities
/// resolved to configuration records.
#[derive(Clone, Debug)]
pub struct Level {
    /// Rooms and their links.
    pub rooms: RoomGraph,
    /// Room the player starts in.
    pub start_room: u32,
    /// Where the player appears at level start.
    pub player_start: (f64, f64),
}

impl LevelConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] on syntax errors or unknown keys.
    pub fn from_toml_str(source: &str) -> GameResult<Self> {
        toml::from_str(source).map_err(|e| GameError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the file cannot be read or
    /// does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Registers the level's presets and resolves every spawn.
    ///
    /// # Errors
    ///
    /// Fails on an invalid preset, an unknown preset name, a room missing
    /// from the layout, or a start room missing from the layout.
    pub fn build(&self, presets: &mut PresetRegistry) -> GameResult<Level> {
        for (name, template) in &self.presets {
            template.validate()?;
            presets.register(name.clone(), template.clone());
        }

        let mut rooms = RoomGraph::from_layout(&self.layout);
        if !rooms.contains(self.start_room) {
            return Err(GameError::UnknownRoom(self.start_room));
        }

        let [px, py] = self.player_start;
        let ids: Vec<u32> = rooms.rooms().map(|room| room.id).collect();
        for id in ids {
            if let Some(room) = rooms.get_mut(id) {
                room.player_start = (px, py);
            }
        }

        for config in &self.rooms {
            let room = rooms
                .get_mut(config.id)
                .ok_or(GameError::UnknownRoom(config.id))?;
            room.tilemap.clone_from(&config.tilemap);
            if let Some([sx, sy]) = config.player_start {
                room.player_start = (sx, sy);
            }
            for spawn in &config.spawns {
                let mut entity = presets.instantiate(&spawn.preset, spawn.x, spawn.y)?;
                if spawn.warp_to.is_some() {
                    entity.warp_to = spawn.warp_to;
                }
                entity.validate()?;
                room.entities.push(entity);
            }
        }

        tracing::info!(
            rooms = rooms.len(),
            start_room = self.start_room,
            "level built"
        );
        Ok(Level {
            rooms,
            start_room: self.start_room,
            player_start: (px, py),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystone_core::CoreError;
    use keystone_shared::{Category, Side};

    const LEVEL: &str = r#"
        start_room = 1
        layout = [[1, 2], [3, 0]]

        [[rooms]]
        id = 1
        tilemap = "meadow"
        spawns = [
            { preset = "ghost", x = 48.0, y = 48.0 },
            { preset = "warp", x = 200.0, y = 32.0, warp_to = 3 },
        ]

        [[rooms]]
        id = 3
        player_start = [16.0, 16.0]

        [presets.ghost]
        category = "enemy"
        w = 16.0
        h = 16.0
        health = { total = 1 }
    "#;

    #[test]
    fn test_build_level() {
        let config = LevelConfig::from_toml_str(LEVEL).unwrap();
        let mut presets = PresetRegistry::builtin();
        let level = config.build(&mut presets).unwrap();

        assert!(presets.contains("ghost"));
        assert_eq!(level.start_room, 1);
        assert_eq!(level.rooms.neighbor(1, Side::Right), 2);

        let room1 = level.rooms.get(1).unwrap();
        assert_eq!(room1.tilemap, "meadow");
        assert_eq!(room1.entities.len(), 2);
        assert_eq!(room1.entities[0].category, Category::Enemy);
        assert_eq!(room1.entities[1].warp_to, Some(3));
        assert_eq!(room1.player_start, (120.0, 80.0));
        assert_eq!(level.rooms.get(2).unwrap().player_start, (120.0, 80.0));
        assert_eq!(level.rooms.get(3).unwrap().player_start, (16.0, 16.0));
    }

    #[test]
    fn test_room_outside_layout() {
        let config = LevelConfig::from_toml_str(
            "start_room = 1\nlayout = [[1]]\n[[rooms]]\nid = 9\n",
        )
        .unwrap();
        assert_eq!(
            config.build(&mut PresetRegistry::builtin()).unwrap_err(),
            GameError::UnknownRoom(9)
        );
    }

    #[test]
    fn test_start_room_outside_layout() {
        let config = LevelConfig::from_toml_str("start_room = 4\nlayout = [[1, 2]]").unwrap();
        assert_eq!(
            config.build(&mut PresetRegistry::builtin()).unwrap_err(),
            GameError::UnknownRoom(4)
        );
    }

    #[test]
    fn test_unknown_preset_in_room() {
        let config = LevelConfig::from_toml_str(
            "start_room = 1\nlayout = [[1]]\n[[rooms]]\nid = 1\nspawns = [{ preset = \"dragon\", x = 0.0, y = 0.0 }]\n",
        )
        .unwrap();
        assert_eq!(
            config.build(&mut PresetRegistry::builtin()).unwrap_err(),
            GameError::Core(CoreError::UnknownPreset("dragon".to_owned()))
        );
    }

    #[test]
    fn test_warp_without_target_rejected() {
        let config = LevelConfig::from_toml_str(
            "start_room = 1\nlayout = [[1]]\n[[rooms]]\nid = 1\nspawns = [{ preset = \"warp\", x = 0.0, y = 0.0 }]\n",
        )
        .unwrap();
        assert!(matches!(
            config.build(&mut PresetRegistry::builtin()),
            Err(GameError::Core(CoreError::InvalidConfig(_)))
        ));
    }
}
