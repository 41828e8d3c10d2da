//! Room graph built once from a layout table.
//!
//! ```text
//! layout [[1, 2],        1 ── 2
//!         [3, 0]]   =>   │
//!                        3
//! ```
//!
//! Every link is bidirectional. Cells holding 0 are empty and produce
//! neither a room nor a link.

use std::collections::BTreeMap;

use keystone_core::EntityConfig;
use keystone_shared::Side;

/// One play area.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Room {
    /// Room id, never 0.
    pub id: u32,
    /// Name of the tile map the presentation layer draws.
    pub tilemap: String,
    /// Entities instantiated whenever the room becomes current.
    pub entities: Vec<EntityConfig>,
    /// Where a warp drops the player.
    pub player_start: (f64, f64),
    neighbors: [u32; 4],
}

impl Room {
    /// Creates a room with no neighbors and no entities.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Neighbor across `side`; 0 when there is none.
    #[inline]
    #[must_use]
    pub const fn neighbor(&self, side: Side) -> u32 {
        self.neighbors[side.index()]
    }

    fn link(&mut self, side: Side, room: u32) {
        self.neighbors[side.index()] = room;
    }
}

/// Rooms keyed by id. Immutable after construction except for room
/// contents.
#[derive(Clone, Debug, Default)]
pub struct RoomGraph {
    rooms: BTreeMap<u32, Room>,
}

impl RoomGraph {
    /// Builds the graph from a table of room ids. Rows may be ragged.
    #[must_use]
    pub fn from_layout(layout: &[Vec<u32>]) -> Self {
        let mut graph = Self::default();
        let cell = |row: usize, col: usize| -> u32 {
            layout
                .get(row)
                .and_then(|cells| cells.get(col))
                .copied()
                .unwrap_or(0)
        };

        for (row, cells) in layout.iter().enumerate() {
            for (col, &id) in cells.iter().enumerate() {
                if id == 0 {
                    continue;
                }
                graph.rooms.entry(id).or_insert_with(|| Room::new(id));

                let east = cell(row, col + 1);
                if east != 0 {
                    graph.connect(id, Side::Right, east);
                }
                let south = cell(row + 1, col);
                if south != 0 {
                    graph.connect(id, Side::Bottom, south);
                }
            }
        }
        tracing::debug!(rooms = graph.rooms.len(), "room graph built");
        graph
    }

    /// Links `from` to `to` across `side`, and `to` back across the
    /// opposite side.
    fn connect(&mut self, from: u32, side: Side, to: u32) {
        self.rooms
            .entry(from)
            .or_insert_with(|| Room::new(from))
            .link(side, to);
        self.rooms
            .entry(to)
            .or_insert_with(|| Room::new(to))
            .link(side.opposite(), from);
    }

    /// Gets a room.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// Gets a room for filling in its contents.
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Whether a room exists.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.rooms.contains_key(&id)
    }

    /// Neighbor of `room` across `side`; 0 when either is missing.
    #[must_use]
    pub fn neighbor(&self, room: u32, side: Side) -> u32 {
        self.rooms.get(&room).map_or(0, |r| r.neighbor(side))
    }

    /// Rooms in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Number of rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the graph has no rooms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
