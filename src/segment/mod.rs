//! Typed claims on level cells.
//!
//! A [`Segment`] is one piece of dungeon structure: a room, a single hallway
//! cell, a stairway run or a door. Segments live in the [`Level`] arena and
//! cells refer to them by [`SegmentId`], so nothing holds a live reference into
//! the grid.

mod door;
mod hallway;
mod room;
mod stairway;

pub use door::Door;
pub use hallway::Hallway;
pub use room::Room;
pub use stairway::Stairway;

use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{NON_TRAVERSABLE, NON_TRAVERSABLE_TOLERANCE};
use crate::level::Level;

/// Index of a segment in its level's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Room,
    Hallway,
    Stairway,
    Door,
}

/// How the pathfinder classifies a cell.
///
/// A cell with several memberships reports the most restrictive one: any
/// stairway wins over a room, a room wins over a hallway. Door memberships
/// always sit on a room or hallway cell and add nothing of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupancy {
    Empty,
    Room,
    Hallway,
    Stairway,
}

impl Occupancy {
    /// Empty or hallway: the cells a hallway may merge into or a stairway may land on.
    pub fn is_walkable_floor(self) -> bool {
        matches!(self, Occupancy::Empty | Occupancy::Hallway)
    }
}

/// Inputs shared by every segment cost function.
#[derive(Clone, Copy)]
pub struct CostContext<'a> {
    pub level: &'a Level,
    /// Final target of the whole search, used for the distance heuristic
    pub goal: IVec3,
    /// Position the path occupied just before the move's start, if any
    pub previous: Option<IVec3>,
}

/// True when `cost` is the [`NON_TRAVERSABLE`] marker rather than a real cost.
pub fn is_non_traversable(cost: f32) -> bool {
    (cost - NON_TRAVERSABLE).abs() < NON_TRAVERSABLE_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Room(Room),
    Hallway(Hallway),
    Stairway(Stairway),
    Door(Door),
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Room(_) => SegmentKind::Room,
            Segment::Hallway(_) => SegmentKind::Hallway,
            Segment::Stairway(_) => SegmentKind::Stairway,
            Segment::Door(_) => SegmentKind::Door,
        }
    }

    pub fn origin(&self) -> IVec3 {
        match self {
            Segment::Room(room) => room.origin(),
            Segment::Hallway(hallway) => hallway.end,
            Segment::Stairway(stairway) => stairway.start,
            Segment::Door(door) => door.room_side,
        }
    }

    /// Cells this segment is a member of once committed.
    pub fn occupied_positions(&self) -> Vec<IVec3> {
        match self {
            Segment::Room(room) => room.shape().to_vec(),
            Segment::Hallway(hallway) => vec![hallway.end],
            Segment::Stairway(stairway) => stairway.footprint().to_vec(),
            Segment::Door(door) => vec![door.room_side, door.outside],
        }
    }

    /// Explicit cell-to-cell links this segment creates when committed.
    pub fn connections(&self) -> Vec<(IVec3, IVec3)> {
        match self {
            Segment::Room(_) | Segment::Hallway(_) => Vec::new(),
            Segment::Stairway(stairway) => stairway.attachments().to_vec(),
            Segment::Door(door) => vec![(door.room_side, door.outside)],
        }
    }

    /// Whether a cell this segment occupies at `from` opens onto `from + delta`.
    ///
    /// This is what renderers ask when deciding where walls go.
    pub fn neighbor_evaluator(&self, id: SegmentId, level: &Level, from: IVec3, delta: IVec3) -> bool {
        let to = from + delta;
        if level.has_connection(from, to) {
            return true;
        }
        match self {
            Segment::Room(_) | Segment::Stairway(_) => {
                level.cell(to).is_some_and(|cell| cell.has_segment(id))
            }
            Segment::Hallway(_) => {
                delta.y == 0 && level.occupancy(to).is_some_and(Occupancy::is_walkable_floor)
            }
            Segment::Door(_) => false,
        }
    }

    pub fn as_room(&self) -> Option<&Room> {
        match self {
            Segment::Room(room) => Some(room),
            _ => None,
        }
    }

    pub fn as_stairway(&self) -> Option<&Stairway> {
        match self {
            Segment::Stairway(stairway) => Some(stairway),
            _ => None,
        }
    }
}
