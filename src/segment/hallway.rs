use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::{CostContext, Door, Occupancy, Segment, SegmentId};
use crate::constants::{HALLWAY_EMPTY_PENALTY, HALLWAY_ROOM_PENALTY, NON_TRAVERSABLE};
use crate::error::LevelError;
use crate::level::Level;

/// One horizontal hallway step from `start` to the adjacent cell `end`.
///
/// Once committed, a hallway segment claims only its `end` cell; the `start`
/// cell belongs to whatever the path stood on before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hallway {
    pub start: IVec3,
    pub end: IVec3,
    pub direction: IVec3,
}

impl Hallway {
    /// Unit steps along X and Z. Hallways never change level on their own.
    pub const OFFSETS: [IVec3; 4] = [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z];

    pub fn new(start: IVec3, end: IVec3) -> Self {
        Self {
            start,
            end,
            direction: end - start,
        }
    }

    /// Distance-to-goal heuristic plus a surcharge for what the step walks into.
    pub fn calculate_cost(&self, ctx: &CostContext) -> f32 {
        let Some(occupancy) = ctx.level.occupancy(self.end) else {
            return NON_TRAVERSABLE;
        };

        let mut cost = self.end.as_vec3().distance(ctx.goal.as_vec3());
        match occupancy {
            Occupancy::Stairway => return NON_TRAVERSABLE,
            Occupancy::Room => cost += HALLWAY_ROOM_PENALTY,
            Occupancy::Empty => cost += HALLWAY_EMPTY_PENALTY,
            Occupancy::Hallway => {}
        }
        cost
    }

    /// Commit this step to the level.
    ///
    /// Stepping between a room and anything else leaves a door instead of
    /// turning the room cell into hallway. Steps inside one room claim nothing,
    /// and steps onto an existing hallway merge into it.
    pub fn interpret_pathfinding_result(&self, level: &mut Level) -> Result<Vec<SegmentId>, LevelError> {
        let mut created = Vec::new();

        let from_room = level.room_at(self.start);
        let to_room = level.room_at(self.end);

        if to_room.is_none() && level.occupancy(self.end) == Some(Occupancy::Empty) {
            created.push(level.insert(Segment::Hallway(*self))?);
        }

        let door = match (from_room, to_room) {
            (Some(a), Some(b)) if a == b => None,
            (Some(room), _) => Some(Door::new(self.start, self.end, room)),
            (None, Some(room)) => Some(Door::new(self.end, self.start, room)),
            (None, None) => None,
        };
        if let Some(door) = door {
            if !level.has_connection(door.room_side, door.outside) {
                created.push(level.insert(Segment::Door(door))?);
            }
        }

        Ok(created)
    }
}
