use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::{CostContext, Hallway, Occupancy, Segment, SegmentId};
use crate::constants::{NON_TRAVERSABLE, STAIRWAY_BASE_COST, STAIRWAY_HORIZONTAL_SPAN};
use crate::error::LevelError;
use crate::level::Level;

/// A staircase changing level by one cell over three horizontal cells.
///
/// The pathfinder proposes a stairway as a jump between two landings,
/// `raw_start` and `raw_end`, three cells apart horizontally and one apart
/// vertically. The stair body sits between them: `start` and `end` are the
/// landings inset by one horizontal cell, and the body fills the 2×2 slab
/// spanned by those two cells:
///
/// ```text
///  rise +1, direction +X, side view:
///
///  y+1   .  [b] [e] E
///  y     S  [s] [b]  .
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairway {
    pub raw_start: IVec3,
    pub raw_end: IVec3,
    pub start: IVec3,
    pub end: IVec3,
    /// Horizontal unit direction of travel
    pub direction: IVec3,
    /// +1 when climbing, -1 when descending
    pub rise: i32,
}

impl Stairway {
    pub const OFFSETS: [IVec3; 8] = [
        IVec3::new(STAIRWAY_HORIZONTAL_SPAN, 1, 0),
        IVec3::new(-STAIRWAY_HORIZONTAL_SPAN, 1, 0),
        IVec3::new(0, 1, STAIRWAY_HORIZONTAL_SPAN),
        IVec3::new(0, 1, -STAIRWAY_HORIZONTAL_SPAN),
        IVec3::new(STAIRWAY_HORIZONTAL_SPAN, -1, 0),
        IVec3::new(-STAIRWAY_HORIZONTAL_SPAN, -1, 0),
        IVec3::new(0, -1, STAIRWAY_HORIZONTAL_SPAN),
        IVec3::new(0, -1, -STAIRWAY_HORIZONTAL_SPAN),
    ];

    pub fn new(raw_start: IVec3, raw_end: IVec3) -> Self {
        let delta = raw_end - raw_start;
        let direction = IVec3::new(delta.x, 0, delta.z) / STAIRWAY_HORIZONTAL_SPAN;
        Self {
            raw_start,
            raw_end,
            start: raw_start + direction,
            end: raw_end - direction,
            direction,
            rise: delta.y,
        }
    }

    /// The four cells of the stair body.
    pub fn footprint(&self) -> [IVec3; 4] {
        let up = IVec3::Y * self.rise;
        [
            self.start,
            self.start + self.direction,
            self.start + up,
            self.end,
        ]
    }

    /// The landing on the lower floor.
    pub fn lower_landing(&self) -> IVec3 {
        if self.rise > 0 {
            self.raw_start
        } else {
            self.raw_end
        }
    }

    /// Cell above the lower landing, which must stay free as headroom.
    pub fn clearance(&self) -> IVec3 {
        self.lower_landing() + IVec3::Y
    }

    /// Explicit links from each landing onto the stair body.
    pub fn attachments(&self) -> [(IVec3, IVec3); 2] {
        [(self.raw_start, self.start), (self.end, self.raw_end)]
    }

    /// Whether `next` leaves the upper or lower landing straight ahead.
    pub fn satisfies_next_condition(&self, next: &Hallway) -> bool {
        next.start == self.raw_end && next.direction == self.direction
    }

    pub fn calculate_cost(&self, ctx: &CostContext) -> f32 {
        let level = ctx.level;

        for landing in [self.raw_start, self.raw_end] {
            if !level.occupancy(landing).is_some_and(Occupancy::is_walkable_floor) {
                return NON_TRAVERSABLE;
            }
        }

        let clearance = self.clearance();
        let body = self.footprint();
        if body
            .iter()
            .chain(std::iter::once(&clearance))
            .any(|p| level.occupancy(*p) != Some(Occupancy::Empty))
        {
            return NON_TRAVERSABLE;
        }

        if let Some(previous) = ctx.previous {
            if previous == clearance || body.contains(&previous) {
                return NON_TRAVERSABLE;
            }
        }

        STAIRWAY_BASE_COST + self.raw_end.as_vec3().distance(ctx.goal.as_vec3())
    }

    /// Commit the stair body and make sure both landings are walkable hallway.
    pub fn interpret_pathfinding_result(&self, level: &mut Level) -> Result<Vec<SegmentId>, LevelError> {
        let mut created = vec![level.insert(Segment::Stairway(*self))?];

        for landing in [self.raw_start, self.raw_end] {
            if level.occupancy(landing) == Some(Occupancy::Empty) {
                let hallway = Hallway {
                    start: landing,
                    end: landing,
                    direction: self.direction,
                };
                created.push(level.insert(Segment::Hallway(hallway))?);
            }
        }

        Ok(created)
    }
}
