use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::SegmentId;

/// An opening between a room cell and the cell just outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub room_side: IVec3,
    pub outside: IVec3,
    /// Room the door belongs to
    pub room: SegmentId,
}

impl Door {
    pub fn new(room_side: IVec3, outside: IVec3, room: SegmentId) -> Self {
        Self {
            room_side,
            outside,
            room,
        }
    }

    /// Unit step from the room side to the outside.
    pub fn direction(&self) -> IVec3 {
        self.outside - self.room_side
    }
}
