use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::segment::SegmentId;

/// An explicit link from one cell to a neighboring position, owned by the
/// segment that created it (a door, or a stairway attaching to its landings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub to: IVec3,
    pub segment: SegmentId,
}

/// Payload of one level grid cell.
///
/// A cell can belong to several segments at once (a doorway is both room and
/// door). Connections are never implied by adjacency; they are added in pairs
/// by [`crate::level::Level`] so both ends always agree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: IVec3,
    segments: Vec<SegmentId>,
    connections: Vec<Connection>,
}

impl Cell {
    pub fn new(position: IVec3) -> Self {
        Self {
            position,
            segments: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn has_segment(&self, id: SegmentId) -> bool {
        self.segments.contains(&id)
    }

    pub fn has_connection(&self, to: IVec3) -> bool {
        self.connections.iter().any(|c| c.to == to)
    }

    pub(crate) fn add_segment(&mut self, id: SegmentId) {
        if !self.segments.contains(&id) {
            self.segments.push(id);
        }
    }

    pub(crate) fn remove_segment(&mut self, id: SegmentId) {
        self.segments.retain(|s| *s != id);
    }

    pub(crate) fn add_connection(&mut self, connection: Connection) {
        if !self.connections.contains(&connection) {
            self.connections.push(connection);
        }
    }

    /// Drop every connection owned by `segment`, returning the positions it pointed to.
    pub(crate) fn remove_connections_of(&mut self, segment: SegmentId) -> Vec<IVec3> {
        let mut removed = Vec::new();
        self.connections.retain(|c| {
            if c.segment == segment {
                removed.push(c.to);
                false
            } else {
                true
            }
        });
        removed
    }
}
