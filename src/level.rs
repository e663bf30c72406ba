//! The mutable level: a grid of cells plus the arena of segments claiming them.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Connection};
use crate::error::LevelError;
use crate::flood_fill::flood_fill;
use crate::grid::Grid3D;
use crate::segment::{Occupancy, Room, Segment, SegmentId, SegmentKind};

/// The six axis-aligned unit steps.
pub const NEIGHBOR_OFFSETS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    grid: Grid3D<Cell>,
    /// Arena indexed by `SegmentId`; removed segments leave a `None` so ids stay stable
    segments: Vec<Option<Segment>>,
}

impl Level {
    pub fn new(size: IVec3) -> Self {
        Self {
            grid: Grid3D::from_fn(size, IVec3::ZERO, Cell::new),
            segments: Vec::new(),
        }
    }

    pub fn size(&self) -> IVec3 {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid3D<Cell> {
        &self.grid
    }

    pub fn in_bounds(&self, pos: IVec3) -> bool {
        self.grid.in_bounds(pos)
    }

    pub fn cell(&self, pos: IVec3) -> Option<&Cell> {
        self.grid.get(pos)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Live segments in id order.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (SegmentId(i as u32), s)))
    }

    pub fn segments_of_kind(&self, kind: SegmentKind) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments().filter(move |(_, s)| s.kind() == kind)
    }

    pub fn rooms(&self) -> impl Iterator<Item = (SegmentId, &Room)> {
        self.segments().filter_map(|(id, s)| s.as_room().map(|room| (id, room)))
    }

    /// Classification of a cell for pathfinding; `None` outside the level.
    pub fn occupancy(&self, pos: IVec3) -> Option<Occupancy> {
        let cell = self.cell(pos)?;
        let mut occupancy = Occupancy::Empty;
        for id in cell.segments() {
            match self.segment(*id).map(Segment::kind) {
                Some(SegmentKind::Stairway) => return Some(Occupancy::Stairway),
                Some(SegmentKind::Room) => occupancy = Occupancy::Room,
                Some(SegmentKind::Hallway) | Some(SegmentKind::Door) if occupancy == Occupancy::Empty => {
                    occupancy = Occupancy::Hallway;
                }
                _ => {}
            }
        }
        Some(occupancy)
    }

    /// First room the cell at `pos` belongs to.
    pub fn room_at(&self, pos: IVec3) -> Option<SegmentId> {
        self.cell(pos)?
            .segments()
            .iter()
            .copied()
            .find(|id| self.segment(*id).is_some_and(|s| s.kind() == SegmentKind::Room))
    }

    pub fn has_connection(&self, from: IVec3, to: IVec3) -> bool {
        self.cell(from).is_some_and(|cell| cell.has_connection(to))
    }

    /// Commit a segment: add it to the arena, to every cell it occupies, and
    /// create its connections in both directions.
    ///
    /// Nothing is modified when any occupied or connected position is outside the level.
    pub fn insert(&mut self, segment: Segment) -> Result<SegmentId, LevelError> {
        let occupied = segment.occupied_positions();
        let connections = segment.connections();

        let outside = occupied
            .iter()
            .chain(connections.iter().flat_map(|(a, b)| [a, b]))
            .find(|p| !self.in_bounds(**p));
        if let Some(position) = outside {
            return Err(LevelError::OutOfBounds { position: *position });
        }

        let id = SegmentId(self.segments.len() as u32);
        for pos in occupied {
            self.grid[pos].add_segment(id);
        }
        for (a, b) in connections {
            self.connect(a, b, id);
        }
        self.segments.push(Some(segment));
        Ok(id)
    }

    /// Undo [`Level::insert`]: drop the segment's memberships and its connections.
    pub fn remove(&mut self, id: SegmentId) -> Result<Segment, LevelError> {
        let segment = self
            .segments
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(LevelError::UnknownSegment(id))?;

        for pos in segment.occupied_positions() {
            self.grid[pos].remove_segment(id);
        }
        for (a, b) in segment.connections() {
            for pos in [a, b] {
                self.grid[pos].remove_connections_of(id);
            }
        }
        Ok(segment)
    }

    fn connect(&mut self, a: IVec3, b: IVec3, segment: SegmentId) {
        self.grid[a].add_connection(Connection { to: b, segment });
        self.grid[b].add_connection(Connection { to: a, segment });
    }

    /// Whether any segment in the cell at `pos` opens onto `pos + delta`.
    pub fn has_neighbor(&self, pos: IVec3, delta: IVec3) -> bool {
        let Some(cell) = self.cell(pos) else {
            return false;
        };
        if !self.in_bounds(pos + delta) {
            return false;
        }
        cell.segments().iter().any(|id| {
            self.segment(*id)
                .is_some_and(|s| s.neighbor_evaluator(*id, self, pos, delta))
        })
    }

    /// Every occupied cell reachable from `start` by walking through open neighbors.
    pub fn reachable_from(&self, start: IVec3) -> Vec<IVec3> {
        if self.cell(start).map_or(true, Cell::is_empty) {
            return Vec::new();
        }
        flood_fill(
            start,
            |pos| {
                NEIGHBOR_OFFSETS
                    .iter()
                    .filter(|delta| self.has_neighbor(*pos, **delta))
                    .map(|delta| *pos + *delta)
                    .collect::<Vec<_>>()
            },
            |pos| self.cell(*pos).is_some_and(|cell| !cell.is_empty()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Door, Hallway, Stairway};

    #[test]
    fn test_new_level_is_empty() {
        let level = Level::new(IVec3::new(4, 2, 4));
        assert_eq!(level.occupancy(IVec3::ZERO), Some(Occupancy::Empty));
        assert_eq!(level.occupancy(IVec3::new(4, 0, 0)), None);
        assert_eq!(level.segments().count(), 0);
        assert_eq!(level.cell(IVec3::new(3, 1, 2)).map(|c| c.position), Some(IVec3::new(3, 1, 2)));
    }

    #[test]
    fn test_insert_room_claims_cells() {
        let mut level = Level::new(IVec3::new(4, 2, 4));
        let id = level
            .insert(Segment::Room(Room::cuboid(IVec3::ZERO, IVec3::new(2, 1, 2))))
            .unwrap();
        assert_eq!(level.room_at(IVec3::new(1, 0, 1)), Some(id));
        assert_eq!(level.occupancy(IVec3::new(1, 0, 1)), Some(Occupancy::Room));
        assert_eq!(level.occupancy(IVec3::new(2, 0, 0)), Some(Occupancy::Empty));
        assert_eq!(level.rooms().count(), 1);
    }

    #[test]
    fn test_insert_out_of_bounds_changes_nothing() {
        let mut level = Level::new(IVec3::new(4, 2, 4));
        let err = level
            .insert(Segment::Room(Room::cuboid(IVec3::new(3, 0, 0), IVec3::new(2, 1, 1))))
            .unwrap_err();
        assert_eq!(err, LevelError::OutOfBounds { position: IVec3::new(4, 0, 0) });
        assert_eq!(level.occupancy(IVec3::new(3, 0, 0)), Some(Occupancy::Empty));
        assert_eq!(level.segments().count(), 0);
    }

    #[test]
    fn test_stairway_wins_occupancy() {
        let mut level = Level::new(IVec3::new(6, 2, 6));
        let stair = Stairway::new(IVec3::new(0, 0, 0), IVec3::new(3, 1, 0));
        level.insert(Segment::Stairway(stair)).unwrap();
        level
            .insert(Segment::Hallway(Hallway::new(IVec3::new(1, 0, 1), stair.start)))
            .unwrap();
        assert_eq!(level.occupancy(stair.start), Some(Occupancy::Stairway));
    }

    #[test]
    fn test_remove_is_symmetric() {
        let mut level = Level::new(IVec3::new(4, 1, 4));
        let room = level
            .insert(Segment::Room(Room::cuboid(IVec3::ZERO, IVec3::ONE)))
            .unwrap();
        let door = level
            .insert(Segment::Door(Door::new(IVec3::ZERO, IVec3::X, room)))
            .unwrap();
        assert!(level.has_connection(IVec3::ZERO, IVec3::X));
        assert!(level.has_connection(IVec3::X, IVec3::ZERO));

        let removed = level.remove(door).unwrap();
        assert_eq!(removed.kind(), SegmentKind::Door);
        assert!(!level.has_connection(IVec3::ZERO, IVec3::X));
        assert!(!level.has_connection(IVec3::X, IVec3::ZERO));
        assert!(level.cell(IVec3::X).unwrap().is_empty());
        assert_eq!(level.remove(door), Err(LevelError::UnknownSegment(door)));
        // ids are not reused
        assert_eq!(level.room_at(IVec3::ZERO), Some(room));
    }

    #[test]
    fn test_room_neighbors_stay_inside_room() {
        let mut level = Level::new(IVec3::new(4, 2, 4));
        level
            .insert(Segment::Room(Room::cuboid(IVec3::ZERO, IVec3::new(2, 2, 1))))
            .unwrap();
        assert!(level.has_neighbor(IVec3::ZERO, IVec3::X));
        assert!(level.has_neighbor(IVec3::ZERO, IVec3::Y));
        assert!(!level.has_neighbor(IVec3::ZERO, IVec3::Z));
        assert!(!level.has_neighbor(IVec3::ZERO, IVec3::NEG_X));
    }

    #[test]
    fn test_hallway_neighbors_are_horizontal() {
        let mut level = Level::new(IVec3::new(4, 2, 4));
        level
            .insert(Segment::Hallway(Hallway::new(IVec3::new(0, 0, 1), IVec3::new(1, 0, 1))))
            .unwrap();
        level
            .insert(Segment::Hallway(Hallway::new(IVec3::new(1, 0, 1), IVec3::new(2, 0, 1))))
            .unwrap();
        level
            .insert(Segment::Room(Room::cuboid(IVec3::new(1, 0, 2), IVec3::ONE)))
            .unwrap();

        assert!(level.has_neighbor(IVec3::new(1, 0, 1), IVec3::X));
        assert!(!level.has_neighbor(IVec3::new(1, 0, 1), IVec3::Y));
        // a room cell without a door is closed off
        assert!(!level.has_neighbor(IVec3::new(1, 0, 1), IVec3::Z));
        // edge of the level
        assert!(!level.has_neighbor(IVec3::new(1, 0, 1), IVec3::new(0, 0, -2)));
    }

    #[test]
    fn test_reachable_through_door() {
        let mut level = Level::new(IVec3::new(6, 1, 3));
        let a = level
            .insert(Segment::Room(Room::cuboid(IVec3::ZERO, IVec3::new(2, 1, 1))))
            .unwrap();
        let b = level
            .insert(Segment::Room(Room::cuboid(IVec3::new(4, 0, 0), IVec3::new(2, 1, 1))))
            .unwrap();
        level
            .insert(Segment::Hallway(Hallway::new(IVec3::new(1, 0, 0), IVec3::new(2, 0, 0))))
            .unwrap();
        level
            .insert(Segment::Hallway(Hallway::new(IVec3::new(2, 0, 0), IVec3::new(3, 0, 0))))
            .unwrap();
        level
            .insert(Segment::Door(Door::new(IVec3::new(1, 0, 0), IVec3::new(2, 0, 0), a)))
            .unwrap();

        let reached = level.reachable_from(IVec3::ZERO);
        assert!(reached.contains(&IVec3::new(3, 0, 0)));
        assert!(!reached.contains(&IVec3::new(4, 0, 0)));

        level
            .insert(Segment::Door(Door::new(IVec3::new(4, 0, 0), IVec3::new(3, 0, 0), b)))
            .unwrap();
        let reached = level.reachable_from(IVec3::ZERO);
        assert!(reached.contains(&IVec3::new(5, 0, 0)));
        assert_eq!(reached.len(), 6);
    }
}
