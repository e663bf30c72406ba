use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::grid::Grid3D;
use crate::level::Level;
use crate::segment::{is_non_traversable, CostContext, Hallway, SegmentId, Stairway};

/// One move the pathfinder can make.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    Hallway(Hallway),
    Stairway(Stairway),
}

impl PathSegment {
    pub fn start_position(&self) -> IVec3 {
        match self {
            PathSegment::Hallway(h) => h.start,
            PathSegment::Stairway(s) => s.raw_start,
        }
    }

    pub fn end_position(&self) -> IVec3 {
        match self {
            PathSegment::Hallway(h) => h.end,
            PathSegment::Stairway(s) => s.raw_end,
        }
    }

    /// Cells the move occupies strictly between its two endpoints.
    pub fn footprint(&self) -> Vec<IVec3> {
        match self {
            PathSegment::Hallway(_) => Vec::new(),
            PathSegment::Stairway(s) => s.footprint().to_vec(),
        }
    }

    pub fn calculate_cost(&self, ctx: &CostContext) -> f32 {
        match self {
            PathSegment::Hallway(h) => h.calculate_cost(ctx),
            PathSegment::Stairway(s) => s.calculate_cost(ctx),
        }
    }

    /// Whether `next` may directly follow this move.
    pub fn satisfies_next_condition(&self, next: &PathSegment) -> bool {
        match (self, next) {
            (PathSegment::Hallway(_), _) => true,
            (PathSegment::Stairway(s), PathSegment::Hallway(h)) => s.satisfies_next_condition(h),
            (PathSegment::Stairway(_), PathSegment::Stairway(_)) => false,
        }
    }

    pub fn interpret_pathfinding_result(&self, level: &mut Level) -> Result<Vec<SegmentId>, LevelError> {
        match self {
            PathSegment::Hallway(h) => h.interpret_pathfinding_result(level),
            PathSegment::Stairway(s) => s.interpret_pathfinding_result(level),
        }
    }

    pub fn is_stairway(&self) -> bool {
        matches!(self, PathSegment::Stairway(_))
    }
}

/// A found path: moves in start-to-goal order and their summed cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub segments: Vec<PathSegment>,
    pub cost: f32,
}

impl Path {
    /// Commit every move to `level`, in order. Returns the segments created.
    pub fn commit(&self, level: &mut Level) -> Result<Vec<SegmentId>, LevelError> {
        let mut created = Vec::new();
        for segment in &self.segments {
            created.extend(segment.interpret_pathfinding_result(level)?);
        }
        Ok(created)
    }
}

/// Per-cell search state.
#[derive(Debug, Clone)]
pub struct PathNode {
    pub cost: f32,
    pub previous: Option<IVec3>,
    /// Move used to arrive here; `None` at the start cell
    pub segment: Option<PathSegment>,
    /// Every position the path to this node already occupies
    pub previous_set: HashSet<IVec3>,
    pub closed: bool,
}

impl Default for PathNode {
    fn default() -> Self {
        Self {
            cost: f32::INFINITY,
            previous: None,
            segment: None,
            previous_set: HashSet::new(),
            closed: false,
        }
    }
}

impl PathNode {
    fn reset(&mut self) {
        self.cost = f32::INFINITY;
        self.previous = None;
        self.segment = None;
        self.previous_set.clear();
        self.closed = false;
    }
}

#[derive(Clone, Copy, PartialEq)]
struct QueueEntry {
    position: IVec3,
    cost: f32,
    sequence: u64,
}

impl Eq for QueueEntry {}

// BinaryHeap is a max-heap, so we reverse the ordering for min-heap behavior.
// Equal costs pop in insertion order.
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search over hallway and stairway moves.
///
/// Node storage is kept between calls and reset at the start of each search.
pub struct Pathfinder {
    nodes: Grid3D<PathNode>,
    queue: BinaryHeap<QueueEntry>,
    sequence: u64,
}

impl Pathfinder {
    pub fn new(size: IVec3) -> Self {
        Self {
            nodes: Grid3D::new(size, IVec3::ZERO),
            queue: BinaryHeap::new(),
            sequence: 0,
        }
    }

    fn reset(&mut self, size: IVec3) {
        if self.nodes.size() != size {
            self.nodes = Grid3D::new(size, IVec3::ZERO);
        } else {
            self.nodes.iter_mut().for_each(|(_, node)| node.reset());
        }
        self.queue.clear();
        self.sequence = 0;
    }

    fn push(&mut self, position: IVec3, cost: f32) {
        self.queue.push(QueueEntry {
            position,
            cost,
            sequence: self.sequence,
        });
        self.sequence += 1;
    }

    /// Find the cheapest sequence of moves from `start` to `goal` given the
    /// level's current occupancy. Returns `None` when no legal path exists.
    pub fn find_path(&mut self, level: &Level, start: IVec3, goal: IVec3) -> Option<Path> {
        puffin::profile_function!();

        self.reset(level.size());
        if !level.in_bounds(start) || !level.in_bounds(goal) {
            return None;
        }

        self.nodes[start].cost = 0.0;
        self.push(start, 0.0);

        while let Some(entry) = self.queue.pop() {
            let node = &self.nodes[entry.position];
            // Lazy deletion: skip entries superseded by a cheaper relaxation
            if node.closed || entry.cost > node.cost {
                continue;
            }
            if entry.position == goal {
                return Some(self.reconstruct_path(goal));
            }
            self.nodes[entry.position].closed = true;

            let from = entry.position;
            for offset in Hallway::OFFSETS {
                let hallway = Hallway::new(from, from + offset);
                self.try_segment(level, from, goal, PathSegment::Hallway(hallway));
            }
            for offset in Stairway::OFFSETS {
                let stairway = Stairway::new(from, from + offset);
                self.try_segment(level, from, goal, PathSegment::Stairway(stairway));
            }
        }

        None
    }

    /// Run the feasibility gate for `segment` leaving `from` and relax its end node.
    fn try_segment(&mut self, level: &Level, from: IVec3, goal: IVec3, segment: PathSegment) {
        let to = segment.end_position();
        let Some(neighbor) = self.nodes.get(to) else {
            return;
        };
        if neighbor.closed {
            return;
        }

        let node = &self.nodes[from];
        if node.previous_set.contains(&to) {
            return;
        }
        let footprint = segment.footprint();
        if footprint.iter().any(|p| node.previous_set.contains(p)) {
            return;
        }
        if let Some(previous) = &node.segment {
            if !previous.satisfies_next_condition(&segment) {
                return;
            }
        }

        let ctx = CostContext {
            level,
            goal,
            previous: node.previous,
        };
        let cost = segment.calculate_cost(&ctx);
        if is_non_traversable(cost) {
            return;
        }

        let new_cost = node.cost + cost;
        if new_cost >= self.nodes[to].cost {
            return;
        }

        let mut previous_set = node.previous_set.clone();
        previous_set.insert(from);
        previous_set.extend(footprint);

        let neighbor = &mut self.nodes[to];
        neighbor.cost = new_cost;
        neighbor.previous = Some(from);
        neighbor.segment = Some(segment);
        neighbor.previous_set = previous_set;
        self.push(to, new_cost);
    }

    /// Walk predecessors back from the goal, then reverse.
    fn reconstruct_path(&self, goal: IVec3) -> Path {
        let cost = self.nodes[goal].cost;
        let mut segments = Vec::new();
        let mut current = goal;

        while let Some(node) = self.nodes.get(current) {
            let (Some(segment), Some(previous)) = (node.segment, node.previous) else {
                break;
            };
            segments.push(segment);
            current = previous;
        }

        segments.reverse();
        Path { segments, cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{Occupancy, Room, Segment, SegmentKind};

    fn assert_legal(level: &Level, path: &Path, start: IVec3, goal: IVec3) {
        let mut at = start;
        for segment in &path.segments {
            assert_eq!(segment.start_position(), at);
            at = segment.end_position();
        }
        assert_eq!(at, goal);

        for pair in path.segments.windows(2) {
            assert!(pair[0].satisfies_next_condition(&pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }

        for segment in &path.segments {
            if let PathSegment::Stairway(stair) = segment {
                for landing in [stair.raw_start, stair.raw_end] {
                    assert!(level.occupancy(landing).is_some_and(Occupancy::is_walkable_floor));
                }
                for p in stair.footprint().into_iter().chain([stair.clearance()]) {
                    assert_eq!(level.occupancy(p), Some(Occupancy::Empty));
                }
            }
        }
    }

    #[test]
    fn test_path_across_room_wall() {
        let mut level = Level::new(IVec3::new(10, 4, 10));
        level
            .insert(Segment::Room(Room::cuboid(IVec3::new(0, 0, 5), IVec3::new(10, 4, 1))))
            .unwrap();

        let start = IVec3::ZERO;
        let goal = IVec3::new(9, 0, 9);
        let path = Pathfinder::new(level.size()).find_path(&level, start, goal).unwrap();

        assert!(path.cost.is_finite());
        assert!(!path.segments.is_empty());
        assert!(path.segments.iter().all(|s| !s.is_stairway()));
        assert_eq!(path.segments.last().map(PathSegment::end_position), Some(goal));
        assert_legal(&level, &path, start, goal);
    }

    #[test]
    fn test_same_query_same_result() {
        let mut level = Level::new(IVec3::new(12, 3, 12));
        level
            .insert(Segment::Room(Room::cuboid(IVec3::new(3, 0, 3), IVec3::new(4, 1, 4))))
            .unwrap();
        let mut pathfinder = Pathfinder::new(level.size());

        let a = pathfinder.find_path(&level, IVec3::new(0, 0, 5), IVec3::new(11, 1, 5)).unwrap();
        let b = pathfinder.find_path(&level, IVec3::new(0, 0, 5), IVec3::new(11, 1, 5)).unwrap();
        assert_eq!(a.cost, b.cost);
        assert_eq!(a.segments, b.segments);
    }

    #[test]
    fn test_climbs_between_rooms() {
        let mut level = Level::new(IVec3::new(12, 3, 6));
        let low = level
            .insert(Segment::Room(Room::cuboid(IVec3::ZERO, IVec3::new(2, 1, 2))))
            .unwrap();
        let high = level
            .insert(Segment::Room(Room::cuboid(IVec3::new(8, 1, 0), IVec3::new(2, 1, 2))))
            .unwrap();

        let start = IVec3::new(1, 0, 1);
        let goal = IVec3::new(8, 1, 1);
        let path = Pathfinder::new(level.size()).find_path(&level, start, goal).unwrap();

        assert!(path.segments.iter().any(PathSegment::is_stairway));
        assert_legal(&level, &path, start, goal);

        path.commit(&mut level).unwrap();
        assert!(level.segments_of_kind(SegmentKind::Stairway).count() >= 1);
        assert!(level.segments_of_kind(SegmentKind::Door).count() >= 2);

        let reached = level.reachable_from(IVec3::ZERO);
        assert!(reached.contains(&IVec3::new(9, 1, 1)));
        assert_eq!(level.room_at(IVec3::ZERO), Some(low));
        assert_eq!(level.room_at(IVec3::new(9, 1, 1)), Some(high));
    }

    #[test]
    fn test_stairway_wall_blocks_everything() {
        let mut level = Level::new(IVec3::new(4, 2, 8));
        for (from, to) in [
            (IVec3::new(0, 0, 2), IVec3::new(0, 1, 5)),
            (IVec3::new(0, 0, 3), IVec3::new(3, 1, 3)),
            (IVec3::new(3, 0, 2), IVec3::new(3, 1, 5)),
        ] {
            level.insert(Segment::Stairway(Stairway::new(from, to))).unwrap();
        }
        for x in 0..4 {
            for y in 0..2 {
                assert_eq!(level.occupancy(IVec3::new(x, y, 3)), Some(Occupancy::Stairway));
            }
        }

        let path = Pathfinder::new(level.size()).find_path(&level, IVec3::ZERO, IVec3::new(3, 0, 7));
        assert!(path.is_none());
    }

    #[test]
    fn test_out_of_bounds_goal() {
        let level = Level::new(IVec3::new(4, 1, 4));
        let mut pathfinder = Pathfinder::new(level.size());
        assert!(pathfinder.find_path(&level, IVec3::ZERO, IVec3::new(4, 0, 0)).is_none());
        assert!(pathfinder.find_path(&level, IVec3::NEG_ONE, IVec3::ZERO).is_none());
    }

    #[test]
    fn test_start_is_goal() {
        let level = Level::new(IVec3::new(4, 1, 4));
        let at = IVec3::new(1, 0, 1);
        let path = Pathfinder::new(level.size()).find_path(&level, at, at).unwrap();
        assert!(path.segments.is_empty());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn test_single_floor_never_uses_stairs() {
        let mut level = Level::new(IVec3::new(5, 1, 3));
        for x in 0..4 {
            level
                .insert(Segment::Hallway(Hallway::new(IVec3::new(x, 0, 2), IVec3::new(x + 1, 0, 2))))
                .unwrap();
        }
        let path = Pathfinder::new(level.size())
            .find_path(&level, IVec3::new(0, 0, 1), IVec3::new(4, 0, 1))
            .unwrap();
        assert!(path.segments.iter().all(|s| !s.is_stairway()));
        assert_legal(&level, &path, IVec3::new(0, 0, 1), IVec3::new(4, 0, 1));
    }

    #[test]
    fn test_stairway_must_exit_straight() {
        let straight = PathSegment::Hallway(Hallway::new(IVec3::new(3, 1, 0), IVec3::new(4, 1, 0)));
        let turn = PathSegment::Hallway(Hallway::new(IVec3::new(3, 1, 0), IVec3::new(3, 1, 1)));
        let stair = PathSegment::Stairway(Stairway::new(IVec3::ZERO, IVec3::new(3, 1, 0)));
        assert!(stair.satisfies_next_condition(&straight));
        assert!(!stair.satisfies_next_condition(&turn));
        assert!(!stair.satisfies_next_condition(&stair));
        assert!(straight.satisfies_next_condition(&stair));
    }

    #[test]
    fn test_reuses_node_storage_for_new_level_size() {
        let mut pathfinder = Pathfinder::new(IVec3::new(2, 1, 2));
        let level = Level::new(IVec3::new(6, 1, 6));
        let goal = IVec3::new(5, 0, 5);
        let path = pathfinder.find_path(&level, IVec3::ZERO, goal).unwrap();
        assert!(path.segments.len() >= 10);
        assert_legal(&level, &path, IVec3::ZERO, goal);
    }
}
