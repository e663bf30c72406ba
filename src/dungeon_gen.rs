use std::collections::HashSet;

use glam::IVec3;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::DungeonConfig;
use crate::delaunay::{Triangulation, Vertex};
use crate::error::GenerationError;
use crate::level::Level;
use crate::mst::{add_extra_edges, minimum_spanning_tree, WeightedEdge};
use crate::pathfinding::Pathfinder;
use crate::segment::{Room, Segment, SegmentId, SegmentKind};

/// A room pair joined by a committed path.
#[derive(Clone, Debug, Serialize)]
pub struct RoomConnection {
    pub rooms: (SegmentId, SegmentId),
    /// Floor cells the path ran between
    pub from: IVec3,
    pub to: IVec3,
    /// Segments the path created, in commit order
    pub segments: Vec<SegmentId>,
    pub cost: f32,
    pub stairways: usize,
}

/// Result of dungeon generation
pub struct DungeonResult {
    pub level: Level,
    /// Room segment ids in placement order
    pub rooms: Vec<SegmentId>,
    /// Candidate room pairs from the tetrahedralization (or the complete graph fallback)
    pub triangulation_edges: Vec<WeightedEdge<SegmentId>>,
    pub mst_edges: Vec<WeightedEdge<SegmentId>>,
    pub extra_edges: Vec<WeightedEdge<SegmentId>>,
    pub connections: Vec<RoomConnection>,
    /// Room pairs for which no path existed
    pub failed_connections: Vec<(SegmentId, SegmentId)>,
}

/// Counts for printing or logging a finished dungeon.
#[derive(Clone, Debug, Serialize)]
pub struct DungeonSummary {
    pub size: IVec3,
    pub rooms: usize,
    pub triangulation_edges: usize,
    pub mst_edges: usize,
    pub extra_edges: usize,
    pub hallways: usize,
    pub stairways: usize,
    pub doors: usize,
    pub connections: Vec<RoomConnection>,
    pub failed_connections: Vec<(SegmentId, SegmentId)>,
    pub reachable_rooms: usize,
}

impl DungeonResult {
    /// Rooms that can be walked to from the first room.
    pub fn reachable_rooms(&self) -> Vec<SegmentId> {
        let Some(start) = self
            .rooms
            .first()
            .and_then(|id| self.level.segment(*id))
            .and_then(Segment::as_room)
            .and_then(|room| room.shape().first().copied())
        else {
            return Vec::new();
        };

        let reached: HashSet<SegmentId> = self
            .level
            .reachable_from(start)
            .into_iter()
            .filter_map(|pos| self.level.room_at(pos))
            .collect();
        self.rooms.iter().copied().filter(|id| reached.contains(id)).collect()
    }

    pub fn summary(&self) -> DungeonSummary {
        let count = |kind| self.level.segments_of_kind(kind).count();
        DungeonSummary {
            size: self.level.size(),
            rooms: self.rooms.len(),
            triangulation_edges: self.triangulation_edges.len(),
            mst_edges: self.mst_edges.len(),
            extra_edges: self.extra_edges.len(),
            hallways: count(SegmentKind::Hallway),
            stairways: count(SegmentKind::Stairway),
            doors: count(SegmentKind::Door),
            connections: self.connections.clone(),
            failed_connections: self.failed_connections.clone(),
            reachable_rooms: self.reachable_rooms().len(),
        }
    }
}

pub struct DungeonGenerator<'a> {
    config: &'a DungeonConfig,
    level: Level,
    rooms: Vec<SegmentId>,
}

impl<'a> DungeonGenerator<'a> {
    pub fn new(config: &'a DungeonConfig) -> Self {
        Self {
            config,
            level: Level::new(config.size),
            rooms: Vec::new(),
        }
    }

    /// Generate a dungeon, seeding from `config.seed` or from entropy.
    pub fn generate(config: &DungeonConfig) -> Result<DungeonResult, GenerationError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate_with_rng(config, &mut rng)
    }

    pub fn generate_with_rng(config: &DungeonConfig, rng: &mut impl Rng) -> Result<DungeonResult, GenerationError> {
        puffin::profile_function!();
        config.validate()?;

        let mut gen = DungeonGenerator::new(config);

        gen.place_rooms(rng)?;

        let triangulation_edges = gen.candidate_edges();
        let (mst_edges, extra_edges) = {
            puffin::profile_scope!("select_edges");
            let start = gen.rooms.first().copied();
            let mst = start.map_or_else(Vec::new, |start| minimum_spanning_tree(&triangulation_edges, start));
            let extra = add_extra_edges(&triangulation_edges, &mst, config.extra_hallway_chance, rng);
            (mst, extra)
        };

        let mut connections = Vec::new();
        let mut failed_connections = Vec::new();
        {
            puffin::profile_scope!("connect_rooms");
            // Paths are found one at a time so each sees the ones committed before it
            let mut pathfinder = Pathfinder::new(config.size);
            for edge in mst_edges.iter().chain(&extra_edges) {
                match gen.connect(&mut pathfinder, edge.u, edge.v)? {
                    Some(connection) => connections.push(connection),
                    None => failed_connections.push((edge.u, edge.v)),
                }
            }
        }

        info!(
            "generated {} rooms, {} candidate edges, {} tree + {} extra connections ({} failed)",
            gen.rooms.len(),
            triangulation_edges.len(),
            mst_edges.len(),
            extra_edges.len(),
            failed_connections.len()
        );

        Ok(DungeonResult {
            level: gen.level,
            rooms: gen.rooms,
            triangulation_edges,
            mst_edges,
            extra_edges,
            connections,
            failed_connections,
        })
    }

    /// Place random box rooms until the target count is reached or too many
    /// placements in a row have failed.
    fn place_rooms(&mut self, rng: &mut impl Rng) -> Result<(), GenerationError> {
        puffin::profile_scope!("place_rooms");

        let size = self.config.size;
        let (min_size, max_size) = (self.config.room_min_size, self.config.room_max_size);
        let (buffer_offset, buffer_grow) = DungeonConfig::room_buffer();
        let mut failures = 0;

        while self.rooms.len() < self.config.room_count {
            if failures >= self.config.max_placement_attempts {
                warn!(
                    "room placement gave up after {} failed attempts ({} of {} rooms placed)",
                    failures,
                    self.rooms.len(),
                    self.config.room_count
                );
                break;
            }
            failures += 1;

            let origin = IVec3::new(
                rng.gen_range(0..size.x),
                rng.gen_range(0..size.y),
                rng.gen_range(0..size.z),
            );
            let room_size = IVec3::new(
                rng.gen_range(min_size.x..=max_size.x),
                rng.gen_range(min_size.y..=max_size.y),
                rng.gen_range(min_size.z..=max_size.z),
            );

            let buffer = Room::cuboid(origin + buffer_offset, room_size + buffer_grow);
            if !buffer.in_bounds(self.level.grid()) {
                continue;
            }
            if self.level.rooms().any(|(_, room)| room.intersects(&buffer)) {
                continue;
            }

            let id = self.level.insert(Segment::Room(Room::cuboid(origin, room_size)))?;
            debug!("placed room {} at {} size {}", id, origin, room_size);
            self.rooms.push(id);
            failures = 0;
        }

        Ok(())
    }

    fn room(&self, id: SegmentId) -> Option<&Room> {
        self.level.segment(id).and_then(Segment::as_room)
    }

    /// Room pairs worth connecting, weighted by center distance.
    ///
    /// Uses the tetrahedralization of room centers. When that leaves rooms
    /// disconnected (fewer than four rooms, or degenerate placements) every
    /// pair of rooms is offered instead.
    fn candidate_edges(&self) -> Vec<WeightedEdge<SegmentId>> {
        puffin::profile_scope!("triangulate");

        let centers: Vec<Vertex<SegmentId>> = self
            .rooms
            .iter()
            .filter_map(|id| self.room(*id).map(|room| Vertex::new(room.center(), *id)))
            .collect();

        let triangulation = Triangulation::triangulate(centers.clone());
        let edges: Vec<_> = triangulation
            .edges
            .iter()
            .map(|edge| {
                let (a, b) = (&triangulation.vertices[edge.u], &triangulation.vertices[edge.v]);
                WeightedEdge::new(a.payload, b.payload, a.position.distance(b.position))
            })
            .collect();

        let spanning = match self.rooms.first() {
            Some(start) => minimum_spanning_tree(&edges, *start).len() + 1 >= self.rooms.len(),
            None => true,
        };
        if spanning {
            return edges;
        }

        debug!(
            "triangulation of {} rooms does not connect them all, using every pair",
            centers.len()
        );
        let mut complete = Vec::new();
        for (i, a) in centers.iter().enumerate() {
            for b in &centers[i + 1..] {
                complete.push(WeightedEdge::new(a.payload, b.payload, a.position.distance(b.position)));
            }
        }
        complete
    }

    /// Closest pair of floor cells between two rooms.
    fn closest_floor_positions(&self, a: SegmentId, b: SegmentId) -> Option<(IVec3, IVec3)> {
        let (a, b) = (self.room(a)?, self.room(b)?);
        let targets = b.floor_positions();
        a.floor_positions()
            .into_iter()
            .flat_map(|from| targets.iter().map(move |to| (from, *to)))
            .min_by_key(|(from, to)| (*from - *to).length_squared())
    }

    /// Path between two rooms and commit it. `Ok(None)` when no path exists.
    fn connect(
        &mut self,
        pathfinder: &mut Pathfinder,
        a: SegmentId,
        b: SegmentId,
    ) -> Result<Option<RoomConnection>, GenerationError> {
        let Some((from, to)) = self.closest_floor_positions(a, b) else {
            warn!("rooms {} and {} have no floor cells to connect", a, b);
            return Ok(None);
        };

        let Some(path) = pathfinder.find_path(&self.level, from, to) else {
            warn!("no path between rooms {} and {} ({} -> {})", a, b, from, to);
            return Ok(None);
        };

        let segments = path.commit(&mut self.level)?;
        let stairways = path.segments.iter().filter(|s| s.is_stairway()).count();
        debug!(
            "connected {} and {}: {} moves, {} stairways, cost {:.1}",
            a,
            b,
            path.segments.len(),
            stairways,
            path.cost
        );

        Ok(Some(RoomConnection {
            rooms: (a, b),
            from,
            to,
            segments,
            cost: path.cost,
            stairways,
        }))
    }
}
