use std::collections::HashSet;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::grid::Grid3D;

/// A room volume: a set of occupied cells in level coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    origin: IVec3,
    shape: Vec<IVec3>,
}

impl Room {
    /// A room from an arbitrary set of cells. Duplicate positions are dropped.
    pub fn new(origin: IVec3, shape: impl IntoIterator<Item = IVec3>) -> Self {
        let mut seen = HashSet::new();
        let shape = shape.into_iter().filter(|p| seen.insert(*p)).collect();
        Self { origin, shape }
    }

    /// An axis-aligned box room covering `[min, min + size)`.
    pub fn cuboid(min: IVec3, size: IVec3) -> Self {
        let mut shape = Vec::new();
        for z in min.z..min.z + size.z {
            for y in min.y..min.y + size.y {
                for x in min.x..min.x + size.x {
                    shape.push(IVec3::new(x, y, z));
                }
            }
        }
        Self { origin: min, shape }
    }

    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    pub fn shape(&self) -> &[IVec3] {
        &self.shape
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        self.shape.contains(&pos)
    }

    /// Inclusive minimum and exclusive maximum corner of the room's cells.
    pub fn bounds(&self) -> Option<(IVec3, IVec3)> {
        let first = *self.shape.first()?;
        let (min, max) = self
            .shape
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some((min, max + IVec3::ONE))
    }

    /// Mean of the occupied cell positions.
    pub fn center(&self) -> Vec3 {
        if self.shape.is_empty() {
            return self.origin.as_vec3();
        }
        let sum: Vec3 = self.shape.iter().map(|p| p.as_vec3()).sum();
        sum / self.shape.len() as f32
    }

    pub fn intersects(&self, other: &Room) -> bool {
        let ours: HashSet<IVec3> = self.shape.iter().copied().collect();
        other.shape.iter().any(|p| ours.contains(p))
    }

    pub fn in_bounds<T>(&self, grid: &Grid3D<T>) -> bool {
        self.shape.iter().all(|p| grid.in_bounds(*p))
    }

    /// Cells with no cell of this room directly below them.
    ///
    /// These are the cells a hallway can attach to at walking height.
    pub fn floor_positions(&self) -> Vec<IVec3> {
        let ours: HashSet<IVec3> = self.shape.iter().copied().collect();
        self.shape
            .iter()
            .copied()
            .filter(|p| !ours.contains(&(*p - IVec3::Y)))
            .collect()
    }

    pub fn translate(&mut self, amount: IVec3) {
        self.origin += amount;
        for p in &mut self.shape {
            *p += amount;
        }
    }
}
