use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Dense 3D storage addressed by integer coordinate.
///
/// Every coordinate is shifted by `offset` before indexing, so a grid with
/// offset `(1, 0, 1)` stores position `(-1, 0, -1)` at index 0. The layout is
/// `x + size.x * y + size.x * size.y * z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid3D<T> {
    size: IVec3,
    offset: IVec3,
    data: Vec<T>,
}

impl<T: Default + Clone> Grid3D<T> {
    pub fn new(size: IVec3, offset: IVec3) -> Self {
        Self::filled(size, offset, T::default())
    }
}

impl<T: Clone> Grid3D<T> {
    pub fn filled(size: IVec3, offset: IVec3, value: T) -> Self {
        let len = size.max(IVec3::ZERO);
        Self {
            size,
            offset,
            data: vec![value; (len.x * len.y * len.z) as usize],
        }
    }
}

impl<T> Grid3D<T> {
    /// Build a grid by evaluating `value` at every position.
    pub fn from_fn(size: IVec3, offset: IVec3, mut value: impl FnMut(IVec3) -> T) -> Self {
        let len = size.max(IVec3::ZERO);
        let mut data = Vec::with_capacity((len.x * len.y * len.z) as usize);
        for z in 0..len.z {
            for y in 0..len.y {
                for x in 0..len.x {
                    data.push(value(IVec3::new(x, y, z) - offset));
                }
            }
        }
        Self { size, offset, data }
    }

    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn offset(&self) -> IVec3 {
        self.offset
    }

    /// Inclusive minimum and exclusive maximum corner, in grid coordinates.
    pub fn bounds(&self) -> (IVec3, IVec3) {
        (-self.offset, self.size - self.offset)
    }

    pub fn in_bounds(&self, pos: IVec3) -> bool {
        let p = pos + self.offset;
        p.x >= 0 && p.y >= 0 && p.z >= 0 && p.x < self.size.x && p.y < self.size.y && p.z < self.size.z
    }

    /// True when every position of the half-open box `[min, max)` is inside the grid.
    pub fn encloses(&self, min: IVec3, max: IVec3) -> bool {
        let (lo, hi) = self.bounds();
        min.cmpge(lo).all() && max.cmple(hi).all() && min.cmplt(max).all()
    }

    fn get_index(&self, pos: IVec3) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let p = pos + self.offset;
        Some((p.x + self.size.x * p.y + self.size.x * self.size.y * p.z) as usize)
    }

    pub fn get(&self, pos: IVec3) -> Option<&T> {
        self.get_index(pos).map(|idx| &self.data[idx])
    }

    pub fn get_mut(&mut self, pos: IVec3) -> Option<&mut T> {
        let idx = self.get_index(pos)?;
        Some(&mut self.data[idx])
    }

    /// Overwrite every cell with `value(pos)`.
    pub fn assign_all(&mut self, mut value: impl FnMut(IVec3) -> T) {
        for (pos, slot) in self.positions().zip(self.data.iter_mut()) {
            *slot = value(pos);
        }
    }

    /// Overwrite every cell of the half-open box `[min, max)`.
    /// Does nothing unless the whole box lies inside the grid.
    pub fn assign_bounds(&mut self, min: IVec3, max: IVec3, mut value: impl FnMut(IVec3) -> T) {
        if !self.encloses(min, max) {
            return;
        }
        for z in min.z..max.z {
            for y in min.y..max.y {
                for x in min.x..max.x {
                    let pos = IVec3::new(x, y, z);
                    self[pos] = value(pos);
                }
            }
        }
    }

    /// Every position in storage order.
    pub fn positions(&self) -> impl Iterator<Item = IVec3> {
        let size = self.size.max(IVec3::ZERO);
        let offset = self.offset;
        (0..size.z).flat_map(move |z| {
            (0..size.y).flat_map(move |y| (0..size.x).map(move |x| IVec3::new(x, y, z) - offset))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec3, &T)> {
        self.positions().zip(self.data.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (IVec3, &mut T)> {
        self.positions().zip(self.data.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<IVec3> for Grid3D<T> {
    type Output = T;

    fn index(&self, pos: IVec3) -> &T {
        match self.get_index(pos) {
            Some(idx) => &self.data[idx],
            None => panic!("position {pos} outside grid of size {}", self.size),
        }
    }
}

impl<T> IndexMut<IVec3> for Grid3D<T> {
    fn index_mut(&mut self, pos: IVec3) -> &mut T {
        match self.get_index(pos) {
            Some(idx) => &mut self.data[idx],
            None => panic!("position {pos} outside grid of size {}", self.size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_layout() {
        let mut grid: Grid3D<u32> = Grid3D::new(IVec3::new(3, 2, 4), IVec3::ZERO);
        grid[IVec3::new(2, 1, 3)] = 7;
        // x + size.x * y + size.x * size.y * z
        assert_eq!(grid.data[2 + 3 + 3 * 2 * 3], 7);
        assert_eq!(grid.len(), 24);
    }

    #[test]
    fn test_bounds_checks() {
        let grid: Grid3D<u8> = Grid3D::new(IVec3::new(2, 2, 2), IVec3::ZERO);
        assert!(grid.in_bounds(IVec3::new(1, 1, 1)));
        assert!(!grid.in_bounds(IVec3::new(2, 0, 0)));
        assert!(!grid.in_bounds(IVec3::new(0, -1, 0)));
        assert!(grid.get(IVec3::new(0, 0, 2)).is_none());
    }

    #[test]
    fn test_offset_shifts_positions() {
        let mut grid: Grid3D<i32> = Grid3D::new(IVec3::splat(3), IVec3::ONE);
        assert!(grid.in_bounds(IVec3::splat(-1)));
        assert!(!grid.in_bounds(IVec3::splat(2)));
        grid[IVec3::splat(-1)] = 5;
        assert_eq!(grid.data[0], 5);
        assert_eq!(grid.bounds(), (IVec3::splat(-1), IVec3::splat(2)));
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_panics() {
        let grid: Grid3D<u8> = Grid3D::new(IVec3::splat(2), IVec3::ZERO);
        let _ = grid[IVec3::new(0, 0, 5)];
    }

    #[test]
    fn test_from_fn_and_positions_agree() {
        let grid = Grid3D::from_fn(IVec3::new(2, 3, 2), IVec3::ZERO, |p| p);
        for (pos, value) in grid.iter() {
            assert_eq!(pos, *value);
        }
        assert_eq!(grid.positions().count(), 12);
    }

    #[test]
    fn test_assign_bounds_requires_enclosure() {
        let mut grid: Grid3D<u8> = Grid3D::new(IVec3::splat(4), IVec3::ZERO);
        grid.assign_bounds(IVec3::ZERO, IVec3::splat(5), |_| 1);
        assert!(grid.iter().all(|(_, v)| *v == 0));

        grid.assign_bounds(IVec3::ONE, IVec3::splat(3), |_| 1);
        assert_eq!(grid.iter().filter(|(_, v)| **v == 1).count(), 8);
    }

    #[test]
    fn test_assign_all() {
        let mut grid: Grid3D<i32> = Grid3D::new(IVec3::splat(2), IVec3::ZERO);
        grid.assign_all(|p| p.x + p.y + p.z);
        assert_eq!(grid[IVec3::ONE], 3);
    }
}
