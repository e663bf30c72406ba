//! Incremental Bowyer–Watson tetrahedralization.
//!
//! Simplices refer to vertices by index into [`Triangulation::vertices`].
//! During construction four extra "super" corners are appended after the
//! input vertices; every simplex touching them is dropped before returning,
//! so all indices in the result are below `vertices.len()`.

use std::collections::HashSet;

use glam::{DMat4, DVec3, DVec4, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{SUPER_TETRAHEDRON_MARGIN, SUPER_TETRAHEDRON_SCALE, VERTEX_ALMOST_EQUAL_SQUARED};

/// A point carrying an opaque payload (typically the room it stands for).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex<T> {
    pub position: Vec3,
    pub payload: T,
}

impl<T> Vertex<T> {
    pub fn new(position: Vec3, payload: T) -> Self {
        Self { position, payload }
    }
}

fn almost_equal(a: DVec3, b: DVec3) -> bool {
    a.distance_squared(b) < VERTEX_ALMOST_EQUAL_SQUARED as f64
}

/// An undirected edge between two vertex indices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
}

impl Edge {
    pub fn new(u: usize, v: usize) -> Self {
        Self { u, v }
    }

    fn key(&self) -> (usize, usize) {
        (self.u.min(self.v), self.u.max(self.v))
    }

    /// Positional comparison with tolerance, independent of endpoint order.
    pub fn almost_equal(&self, other: &Edge, positions: &[DVec3]) -> bool {
        let p = |i: usize| positions[i];
        (almost_equal(p(self.u), p(other.u)) && almost_equal(p(self.v), p(other.v)))
            || (almost_equal(p(self.u), p(other.v)) && almost_equal(p(self.v), p(other.u)))
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// An unordered triple of vertex indices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triangle {
    pub u: usize,
    pub v: usize,
    pub w: usize,
}

impl Triangle {
    pub fn new(u: usize, v: usize, w: usize) -> Self {
        Self { u, v, w }
    }

    fn key(&self) -> [usize; 3] {
        let mut key = [self.u, self.v, self.w];
        key.sort_unstable();
        key
    }

    /// Every corner of `self` lies within tolerance of some corner of `other`.
    pub fn almost_equal(&self, other: &Triangle, positions: &[DVec3]) -> bool {
        let theirs = [other.u, other.v, other.w].map(|i| positions[i]);
        [self.u, self.v, self.w]
            .iter()
            .all(|i| theirs.iter().any(|p| almost_equal(positions[*i], *p)))
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Triangle {}

impl std::hash::Hash for Triangle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Four vertex indices plus the circumsphere computed when it was built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tetrahedron {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    circumcenter: DVec3,
    circumradius_squared: f64,
}

impl Tetrahedron {
    fn new(a: usize, b: usize, c: usize, d: usize, positions: &[DVec3]) -> Self {
        let (circumcenter, circumradius_squared) =
            circumsphere([positions[a], positions[b], positions[c], positions[d]]);
        Self {
            a,
            b,
            c,
            d,
            circumcenter,
            circumradius_squared,
        }
    }

    pub fn indices(&self) -> [usize; 4] {
        [self.a, self.b, self.c, self.d]
    }

    pub fn circumcenter(&self) -> DVec3 {
        self.circumcenter
    }

    pub fn circumradius_squared(&self) -> f64 {
        self.circumradius_squared
    }

    pub fn circumsphere_contains(&self, point: DVec3) -> bool {
        point.distance_squared(self.circumcenter) <= self.circumradius_squared
    }

    pub fn has_vertex(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }

    pub fn faces(&self) -> [Triangle; 4] {
        let [a, b, c, d] = self.indices();
        [
            Triangle::new(a, b, c),
            Triangle::new(a, b, d),
            Triangle::new(a, c, d),
            Triangle::new(b, c, d),
        ]
    }

    pub fn edges(&self) -> [Edge; 6] {
        let [a, b, c, d] = self.indices();
        [
            Edge::new(a, b),
            Edge::new(b, c),
            Edge::new(c, a),
            Edge::new(d, a),
            Edge::new(d, b),
            Edge::new(d, c),
        ]
    }

    fn key(&self) -> [usize; 4] {
        let mut key = self.indices();
        key.sort_unstable();
        key
    }
}

/// Order-independent: two tetrahedra are equal when they share all four vertices.
impl PartialEq for Tetrahedron {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Tetrahedron {}

/// Center and squared radius of the sphere through four points.
///
/// Uses the determinant form: with `a = |x y z 1|`, `Dx`, `Dy`, `Dz` the
/// minors replacing one coordinate column by `|p|²`, and `c` the minor
/// replacing the ones column, the center is `(Dx, Dy, Dz) / 2a` and the
/// squared radius is `(Dx² + Dy² + Dz² - 4ac) / 4a²`. Coplanar input makes
/// `a` zero and the result non-finite.
fn circumsphere(p: [DVec3; 4]) -> (DVec3, f64) {
    let row = |f: fn(DVec3) -> f64| DVec4::new(f(p[0]), f(p[1]), f(p[2]), f(p[3]));
    let xs = row(|v| v.x);
    let ys = row(|v| v.y);
    let zs = row(|v| v.z);
    let sqs = row(|v| v.length_squared());
    let ones = DVec4::ONE;

    // det(M) == det(Mᵀ), so the rows can be passed as columns
    let a = DMat4::from_cols(xs, ys, zs, ones).determinant();
    let dx = DMat4::from_cols(sqs, ys, zs, ones).determinant();
    let dy = -DMat4::from_cols(sqs, xs, zs, ones).determinant();
    let dz = DMat4::from_cols(sqs, xs, ys, ones).determinant();
    let c = DMat4::from_cols(sqs, xs, ys, zs).determinant();

    let center = DVec3::new(dx, dy, dz) / (2.0 * a);
    let radius_squared = (dx * dx + dy * dy + dz * dz - 4.0 * a * c) / (4.0 * a * a);
    (center, radius_squared)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangulation<T> {
    pub vertices: Vec<Vertex<T>>,
    pub edges: Vec<Edge>,
    pub triangles: Vec<Triangle>,
    pub tetrahedra: Vec<Tetrahedron>,
}

impl<T> Triangulation<T> {
    /// Tetrahedralize `vertices`, inserting them in order.
    ///
    /// Fewer than four vertices (or a degenerate set) produce no simplices.
    pub fn triangulate(vertices: Vec<Vertex<T>>) -> Self {
        puffin::profile_function!();

        let mut result = Self {
            vertices,
            edges: Vec::new(),
            triangles: Vec::new(),
            tetrahedra: Vec::new(),
        };
        if result.vertices.is_empty() {
            return result;
        }

        let mut positions: Vec<DVec3> = result.vertices.iter().map(|v| v.position.as_dvec3()).collect();
        let n = positions.len();

        let (min, max) = positions
            .iter()
            .fold((positions[0], positions[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        let delta_max = (max - min).max_element() * SUPER_TETRAHEDRON_SCALE as f64;
        let margin = SUPER_TETRAHEDRON_MARGIN as f64;
        let lo = min - DVec3::splat(margin);
        positions.extend([
            lo,
            DVec3::new(max.x + delta_max, lo.y, lo.z),
            DVec3::new(lo.x, max.y + delta_max, lo.z),
            DVec3::new(lo.x, lo.y, max.z + delta_max),
        ]);
        let super_corners = n..n + 4;

        let mut tetrahedra = vec![Tetrahedron::new(n, n + 1, n + 2, n + 3, &positions)];

        for index in 0..n {
            let point = positions[index];

            let mut cavity = Vec::new();
            tetrahedra.retain(|t: &Tetrahedron| {
                if t.circumsphere_contains(point) {
                    cavity.extend(t.faces());
                    false
                } else {
                    true
                }
            });

            // Faces shared by two bad tetrahedra are interior to the cavity.
            let mut interior = vec![false; cavity.len()];
            for i in 0..cavity.len() {
                for j in i + 1..cavity.len() {
                    if cavity[i].almost_equal(&cavity[j], &positions) {
                        interior[i] = true;
                        interior[j] = true;
                    }
                }
            }

            for (face, _) in cavity.iter().zip(&interior).filter(|(_, inner)| !**inner) {
                tetrahedra.push(Tetrahedron::new(face.u, face.v, face.w, index, &positions));
            }
        }

        tetrahedra.retain(|t| !super_corners.clone().any(|corner| t.has_vertex(corner)));

        let mut triangle_set = HashSet::new();
        let mut edge_set = HashSet::new();
        for t in &tetrahedra {
            for face in t.faces() {
                if triangle_set.insert(face) {
                    result.triangles.push(face);
                }
            }
            for edge in t.edges() {
                if edge_set.insert(edge) {
                    result.edges.push(edge);
                }
            }
        }
        result.tetrahedra = tetrahedra;

        log::trace!(
            "triangulated {} vertices: {} tetrahedra, {} triangles, {} edges",
            n,
            result.tetrahedra.len(),
            result.triangles.len(),
            result.edges.len()
        );
        result
    }

    /// Payloads at both ends of an edge.
    pub fn edge_payloads(&self, edge: &Edge) -> (&T, &T) {
        (&self.vertices[edge.u].payload, &self.vertices[edge.v].payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vertices(count: usize, seed: u64) -> Vec<Vertex<usize>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                let p = Vec3::new(
                    rng.gen_range(0.0..50.0),
                    rng.gen_range(0.0..50.0),
                    rng.gen_range(0.0..50.0),
                );
                Vertex::new(p, i)
            })
            .collect()
    }

    #[test]
    fn test_circumsphere_of_corner_tetrahedron() {
        let (center, r2) = circumsphere([
            DVec3::ZERO,
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(0.0, 0.0, 2.0),
        ]);
        assert!(center.distance(DVec3::ONE) < 1e-9);
        assert!((r2 - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_tetrahedron() {
        let vertices = vec![
            Vertex::new(Vec3::ZERO, 'a'),
            Vertex::new(Vec3::new(10.0, 0.0, 0.0), 'b'),
            Vertex::new(Vec3::new(0.0, 10.0, 0.0), 'c'),
            Vertex::new(Vec3::new(0.0, 0.0, 10.0), 'd'),
        ];
        let tri = Triangulation::triangulate(vertices);
        assert_eq!(tri.tetrahedra.len(), 1);
        assert_eq!(tri.triangles.len(), 4);
        assert_eq!(tri.edges.len(), 6);
    }

    #[test]
    fn test_too_few_vertices_give_nothing() {
        for count in 0..4 {
            let tri = Triangulation::triangulate(random_vertices(count, 1));
            assert!(tri.tetrahedra.is_empty());
            assert!(tri.edges.is_empty());
            assert!(tri.triangles.is_empty());
        }
    }

    #[test]
    fn test_no_super_vertex_survives() {
        let tri = Triangulation::triangulate(random_vertices(16, 9));
        let n = tri.vertices.len();
        assert!(!tri.tetrahedra.is_empty());
        assert!(tri.tetrahedra.iter().all(|t| t.indices().iter().all(|i| *i < n)));
        assert!(tri.edges.iter().all(|e| e.u < n && e.v < n));
        assert!(tri.triangles.iter().all(|t| t.u < n && t.v < n && t.w < n));
    }

    #[test]
    fn test_empty_circumsphere() {
        for seed in 0..4 {
            let tri = Triangulation::triangulate(random_vertices(12, seed));
            for t in &tri.tetrahedra {
                for (i, vertex) in tri.vertices.iter().enumerate() {
                    if t.has_vertex(i) {
                        continue;
                    }
                    let d2 = vertex.position.as_dvec3().distance_squared(t.circumcenter());
                    assert!(
                        d2 >= t.circumradius_squared() * (1.0 - 1e-6),
                        "vertex {i} inside circumsphere of {:?}",
                        t.indices()
                    );
                }
            }
        }
    }

    #[test]
    fn test_edges_and_triangles_are_unique() {
        let tri = Triangulation::triangulate(random_vertices(10, 5));
        let edges: HashSet<Edge> = tri.edges.iter().copied().collect();
        let triangles: HashSet<Triangle> = tri.triangles.iter().copied().collect();
        assert_eq!(edges.len(), tri.edges.len());
        assert_eq!(triangles.len(), tri.triangles.len());
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(Edge::new(1, 2), Edge::new(2, 1));
        assert_eq!(Triangle::new(1, 2, 3), Triangle::new(3, 1, 2));
        let positions = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        let t1 = Tetrahedron::new(0, 1, 2, 3, &positions);
        let t2 = Tetrahedron::new(3, 2, 1, 0, &positions);
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_almost_equal_uses_positions() {
        let positions = vec![DVec3::ZERO, DVec3::X, DVec3::new(0.01, 0.0, 0.0), DVec3::Y];
        assert!(Edge::new(0, 1).almost_equal(&Edge::new(1, 2), &positions));
        assert!(!Edge::new(0, 1).almost_equal(&Edge::new(0, 3), &positions));
        assert!(Triangle::new(0, 1, 3).almost_equal(&Triangle::new(3, 2, 1), &positions));
    }
}
