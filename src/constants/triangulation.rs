//! Delaunay triangulation tolerances.

/// Squared distance below which two vertices are treated as the same point
pub const VERTEX_ALMOST_EQUAL_SQUARED: f32 = 0.01;
/// Super-tetrahedron corners sit this many bounding-box extents past the input
pub const SUPER_TETRAHEDRON_SCALE: f32 = 2.0;
/// Margin between the input bounding box and the super-tetrahedron's base corner
pub const SUPER_TETRAHEDRON_MARGIN: f32 = 1.0;
