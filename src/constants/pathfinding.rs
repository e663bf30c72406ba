//! Segment pathfinding costs.

/// Cost marker meaning "this move is not allowed"
pub const NON_TRAVERSABLE: f32 = -1.0;
/// How close a cost must be to [`NON_TRAVERSABLE`] to count as the marker
pub const NON_TRAVERSABLE_TOLERANCE: f32 = 0.001;
/// Extra cost for routing a hallway through a room cell
pub const HALLWAY_ROOM_PENALTY: f32 = 5.0;
/// Extra cost for carving a hallway into an empty cell (reusing a hallway costs nothing)
pub const HALLWAY_EMPTY_PENALTY: f32 = 1.0;
/// Fixed cost of building a staircase
pub const STAIRWAY_BASE_COST: f32 = 100.0;
/// Horizontal cells spanned by a stairway proposal, landings included
pub const STAIRWAY_HORIZONTAL_SPAN: i32 = 3;
