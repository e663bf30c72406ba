//! Dungeon generation constants.

/// Default grid width (X)
pub const DUNGEON_DEFAULT_WIDTH: i32 = 40;
/// Default grid height (Y), i.e. number of floors
pub const DUNGEON_DEFAULT_HEIGHT: i32 = 6;
/// Default grid depth (Z)
pub const DUNGEON_DEFAULT_DEPTH: i32 = 40;
/// Number of rooms the generator tries to place
pub const DUNGEON_DEFAULT_ROOM_COUNT: usize = 12;
/// Smallest box room (x, y, z)
pub const DUNGEON_ROOM_MIN_SIZE: [i32; 3] = [2, 1, 2];
/// Largest box room (x, y, z)
pub const DUNGEON_ROOM_MAX_SIZE: [i32; 3] = [6, 3, 6];
/// Chance that a non-MST triangulation edge also gets a hallway
pub const DUNGEON_EXTRA_HALLWAY_CHANCE: f64 = 0.05;
/// Consecutive failed placements before room placement gives up
pub const DUNGEON_MAX_PLACEMENT_ATTEMPTS: u32 = 1000;
/// Padding kept free around every room (applied on -X/-Y/-Z, doubled on X and Z, once on Y)
pub const DUNGEON_ROOM_BUFFER: i32 = 1;
