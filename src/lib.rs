//! Voxel dungeon generation.
//!
//! Rooms are placed on a 3D grid, candidate connections come from a Delaunay
//! tetrahedralization of room centers, a minimum spanning tree (plus a few
//! random extra edges) picks the pairs to join, and a segment pathfinder
//! carves hallways and stairways between them one pair at a time.
//!
//! | Module | Role |
//! |---|---|
//! | [`grid`] | dense 3D storage |
//! | [`cell`], [`level`] | cell memberships and connections, segment arena |
//! | [`segment`] | rooms, hallways, stairways, doors |
//! | [`delaunay`] | Bowyer–Watson tetrahedralization |
//! | [`mst`] | Prim's spanning tree and extra edges |
//! | [`pathfinding`] | hallway/stairway search |
//! | [`dungeon_gen`] | the full pipeline |

pub mod cell;
pub mod config;
pub mod constants;
pub mod delaunay;
pub mod dungeon_gen;
pub mod error;
pub mod flood_fill;
pub mod grid;
pub mod level;
pub mod mst;
pub mod pathfinding;
pub mod segment;

pub use config::DungeonConfig;
pub use dungeon_gen::{DungeonGenerator, DungeonResult};
pub use error::{ConfigError, GenerationError, LevelError};
pub use level::Level;
pub use pathfinding::{Path, Pathfinder};
