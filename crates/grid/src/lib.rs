//! Spatial foundation for the hexkeep simulation.
//!
//! ## Coordinates
//!
//! - [`Position`] — axial hex coordinate with distance, neighbors, pixel
//!   conversion, interpolated lines, and a lazy shuffled flood iterator
//!
//! ## Scheduling
//!
//! - [`PriorityQueue`] — indexed min-heap with lazy deletion and
//!   re-prioritization, insertion-ordered tie breaking
//!
//! ## Planning
//!
//! - [`astar`] — bounded ε-admissible A* over an occupancy predicate
//! - [`flood_path`] — breadth-first fallback planner with the same contract
mod hex;
mod path;
mod pqueue;

pub use hex::*;
pub use path::*;
pub use pqueue::*;
