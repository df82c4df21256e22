//! Lazor Puzzle Solver Library
//!
//! Places reflective, opaque and refractive blocks on a grid so that a set of
//! laser beams lights every target point. The tracer follows beams through a
//! board, the enumerator produces candidate placements and the solver tests
//! them in a fixed order until one covers all targets.

pub mod bff;
pub mod blocks;
pub mod enumerator;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod render;
pub mod solver;
pub mod tracer;

pub use blocks::{Block, Cell, Inventory};
pub use error::{GridError, LoadError, PuzzleError, RenderError, SolveError, TraceError};
pub use geometry::{CellIndex, Direction, Point};
pub use grid::{Board, Candidate, Grid};
pub use solver::{Outcome, Puzzle, Solution, Solver, SolverConfig};
pub use tracer::{Laser, Trace, Tracer};
