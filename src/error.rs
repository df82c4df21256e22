//! Error taxonomy for loading, validating, tracing, solving and rendering.
//!
//! Running out of candidates is not an error; see `solver::Outcome`.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Point;

/// Structural problems with a grid description.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no rows")]
    Empty,

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell character {code:?} in grid row {row}")]
    UnknownCell { row: usize, code: char },
}

/// Input errors, detected before any candidate is generated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("puzzle has no lasers")]
    NoLasers,

    #[error("puzzle has no target points")]
    NoTargets,

    #[error("laser direction ({dx}, {dy}) is not a unit lattice step")]
    InvalidDirection { dx: i32, dy: i32 },

    #[error("laser origin {point} lies outside the board")]
    LaserOutOfBounds { point: Point },

    #[error("target {point} lies outside the board")]
    TargetOutOfBounds { point: Point },

    #[error("{needed} blocks to place but only {available} empty cells")]
    InsufficientSlots { needed: usize, available: usize },
}

/// Failures inside a single trace. Either one aborts the whole search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("trace from {origin} exceeded its budget of {budget} steps")]
    StepBudgetExceeded { origin: Point, budget: usize },

    #[error("board reports a block at non-cell coordinate {point}")]
    CorruptCell { point: Point },
}

/// Failures that abort a search.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("failed to start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures while reading a `.bff` puzzle description.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}: {content:?}")]
    Malformed {
        line: usize,
        content: String,
        reason: &'static str,
    },

    #[error("line {line}: {value:?} is not a valid integer")]
    BadNumber {
        line: usize,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("missing GRID START / GRID STOP section")]
    MissingGrid,

    #[error("GRID START on line {line} is never closed")]
    UnclosedGrid { line: usize },

    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
}

/// Failures while writing a rendered solution.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to save image to '{}'", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("board of {rows}x{columns} cells is too large to render")]
    TooLarge { rows: usize, columns: usize },
}
