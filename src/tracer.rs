//! Breadth-first beam tracer.
//!
//! A trace follows one laser through a fixed board, splitting at refractive
//! blocks, and records every lattice point any branch passes. Branches live
//! in an explicit work queue of `BeamState`s; a state that was already
//! expanded is dropped, which is what breaks closed reflective loops.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::blocks::Block;
use crate::error::TraceError;
use crate::geometry::{Direction, Point, Surface};
use crate::grid::{Board, Site};

/// Default cap on lattice steps per trace, across all branches.
pub const DEFAULT_STEP_BUDGET: usize = 100_000;

/// A laser emitter: origin in doubled coordinates and a unit step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Laser {
    pub origin: Point,
    pub direction: Direction,
}

impl Laser {
    pub const fn new(origin: Point, direction: Direction) -> Self {
        Self { origin, direction }
    }
}

/// One traceable beam segment; also the deduplication key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BeamState {
    pub position: Point,
    pub direction: Direction,
}

impl BeamState {
    pub const fn new(position: Point, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }
}

/// What a block does to a beam striking it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deflection {
    Absorbed,
    Reflected(Direction),
    Split {
        transmitted: Direction,
        reflected: Direction,
    },
}

/// Applies the interaction rule for `block` struck from `impact` while
/// travelling in `incoming`.
#[inline]
pub fn deflect(block: Block, impact: Point, incoming: Direction) -> Deflection {
    let surface = Surface::at(impact);
    match block {
        Block::Reflective => Deflection::Reflected(incoming.reflect(surface)),
        Block::Opaque => Deflection::Absorbed,
        Block::Refractive => Deflection::Split {
            transmitted: incoming,
            reflected: incoming.reflect(surface),
        },
    }
}

/// Everything one laser lit on one board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    segments: Vec<Vec<Point>>,
}

impl Trace {
    /// Straight polylines, one per expanded beam state, in expansion order.
    pub fn segments(&self) -> &[Vec<Point>] {
        &self.segments
    }

    /// Every recorded point in visit order; points on several branches repeat.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.segments.iter().flatten().copied()
    }

    pub fn hits(&self) -> FxHashSet<Point> {
        let mut hits = FxHashSet::default();
        self.extend_hits(&mut hits);
        hits
    }

    pub fn extend_hits(&self, hits: &mut FxHashSet<Point>) {
        hits.extend(self.points());
    }

    pub fn contains(&self, point: Point) -> bool {
        self.points().any(|p| p == point)
    }
}

/// Traces lasers under a fixed step budget.
#[derive(Clone, Copy, Debug)]
pub struct Tracer {
    step_budget: usize,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_BUDGET)
    }
}

impl Tracer {
    pub const fn new(step_budget: usize) -> Self {
        Self { step_budget }
    }

    /// Traces `laser` through `board`, following every split.
    ///
    /// Before each step the beam checks the block across the face it sits on,
    /// or from a corner the centre it is heading into. Reflections restart
    /// from the impact point, transmitted beams continue one step past it, and
    /// an absorbed beam records the block it hit.
    pub fn trace(&self, board: &impl Board, laser: Laser) -> Result<Trace, TraceError> {
        let mut queue = VecDeque::from([BeamState::new(laser.origin, laser.direction)]);
        let mut visited: FxHashSet<BeamState> = FxHashSet::default();
        let mut segments = Vec::new();
        let mut steps = 0usize;

        while let Some(state) = queue.pop_front() {
            if !board.contains(state.position) || !visited.insert(state) {
                continue;
            }

            let direction = state.direction;
            let mut position = state.position;
            let mut segment = vec![position];

            loop {
                steps += 1;
                if steps > self.step_budget {
                    return Err(TraceError::StepBudgetExceeded {
                        origin: laser.origin,
                        budget: self.step_budget,
                    });
                }

                if let Some(struck) = position.collision_site(direction) {
                    let block = match board.site(struck) {
                        Site::Cell(cell) => cell.block(),
                        Site::OutOfBounds => None,
                        Site::Lattice => return Err(TraceError::CorruptCell { point: struck }),
                    };

                    if let Some(block) = block {
                        match deflect(block, position, direction) {
                            Deflection::Absorbed => segment.push(struck),
                            Deflection::Reflected(reflected) => {
                                queue.push_back(BeamState::new(position, reflected));
                            }
                            Deflection::Split {
                                transmitted,
                                reflected,
                            } => {
                                let beyond = position.step(transmitted);
                                if board.contains(beyond) {
                                    queue.push_back(BeamState::new(beyond, transmitted));
                                }
                                queue.push_back(BeamState::new(position, reflected));
                            }
                        }
                        break;
                    }
                }

                let next = position.step(direction);
                if !board.contains(next) {
                    break;
                }
                position = next;
                segment.push(position);
            }

            segments.push(segment);
        }

        Ok(Trace { segments })
    }
}
