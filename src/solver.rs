//! Exhaustive placement search.
//!
//! The solver pulls candidates from the enumerator, traces every laser on
//! each one and accepts the first candidate whose combined hits cover all
//! targets. With one worker the search is the deterministic reference order;
//! with more, workers split the slot combinations between them and race.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;

use indicatif::ProgressBar;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace};

use crate::blocks::{Block, Inventory};
use crate::enumerator::{assign, candidate_count, Combinations, MultisetPermutations, Placements};
use crate::error::{PuzzleError, SolveError, TraceError};
use crate::geometry::{CellIndex, Direction, Point};
use crate::grid::{Board, Candidate, Grid};
use crate::tracer::{Laser, Trace, Tracer, DEFAULT_STEP_BUDGET};

/// An immutable, validated puzzle: board, inventory, lasers and targets.
#[derive(Clone, Debug)]
pub struct Puzzle {
    grid: Grid,
    inventory: Inventory,
    lasers: Vec<Laser>,
    targets: Vec<Point>,
}

impl Puzzle {
    /// Validates the inputs. Every input error is caught here, before search.
    pub fn new(
        grid: Grid,
        inventory: Inventory,
        lasers: Vec<Laser>,
        targets: Vec<Point>,
    ) -> Result<Self, PuzzleError> {
        if lasers.is_empty() {
            return Err(PuzzleError::NoLasers);
        }
        if targets.is_empty() {
            return Err(PuzzleError::NoTargets);
        }
        if let Some(laser) = lasers.iter().find(|laser| !grid.contains(laser.origin)) {
            return Err(PuzzleError::LaserOutOfBounds {
                point: laser.origin,
            });
        }
        if let Some(&point) = targets.iter().find(|&&point| !grid.contains(point)) {
            return Err(PuzzleError::TargetOutOfBounds { point });
        }

        let available = grid.placeable_cells().len();
        let needed = inventory.total();
        if needed > available {
            return Err(PuzzleError::InsufficientSlots { needed, available });
        }

        let mut targets = targets;
        targets.sort();
        targets.dedup();

        Ok(Self {
            grid,
            inventory,
            lasers,
            targets,
        })
    }

    /// Builds a laser from raw file values, rejecting non-unit directions.
    pub fn laser(x: i32, y: i32, dx: i32, dy: i32) -> Result<Laser, PuzzleError> {
        let direction = Direction::new(dx, dy).ok_or(PuzzleError::InvalidDirection { dx, dy })?;
        Ok(Laser::new(Point::new(x, y), direction))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    /// Target points, sorted and deduplicated.
    pub fn targets(&self) -> &[Point] {
        &self.targets
    }

    /// Number of candidates the enumerator will produce.
    pub fn candidate_count(&self) -> u128 {
        candidate_count(self.grid.placeable_cells().len(), &self.inventory)
    }

    /// Traces every laser on `board`, in puzzle order.
    pub fn trace_all(
        &self,
        board: &impl Board,
        tracer: &Tracer,
    ) -> Result<Vec<Trace>, TraceError> {
        self.lasers
            .iter()
            .map(|&laser| tracer.trace(board, laser))
            .collect()
    }

    /// Targets not lit on `board`, sorted.
    pub fn missed_targets(
        &self,
        board: &impl Board,
        tracer: &Tracer,
    ) -> Result<Vec<Point>, TraceError> {
        let mut hits = FxHashSet::default();
        for trace in self.trace_all(board, tracer)? {
            trace.extend_hits(&mut hits);
        }
        Ok(self
            .targets
            .iter()
            .copied()
            .filter(|target| !hits.contains(target))
            .collect())
    }

    /// Returns true if `hits` lights every target.
    #[inline]
    pub fn covers(&self, hits: &FxHashSet<Point>) -> bool {
        self.targets.iter().all(|target| hits.contains(target))
    }
}

/// Search parameters. Defaults give the sequential reference search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Stop after evaluating this many candidates.
    pub max_attempts: Option<u64>,
    /// Lattice steps allowed per trace.
    pub step_budget: usize,
    /// Worker threads; 1 keeps the deterministic order.
    pub workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            step_budget: DEFAULT_STEP_BUDGET,
            workers: 1,
        }
    }
}

impl SolverConfig {
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// An accepted candidate with what the renderer needs to draw it.
#[derive(Clone, Debug)]
pub struct Solution {
    pub grid: Grid,
    pub placements: Vec<(CellIndex, Block)>,
    /// One trace per laser, in puzzle order.
    pub traces: Vec<Trace>,
    /// 1-based position of this candidate among the evaluated ones.
    pub attempts: u64,
}

impl Solution {
    pub fn hits(&self) -> FxHashSet<Point> {
        let mut hits = FxHashSet::default();
        for trace in &self.traces {
            trace.extend_hits(&mut hits);
        }
        hits
    }

    /// Re-checks coverage of `puzzle`'s targets.
    pub fn covers(&self, puzzle: &Puzzle) -> bool {
        puzzle.covers(&self.hits())
    }
}

/// Terminal state of a search. Only `Solved` carries a board.
#[derive(Clone, Debug)]
pub enum Outcome {
    Solved(Solution),
    /// Every candidate was evaluated without a match.
    Exhausted { attempts: u64 },
    /// The attempt cap was reached before the space was exhausted.
    CapReached { attempts: u64 },
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u64 {
        match self {
            Outcome::Solved(solution) => solution.attempts,
            Outcome::Exhausted { attempts } | Outcome::CapReached { attempts } => *attempts,
        }
    }
}

/// Drives the enumerator and tracer over one puzzle.
pub struct Solver<'p> {
    puzzle: &'p Puzzle,
    config: SolverConfig,
    tracer: Tracer,
    progress: ProgressBar,
}

impl<'p> Solver<'p> {
    pub fn new(puzzle: &'p Puzzle, config: SolverConfig) -> Self {
        Self {
            puzzle,
            config,
            tracer: Tracer::new(config.step_budget),
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports one tick per evaluated candidate to `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Traces all lasers on `candidate`; returns the traces if every target is lit.
    fn evaluate(&self, candidate: &Candidate<'_>) -> Result<Option<Vec<Trace>>, TraceError> {
        let mut hits = FxHashSet::default();
        let mut traces = Vec::with_capacity(self.puzzle.lasers.len());
        for &laser in &self.puzzle.lasers {
            let trace = self.tracer.trace(candidate, laser)?;
            trace.extend_hits(&mut hits);
            traces.push(trace);
        }
        Ok(self.puzzle.covers(&hits).then_some(traces))
    }

    fn accept(candidate: &Candidate<'_>, traces: Vec<Trace>, attempts: u64) -> Solution {
        Solution {
            grid: candidate.to_grid(),
            placements: candidate.placements().to_vec(),
            traces,
            attempts,
        }
    }

    /// Runs the search to a terminal outcome.
    pub fn solve(&self) -> Result<Outcome, SolveError> {
        let total = self.puzzle.candidate_count();
        info!(
            slots = self.puzzle.grid.placeable_cells().len(),
            blocks = self.puzzle.inventory.total(),
            candidates = %total,
            workers = self.config.workers,
            "starting search"
        );

        let result = if self.config.workers > 1 {
            self.solve_parallel()
        } else {
            self.solve_sequential()
        };
        self.progress.finish();

        if let Ok(outcome) = &result {
            match outcome {
                Outcome::Solved(solution) => {
                    info!(attempts = solution.attempts, "solution found")
                }
                Outcome::Exhausted { attempts } => debug!(attempts, "search space exhausted"),
                Outcome::CapReached { attempts } => debug!(attempts, "attempt cap reached"),
            }
        }
        result
    }

    fn solve_sequential(&self) -> Result<Outcome, SolveError> {
        let mut attempts = 0u64;

        for candidate in Placements::new(&self.puzzle.grid, &self.puzzle.inventory) {
            if self.config.max_attempts.is_some_and(|cap| attempts >= cap) {
                return Ok(Outcome::CapReached { attempts });
            }
            attempts += 1;
            self.progress.inc(1);

            match self.evaluate(&candidate)? {
                Some(traces) => {
                    return Ok(Outcome::Solved(Self::accept(&candidate, traces, attempts)));
                }
                None => trace!(attempts, "candidate rejected"),
            }
        }

        Ok(Outcome::Exhausted { attempts })
    }

    fn solve_parallel(&self) -> Result<Outcome, SolveError> {
        let workers = self.config.workers;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;

        let grid = &self.puzzle.grid;
        let slots = grid.placeable_cells();
        let blocks = self.puzzle.inventory.multiset();

        let stop = AtomicBool::new(false);
        let capped = AtomicBool::new(false);
        let attempts = AtomicU64::new(0);
        let found: OnceLock<Solution> = OnceLock::new();
        let failure: OnceLock<TraceError> = OnceLock::new();

        pool.scope(|scope| {
            for worker in 0..workers {
                let (slots, blocks) = (&slots, &blocks);
                let (stop, capped, attempts) = (&stop, &capped, &attempts);
                let (found, failure) = (&found, &failure);

                scope.spawn(move |_| {
                    debug!(worker, "worker started");
                    let owned = Combinations::new(slots.len(), blocks.len())
                        .enumerate()
                        .filter(|(index, _)| index % workers == worker);

                    for (_, combination) in owned {
                        for permutation in MultisetPermutations::new(blocks.clone()) {
                            if stop.load(Ordering::Relaxed) {
                                return;
                            }
                            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                            if self.config.max_attempts.is_some_and(|cap| attempt > cap) {
                                capped.store(true, Ordering::Relaxed);
                                stop.store(true, Ordering::Relaxed);
                                return;
                            }
                            self.progress.inc(1);

                            let candidate =
                                grid.with_placements(assign(slots, &combination, &permutation));
                            match self.evaluate(&candidate) {
                                Ok(Some(traces)) => {
                                    // first writer wins; later finds are dropped
                                    let _ = found.set(Self::accept(&candidate, traces, attempt));
                                    stop.store(true, Ordering::Relaxed);
                                    return;
                                }
                                Ok(None) => trace!(worker, attempt, "candidate rejected"),
                                Err(error) => {
                                    let _ = failure.set(error);
                                    stop.store(true, Ordering::Relaxed);
                                    return;
                                }
                            }
                        }
                    }
                    debug!(worker, "worker exhausted its share");
                });
            }
        });

        let evaluated = attempts.load(Ordering::Relaxed);
        let evaluated = self
            .config
            .max_attempts
            .map_or(evaluated, |cap| evaluated.min(cap));

        if let Some(solution) = found.into_inner() {
            return Ok(Outcome::Solved(solution));
        }
        if let Some(error) = failure.into_inner() {
            return Err(error.into());
        }
        if capped.load(Ordering::Relaxed) {
            return Ok(Outcome::CapReached {
                attempts: evaluated,
            });
        }
        Ok(Outcome::Exhausted {
            attempts: evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Cell;

    /// A 3x3 open board, three opaque blocks and two lasers entering at
    /// opposite corners. Each target is lit only while the cells its laser
    /// crosses stay clear.
    fn corners() -> Puzzle {
        let grid = Grid::from_rows(&["o o o", "o o o", "o o o"]).unwrap();
        Puzzle::new(
            grid,
            Inventory::new(0, 3, 0),
            vec![
                Puzzle::laser(0, 1, 1, 1).unwrap(),
                Puzzle::laser(6, 5, -1, -1).unwrap(),
            ],
            vec![Point::new(3, 4), Point::new(3, 2)],
        )
        .unwrap()
    }

    fn expected_corners_blocks() -> Vec<(CellIndex, Block)> {
        vec![
            (CellIndex::new(0, 1), Block::Opaque),
            (CellIndex::new(0, 2), Block::Opaque),
            (CellIndex::new(2, 0), Block::Opaque),
        ]
    }

    #[test]
    fn test_puzzle_rejects_invalid_input() {
        let grid = Grid::from_rows(&["oo"]).unwrap();
        let laser = Puzzle::laser(0, 1, 1, 0).unwrap();
        let target = Point::new(2, 1);

        assert_eq!(
            Puzzle::new(grid.clone(), Inventory::default(), vec![], vec![target]).unwrap_err(),
            PuzzleError::NoLasers
        );
        assert_eq!(
            Puzzle::new(grid.clone(), Inventory::default(), vec![laser], vec![]).unwrap_err(),
            PuzzleError::NoTargets
        );
        assert_eq!(
            Puzzle::new(
                grid.clone(),
                Inventory::new(1, 1, 1),
                vec![laser],
                vec![target]
            )
            .unwrap_err(),
            PuzzleError::InsufficientSlots {
                needed: 3,
                available: 2
            }
        );
        assert_eq!(
            Puzzle::new(
                grid.clone(),
                Inventory::default(),
                vec![laser],
                vec![Point::new(5, 1)]
            )
            .unwrap_err(),
            PuzzleError::TargetOutOfBounds {
                point: Point::new(5, 1)
            }
        );
        assert_eq!(
            Puzzle::laser(0, 1, 0, 0).unwrap_err(),
            PuzzleError::InvalidDirection { dx: 0, dy: 0 }
        );
    }

    #[test]
    fn test_sequential_search_finds_first_candidate() {
        let puzzle = corners();
        let outcome = Solver::new(&puzzle, SolverConfig::default()).solve().unwrap();

        let solution = outcome.solution().expect("corners puzzle is solvable");
        assert_eq!(solution.placements, expected_corners_blocks());
        assert!(solution.covers(&puzzle));

        let opaque_cells = solution
            .grid
            .indices()
            .filter(|&index| solution.grid.cell(index) == Cell::Placed(Block::Opaque))
            .count();
        assert_eq!(opaque_cells, 3);

        // combinations starting with slot 0 block the first laser at once;
        // (1,2,6) is the first one clear of both beams
        assert!(solution.attempts > 1);
        let missed = puzzle
            .missed_targets(&solution.grid, &Tracer::default())
            .unwrap();
        assert!(missed.is_empty());
    }

    #[test]
    fn test_rejected_candidates_miss_a_target() {
        let puzzle = corners();
        let tracer = Tracer::default();
        let first = Placements::new(puzzle.grid(), puzzle.inventory()).next().unwrap();
        let missed = puzzle.missed_targets(&first, &tracer).unwrap();
        assert_eq!(missed, vec![Point::new(3, 4)]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let puzzle = corners();
        let first = Solver::new(&puzzle, SolverConfig::default()).solve().unwrap();
        let second = Solver::new(&puzzle, SolverConfig::default()).solve().unwrap();
        assert_eq!(first.attempts(), second.attempts());
        assert_eq!(
            first.solution().map(|s| s.placements.clone()),
            second.solution().map(|s| s.placements.clone())
        );
    }

    #[test]
    fn test_attempt_cap_is_partial_exhaustion() {
        let puzzle = corners();
        let config = SolverConfig::default().with_max_attempts(Some(3));
        let outcome = Solver::new(&puzzle, config).solve().unwrap();
        assert!(matches!(outcome, Outcome::CapReached { attempts: 3 }));
    }

    #[test]
    fn test_unsolvable_puzzle_is_exhausted() {
        // the only target sits behind the opaque block
        let grid = Grid::from_rows(&["o B o"]).unwrap();
        let puzzle = Puzzle::new(
            grid,
            Inventory::new(1, 0, 0),
            vec![Puzzle::laser(0, 1, 1, 0).unwrap()],
            vec![Point::new(4, 1)],
        )
        .unwrap();

        let outcome = Solver::new(&puzzle, SolverConfig::default()).solve().unwrap();
        assert!(matches!(outcome, Outcome::Exhausted { attempts: 2 }));
    }

    #[test]
    fn test_trace_overflow_aborts_the_search() {
        let puzzle = corners();
        let config = SolverConfig::default().with_step_budget(1);
        let error = Solver::new(&puzzle, config).solve().unwrap_err();
        assert!(matches!(
            error,
            SolveError::Trace(TraceError::StepBudgetExceeded { budget: 1, .. })
        ));
    }

    #[test]
    fn test_refractive_split_lights_both_targets() {
        let puzzle = crate::bff::parse(include_str!("../puzzles/splitter.bff")).unwrap();
        let outcome = Solver::new(&puzzle, SolverConfig::default()).solve().unwrap();

        let solution = outcome.solution().expect("splitter puzzle is solvable");
        assert_eq!(
            solution.placements,
            vec![(CellIndex::new(1, 1), Block::Refractive)]
        );
        assert_eq!(solution.attempts, 5);
        assert_eq!(solution.traces[0].segments().len(), 3);
    }

    #[test]
    fn test_parallel_search_finds_a_covering_candidate() {
        let puzzle = corners();
        let config = SolverConfig::default().with_workers(4);
        let outcome = Solver::new(&puzzle, config).solve().unwrap();

        let solution = outcome.solution().expect("corners puzzle is solvable");
        assert!(solution.covers(&puzzle));
        assert_eq!(solution.placements.len(), 3);
        assert_eq!(solution.traces.len(), 2);
    }

    /// Five candidates, none of which can light the target behind the wall.
    fn walled_off() -> Puzzle {
        let grid = Grid::from_rows(&["o B o", "o o o"]).unwrap();
        Puzzle::new(
            grid,
            Inventory::new(1, 0, 0),
            vec![Puzzle::laser(0, 1, 1, 0).unwrap()],
            vec![Point::new(4, 1)],
        )
        .unwrap()
    }

    #[test]
    fn test_parallel_search_reports_exhaustion() {
        let puzzle = walled_off();
        let config = SolverConfig::default().with_workers(3);
        let outcome = Solver::new(&puzzle, config).solve().unwrap();
        assert!(matches!(outcome, Outcome::Exhausted { attempts: 5 }));
    }

    #[test]
    fn test_parallel_cap_is_clamped() {
        let puzzle = walled_off();
        let config = SolverConfig::default()
            .with_workers(3)
            .with_max_attempts(Some(2));
        let outcome = Solver::new(&puzzle, config).solve().unwrap();
        assert!(matches!(outcome, Outcome::CapReached { attempts: 2 }));
    }

    #[test]
    fn test_parallel_cap_at_full_count_is_exhaustion() {
        let puzzle = walled_off();
        assert_eq!(puzzle.candidate_count(), 5);

        let config = SolverConfig::default()
            .with_workers(3)
            .with_max_attempts(Some(5));
        let outcome = Solver::new(&puzzle, config).solve().unwrap();
        assert!(matches!(outcome, Outcome::Exhausted { attempts: 5 }));
    }

    #[test]
    fn test_parallel_solution_within_cap_is_reported() {
        let puzzle = corners();
        let config = SolverConfig::default()
            .with_workers(4)
            .with_max_attempts(Some(84));
        let outcome = Solver::new(&puzzle, config).solve().unwrap();

        let solution = outcome.solution().expect("corners puzzle is solvable");
        assert!(solution.covers(&puzzle));
        assert!(solution.attempts <= 84);
    }

    #[test]
    fn test_sequential_cap_at_full_count_is_exhaustion() {
        let puzzle = walled_off();
        let config = SolverConfig::default().with_max_attempts(Some(5));
        let outcome = Solver::new(&puzzle, config).solve().unwrap();
        assert!(matches!(outcome, Outcome::Exhausted { attempts: 5 }));
    }
}
