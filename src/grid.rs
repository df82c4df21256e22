//! Board representation and doubled-coordinate cell lookup.
//!
//! `Grid` is the immutable board loaded from a puzzle. `Candidate` is a
//! copy-on-write view: the shared base grid plus a small overlay of placed
//! blocks, so evaluating a placement never clones or mutates the base.

use crate::blocks::{Block, Cell};
use crate::error::GridError;
use crate::geometry::{CellIndex, Point};

/// Result of looking up a doubled coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Site {
    /// Outside `[0, 2 * columns] x [0, 2 * rows]`.
    OutOfBounds,
    /// A face, edge or corner point between cells; never a collision site.
    Lattice,
    /// The centre of a block cell.
    Cell(Cell),
}

/// Read access to a board, shared by `Grid` and `Candidate`.
pub trait Board {
    fn rows(&self) -> usize;
    fn columns(&self) -> usize;

    /// Returns the cell at `index`. Callers guarantee `index` is in range.
    fn cell(&self, index: CellIndex) -> Cell;

    /// Largest valid doubled x coordinate.
    #[inline(always)]
    fn width(&self) -> i32 {
        2 * self.columns() as i32
    }

    /// Largest valid doubled y coordinate.
    #[inline(always)]
    fn height(&self) -> i32 {
        2 * self.rows() as i32
    }

    #[inline(always)]
    fn contains(&self, point: Point) -> bool {
        (0..=self.width()).contains(&point.x) && (0..=self.height()).contains(&point.y)
    }

    /// Converts a doubled coordinate to a cell lookup.
    #[inline]
    fn site(&self, point: Point) -> Site {
        if !self.contains(point) {
            return Site::OutOfBounds;
        }
        match CellIndex::from_site(point) {
            Some(index) => Site::Cell(self.cell(index)),
            None => Site::Lattice,
        }
    }
}

/// An immutable rectangular board of block cells stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid from row strings of cell codes. Whitespace is ignored,
    /// so both `"oBo"` and `"o B o"` describe the same row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let mut cells = Vec::new();
        let mut columns = None;

        for (row_index, row) in rows.iter().enumerate() {
            let mut found = 0;
            for code in row.as_ref().chars().filter(|c| !c.is_whitespace()) {
                let cell = Cell::from_char(code).ok_or(GridError::UnknownCell {
                    row: row_index,
                    code,
                })?;
                cells.push(cell);
                found += 1;
            }

            match columns {
                None => columns = Some(found),
                Some(expected) if expected != found => {
                    return Err(GridError::RaggedRow {
                        row: row_index,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }

        match columns {
            Some(columns) if columns > 0 => Ok(Self {
                rows: rows.len(),
                columns,
                cells,
            }),
            _ => Err(GridError::Empty),
        }
    }

    #[inline(always)]
    fn offset(&self, index: CellIndex) -> usize {
        index.row * self.columns + index.col
    }

    /// Empty cells in row-major order; this order drives the enumerator.
    pub fn placeable_cells(&self) -> Vec<CellIndex> {
        self.indices()
            .filter(|&index| self.cell(index) == Cell::Empty)
            .collect()
    }

    /// Every cell index in row-major order.
    pub fn indices(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| CellIndex::new(row, col)))
    }

    /// Returns a view of this grid with `placements` filled in.
    ///
    /// The source grid is untouched; only the overlay is allocated.
    pub fn with_placements(&self, placements: Vec<(CellIndex, Block)>) -> Candidate<'_> {
        Candidate {
            base: self,
            placements,
        }
    }
}

impl Board for Grid {
    #[inline(always)]
    fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    fn columns(&self) -> usize {
        self.columns
    }

    #[inline(always)]
    fn cell(&self, index: CellIndex) -> Cell {
        self.cells[self.offset(index)]
    }
}

/// A fully filled board: a borrowed base grid plus placed blocks.
#[derive(Clone, Debug)]
pub struct Candidate<'g> {
    base: &'g Grid,
    placements: Vec<(CellIndex, Block)>,
}

impl<'g> Candidate<'g> {
    pub fn placements(&self) -> &[(CellIndex, Block)] {
        &self.placements
    }

    /// Copies the overlay into a standalone grid.
    pub fn to_grid(&self) -> Grid {
        let mut grid = self.base.clone();
        for &(index, block) in &self.placements {
            let offset = grid.offset(index);
            grid.cells[offset] = Cell::Placed(block);
        }
        grid
    }
}

impl Board for Candidate<'_> {
    #[inline(always)]
    fn rows(&self) -> usize {
        self.base.rows
    }

    #[inline(always)]
    fn columns(&self) -> usize {
        self.base.columns
    }

    #[inline]
    fn cell(&self, index: CellIndex) -> Cell {
        // the overlay holds at most a handful of entries, a scan beats hashing
        self.placements
            .iter()
            .find(|(placed, _)| *placed == index)
            .map_or_else(|| self.base.cell(index), |&(_, block)| Cell::Placed(block))
    }
}

/// Formats a board as `.bff` grid rows, one line per row.
pub fn format_board(board: &impl Board) -> String {
    let mut output = String::with_capacity(board.rows() * (2 * board.columns() + 1));
    for row in 0..board.rows() {
        for col in 0..board.columns() {
            if col > 0 {
                output.push(' ');
            }
            output.push(board.cell(CellIndex::new(row, col)).to_char());
        }
        output.push('\n');
    }
    output
}
