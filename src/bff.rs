//! Reader for `.bff` puzzle descriptions.
//!
//! Format, one directive per line (`#` starts a comment):
//! - `GRID START` ... `GRID STOP`: rows of `A B C o x`, optionally spaced
//! - `A n`, `B n`, `C n`: blocks available to place
//! - `L x y dx dy`: a laser in doubled coordinates
//! - `P x y`: a target point

use std::fs;
use std::path::Path;

use crate::blocks::{Block, Inventory};
use crate::error::{LoadError, PuzzleError};
use crate::geometry::Point;
use crate::grid::Grid;
use crate::solver::Puzzle;

/// Reads and validates a puzzle file.
pub fn load(path: impl AsRef<Path>) -> Result<Puzzle, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Parses and validates a puzzle description.
pub fn parse(text: &str) -> Result<Puzzle, LoadError> {
    let mut rows: Vec<&str> = Vec::new();
    let mut inventory = Inventory::default();
    let mut lasers = Vec::new();
    let mut targets = Vec::new();
    let mut grid_opened: Option<usize> = None;
    let mut grid_closed = false;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("GRID START") {
            grid_opened = Some(line_number);
            continue;
        }
        if line.eq_ignore_ascii_case("GRID STOP") {
            if grid_opened.take().is_none() {
                return Err(malformed(line_number, line, "GRID STOP without GRID START"));
            }
            grid_closed = true;
            continue;
        }
        if grid_opened.is_some() {
            rows.push(line);
            continue;
        }

        let mut fields = line.split_whitespace();
        let keyword = fields.next().unwrap_or_default();
        let values = fields
            .map(|field| parse_number(line_number, field))
            .collect::<Result<Vec<i32>, LoadError>>()?;

        match (keyword, values.as_slice()) {
            ("A" | "B" | "C", &[count]) => {
                let block = keyword
                    .chars()
                    .next()
                    .and_then(Block::from_letter)
                    .ok_or_else(|| malformed(line_number, line, "unknown block letter"))?;
                let count = usize::try_from(count)
                    .map_err(|_| malformed(line_number, line, "block count is negative"))?;
                inventory.set(block, count);
            }
            ("L", &[x, y, dx, dy]) => lasers.push(Puzzle::laser(x, y, dx, dy)?),
            ("P", &[x, y]) => targets.push(Point::new(x, y)),
            ("A" | "B" | "C" | "L" | "P", _) => {
                return Err(malformed(line_number, line, "wrong number of values"));
            }
            _ => return Err(malformed(line_number, line, "unknown directive")),
        }
    }

    if let Some(line) = grid_opened {
        return Err(LoadError::UnclosedGrid { line });
    }
    if !grid_closed {
        return Err(LoadError::MissingGrid);
    }

    let grid = Grid::from_rows(&rows).map_err(PuzzleError::from)?;
    Ok(Puzzle::new(grid, inventory, lasers, targets)?)
}

fn parse_number(line: usize, field: &str) -> Result<i32, LoadError> {
    field.parse().map_err(|source| LoadError::BadNumber {
        line,
        value: field.to_string(),
        source,
    })
}

fn malformed(line: usize, content: &str, reason: &'static str) -> LoadError {
    LoadError::Malformed {
        line,
        content: content.to_string(),
        reason,
    }
}
