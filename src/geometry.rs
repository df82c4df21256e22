//! Doubled-coordinate arithmetic shared by the grid, tracer and renderer.
//!
//! A board of `rows x columns` block cells is addressed in a doubled lattice
//! where `0 <= x <= 2 * columns` and `0 <= y <= 2 * rows`. Block cell
//! `(row, col)` sits at `(2 * col + 1, 2 * row + 1)`, so block sites are exactly
//! the points where both components are odd. Every other point is a face,
//! corner or edge position a beam can occupy between collisions.

use std::fmt;

/// A position in the doubled lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true if this point is the centre of a block cell (both odd).
    #[inline(always)]
    pub const fn is_block_site(self) -> bool {
        self.x & 1 == 1 && self.y & 1 == 1
    }

    /// Moves one lattice step along `direction`.
    #[inline(always)]
    pub const fn step(self, direction: Direction) -> Self {
        Self {
            x: self.x + direction.dx,
            y: self.y + direction.dy,
        }
    }

    /// The block site across the cell face this point lies on, when travelling
    /// in `direction`.
    ///
    /// A point with even x lies on a vertical face and looks sideways; a point
    /// with even y lies on a horizontal face and looks up or down. Cell centres,
    /// corners and beams sliding along a face strike nothing.
    #[inline]
    pub const fn site_across(self, direction: Direction) -> Option<Point> {
        let x_even = self.x & 1 == 0;
        let y_even = self.y & 1 == 0;

        if x_even && !y_even && direction.dx != 0 {
            Some(Point::new(self.x + direction.dx, self.y))
        } else if y_even && !x_even && direction.dy != 0 {
            Some(Point::new(self.x, self.y + direction.dy))
        } else {
            None
        }
    }

    /// The block site a beam at this point runs into before its next step.
    ///
    /// On a cell face this is [`Point::site_across`]. From a corner a diagonal
    /// beam heads straight for the cell centre ahead, so that centre is struck.
    #[inline]
    pub const fn collision_site(self, direction: Direction) -> Option<Point> {
        match self.site_across(direction) {
            Some(site) => Some(site),
            None => {
                let next = self.step(direction);
                if next.is_block_site() {
                    Some(next)
                } else {
                    None
                }
            }
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit lattice step: each component in `-1..=1`, not both zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Direction {
    dx: i32,
    dy: i32,
}

impl Direction {
    pub const RIGHT: Self = Self { dx: 1, dy: 0 };
    pub const LEFT: Self = Self { dx: -1, dy: 0 };
    pub const DOWN: Self = Self { dx: 0, dy: 1 };
    pub const UP: Self = Self { dx: 0, dy: -1 };

    /// Builds a direction, rejecting zero vectors and components outside `-1..=1`.
    pub const fn new(dx: i32, dy: i32) -> Option<Self> {
        if dx < -1 || dx > 1 || dy < -1 || dy > 1 || (dx == 0 && dy == 0) {
            None
        } else {
            Some(Self { dx, dy })
        }
    }

    #[inline(always)]
    pub const fn dx(self) -> i32 {
        self.dx
    }

    #[inline(always)]
    pub const fn dy(self) -> i32 {
        self.dy
    }

    /// Bounces off `surface`: a vertical face negates dx, a horizontal face negates dy.
    #[inline(always)]
    pub const fn reflect(self, surface: Surface) -> Self {
        match surface {
            Surface::Vertical => Self {
                dx: -self.dx,
                dy: self.dy,
            },
            Surface::Horizontal => Self {
                dx: self.dx,
                dy: -self.dy,
            },
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

/// Orientation of the cell face a beam strikes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Vertical,
    Horizontal,
}

impl Surface {
    /// Derives the face orientation from the x-parity of the impact point.
    ///
    /// Only x is consulted: an even x means the beam was crossing a vertical
    /// boundary, an odd x a horizontal one.
    #[inline(always)]
    pub const fn at(impact: Point) -> Self {
        if impact.x & 1 == 0 {
            Surface::Vertical
        } else {
            Surface::Horizontal
        }
    }
}

/// A block cell addressed by `(row, col)` in block coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The doubled-lattice centre of this cell.
    #[inline(always)]
    pub const fn site(self) -> Point {
        Point::new(2 * self.col as i32 + 1, 2 * self.row as i32 + 1)
    }

    /// Converts a block site back to its cell, or `None` for non-site points.
    #[inline]
    pub const fn from_site(point: Point) -> Option<Self> {
        if point.x < 0 || point.y < 0 || !point.is_block_site() {
            return None;
        }
        Some(Self {
            row: ((point.y - 1) / 2) as usize,
            col: ((point.x - 1) / 2) as usize,
        })
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sites_are_odd_odd() {
        assert!(Point::new(1, 1).is_block_site());
        assert!(Point::new(5, 3).is_block_site());
        assert!(!Point::new(2, 1).is_block_site());
        assert!(!Point::new(1, 2).is_block_site());
        assert!(!Point::new(0, 0).is_block_site());
    }

    #[test]
    fn test_direction_rejects_invalid_vectors() {
        assert!(Direction::new(0, 0).is_none());
        assert!(Direction::new(2, 0).is_none());
        assert!(Direction::new(1, -2).is_none());
        assert_eq!(Direction::new(1, -1).map(|d| (d.dx(), d.dy())), Some((1, -1)));
    }

    #[test]
    fn test_surface_uses_x_parity_only() {
        assert_eq!(Surface::at(Point::new(2, 3)), Surface::Vertical);
        assert_eq!(Surface::at(Point::new(2, 2)), Surface::Vertical);
        assert_eq!(Surface::at(Point::new(3, 2)), Surface::Horizontal);
        assert_eq!(Surface::at(Point::new(3, 3)), Surface::Horizontal);
    }

    #[test]
    fn test_reflect_negates_the_crossing_component() {
        let diagonal = Direction::new(1, 1).unwrap();
        assert_eq!(
            diagonal.reflect(Surface::Vertical),
            Direction::new(-1, 1).unwrap()
        );
        assert_eq!(
            diagonal.reflect(Surface::Horizontal),
            Direction::new(1, -1).unwrap()
        );
        assert_eq!(Direction::RIGHT.reflect(Surface::Vertical), Direction::LEFT);
    }

    #[test]
    fn test_site_across_vertical_and_horizontal_faces() {
        let down_right = Direction::new(1, 1).unwrap();
        // vertical face: look sideways
        assert_eq!(
            Point::new(2, 3).site_across(down_right),
            Some(Point::new(3, 3))
        );
        // horizontal face: look down
        assert_eq!(
            Point::new(3, 2).site_across(down_right),
            Some(Point::new(3, 3))
        );
        // axis-aligned beams strike the next lattice point
        assert_eq!(
            Point::new(2, 1).site_across(Direction::RIGHT),
            Some(Point::new(3, 1))
        );
        // centres, corners and face-sliding beams strike nothing
        assert_eq!(Point::new(1, 1).site_across(Direction::RIGHT), None);
        assert_eq!(Point::new(2, 2).site_across(down_right), None);
        assert_eq!(Point::new(2, 1).site_across(Direction::DOWN), None);
    }

    #[test]
    fn test_collision_site_from_corners() {
        let down_right = Direction::new(1, 1).unwrap();
        let up_left = Direction::new(-1, -1).unwrap();

        // diagonal from a corner: the centre ahead
        assert_eq!(
            Point::new(2, 2).collision_site(down_right),
            Some(Point::new(3, 3))
        );
        assert_eq!(
            Point::new(0, 0).collision_site(down_right),
            Some(Point::new(1, 1))
        );
        assert_eq!(
            Point::new(2, 2).collision_site(up_left),
            Some(Point::new(1, 1))
        );
        // faces defer to site_across
        assert_eq!(
            Point::new(2, 3).collision_site(down_right),
            Some(Point::new(3, 3))
        );
        // from a centre the next point is a corner or a face
        assert_eq!(Point::new(1, 1).collision_site(down_right), None);
        assert_eq!(Point::new(1, 1).collision_site(Direction::RIGHT), None);
        // axis-aligned from a corner runs along a face
        assert_eq!(Point::new(2, 2).collision_site(Direction::RIGHT), None);
    }

    #[test]
    fn test_cell_index_site_roundtrip() {
        for row in 0..4 {
            for col in 0..5 {
                let cell = CellIndex::new(row, col);
                assert_eq!(CellIndex::from_site(cell.site()), Some(cell));
            }
        }
        assert_eq!(CellIndex::from_site(Point::new(2, 1)), None);
        assert_eq!(CellIndex::from_site(Point::new(-1, 1)), None);
    }
}
