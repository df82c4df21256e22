//! Block kinds, board cells and the placeable block inventory.
//!
//! Cells use the same single-character codes as `.bff` puzzle files:
//! `A` reflective, `B` opaque, `C` refractive, `o` empty and `x` void.

use std::fmt;

/// The three ways a block can interact with a beam.
///
/// Ordering follows the file letters (`A < B < C`) and fixes the order in
/// which the enumerator permutes block types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Block {
    /// Bounces the beam off the struck face.
    Reflective,
    /// Absorbs the beam.
    Opaque,
    /// Bounces and transmits the beam at the same time.
    Refractive,
}

impl Block {
    pub const ALL: [Block; 3] = [Block::Reflective, Block::Opaque, Block::Refractive];

    pub const fn letter(self) -> char {
        match self {
            Block::Reflective => 'A',
            Block::Opaque => 'B',
            Block::Refractive => 'C',
        }
    }

    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Block::Reflective),
            'B' => Some(Block::Opaque),
            'C' => Some(Block::Refractive),
            _ => None,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Block::Reflective => "reflective",
            Block::Opaque => "opaque",
            Block::Refractive => "refractive",
        };
        f.write_str(name)
    }
}

/// The content of one block cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Placeable and currently unfilled.
    Empty,
    /// Not part of the board: nothing can be placed here, beams pass freely.
    Void,
    /// A block given by the puzzle.
    Fixed(Block),
    /// A block put here by the solver.
    Placed(Block),
}

impl Cell {
    pub const fn from_char(code: char) -> Option<Self> {
        match code {
            'o' => Some(Cell::Empty),
            'x' => Some(Cell::Void),
            _ => match Block::from_letter(code) {
                Some(block) => Some(Cell::Fixed(block)),
                None => None,
            },
        }
    }

    pub const fn to_char(self) -> char {
        match self {
            Cell::Empty => 'o',
            Cell::Void => 'x',
            Cell::Fixed(block) | Cell::Placed(block) => block.letter(),
        }
    }

    /// The block occupying this cell, if any.
    #[inline(always)]
    pub const fn block(self) -> Option<Block> {
        match self {
            Cell::Fixed(block) | Cell::Placed(block) => Some(block),
            Cell::Empty | Cell::Void => None,
        }
    }
}

/// Counts of blocks still to be placed into `Empty` cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub reflective: usize,
    pub opaque: usize,
    pub refractive: usize,
}

impl Inventory {
    pub const fn new(reflective: usize, opaque: usize, refractive: usize) -> Self {
        Self {
            reflective,
            opaque,
            refractive,
        }
    }

    pub const fn count(&self, block: Block) -> usize {
        match block {
            Block::Reflective => self.reflective,
            Block::Opaque => self.opaque,
            Block::Refractive => self.refractive,
        }
    }

    pub fn set(&mut self, block: Block, count: usize) {
        match block {
            Block::Reflective => self.reflective = count,
            Block::Opaque => self.opaque = count,
            Block::Refractive => self.refractive = count,
        }
    }

    pub const fn total(&self) -> usize {
        self.reflective + self.opaque + self.refractive
    }

    /// The inventory as a sorted multiset, e.g. `{A: 2, C: 1}` -> `[A, A, C]`.
    pub fn multiset(&self) -> Vec<Block> {
        Block::ALL
            .iter()
            .flat_map(|&block| std::iter::repeat(block).take(self.count(block)))
            .collect()
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={} B={} C={}",
            self.reflective, self.opaque, self.refractive
        )
    }
}
