//! Deterministic enumeration of block placements.
//!
//! Candidates are the product of two lexicographic sequences: size-`k`
//! combinations of the placeable slots, and the distinct permutations of the
//! inventory multiset. Identical blocks are never swapped with each other, so
//! `{A: 2, B: 1}` over three slots yields three arrangements, not six.

use crate::blocks::{Block, Inventory};
use crate::geometry::CellIndex;
use crate::grid::{Candidate, Grid};

/// Size-`k` index combinations of `0..n` in lexicographic order.
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let k = self.indices.len();

        // rightmost index that can still move right
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

/// Distinct permutations of a multiset in lexicographic order.
#[derive(Clone, Debug)]
pub struct MultisetPermutations<T> {
    current: Vec<T>,
    done: bool,
}

impl<T: Ord + Clone> MultisetPermutations<T> {
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort();
        Self {
            current: items,
            done: false,
        }
    }
}

impl<T: Ord + Clone> Iterator for MultisetPermutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let permutation = self.current.clone();

        // standard next-permutation; equal neighbours are skipped by the
        // strict comparisons, so repeated items never produce duplicates
        let items = &mut self.current;
        match (1..items.len()).rev().find(|&i| items[i - 1] < items[i]) {
            Some(i) => {
                let pivot = i - 1;
                // the suffix is non-increasing, so a larger element exists
                let successor = (i..items.len())
                    .rev()
                    .find(|&j| items[j] > items[pivot])
                    .unwrap_or(i);
                items.swap(pivot, successor);
                items[i..].reverse();
            }
            None => self.done = true,
        }

        Some(permutation)
    }
}

/// Binomial coefficient, saturating at `u128::MAX`.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // exact at every step: result * (n - i) is divisible by (i + 1)
        result = match result.checked_mul((n - i) as u128) {
            Some(product) => product / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    result
}

/// Number of distinct arrangements of the inventory, `k! / (a! b! c!)`.
pub fn permutation_count(inventory: &Inventory) -> u128 {
    let total = inventory.total();
    let after_reflective = total - inventory.reflective;
    binomial(total, inventory.reflective).saturating_mul(binomial(after_reflective, inventory.opaque))
}

/// Total candidates: `C(slots, k) * k! / (a! b! c!)`.
pub fn candidate_count(slots: usize, inventory: &Inventory) -> u128 {
    binomial(slots, inventory.total()).saturating_mul(permutation_count(inventory))
}

/// Pairs a slot combination with a type permutation.
pub fn assign(slots: &[CellIndex], combination: &[usize], blocks: &[Block]) -> Vec<(CellIndex, Block)> {
    combination
        .iter()
        .zip(blocks)
        .map(|(&slot, &block)| (slots[slot], block))
        .collect()
}

/// Every candidate board for a grid and inventory, in a fixed order.
pub struct Placements<'g> {
    grid: &'g Grid,
    slots: Vec<CellIndex>,
    inventory: Inventory,
    blocks: Vec<Block>,
    combinations: Combinations,
    combination: Option<Vec<usize>>,
    permutations: MultisetPermutations<Block>,
}

impl<'g> Placements<'g> {
    pub fn new(grid: &'g Grid, inventory: &Inventory) -> Self {
        let slots = grid.placeable_cells();
        let blocks = inventory.multiset();
        let mut combinations = Combinations::new(slots.len(), blocks.len());
        let combination = combinations.next();

        Self {
            grid,
            slots,
            inventory: *inventory,
            permutations: MultisetPermutations::new(blocks.clone()),
            blocks,
            combinations,
            combination,
        }
    }

    /// Total number of candidates this enumerator yields from the start.
    pub fn total(&self) -> u128 {
        candidate_count(self.slots.len(), &self.inventory)
    }
}

impl<'g> Iterator for Placements<'g> {
    type Item = Candidate<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let combination = self.combination.as_ref()?;
            if let Some(blocks) = self.permutations.next() {
                let placements = assign(&self.slots, combination, &blocks);
                return Some(self.grid.with_placements(placements));
            }
            self.combination = self.combinations.next();
            self.permutations = MultisetPermutations::new(self.blocks.clone());
        }
    }
}
