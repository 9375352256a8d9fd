//! Entropy ranking and lowest-entropy cell selection.

use crate::cell::Cell;
use crate::grid::PossibilityGrid;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use wfc_rules::Symbol;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Concrete entropy policies.
pub mod policy;

pub use policy::{EdgeBiasedEntropy, OptionCountEntropy};

/// Errors raised while picking the next cell to collapse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// Selection was attempted on a grid without unresolved cells.
    #[error("No unresolved cell left to select")]
    NothingToSelect,
}

/// How ties between cells of equal minimal entropy are broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SelectionStrategy {
    /// Uniformly random among all tied cells.
    #[default]
    RandomLowest,
    /// The first tied cell in row-major order.
    FirstMinimum,
}

/// Exact value of `base ^ exponent`.
///
/// Entropies are compared exactly even when the power does not fit in any
/// machine integer. Each value is kept with the smallest base that reaches
/// it, so two entropies with the same base compare by exponent alone.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Entropy {
    base: usize,
    exponent: u64,
}

impl Entropy {
    /// Entropy of exactly one.
    pub const ONE: Self = Self {
        base: 1,
        exponent: 0,
    };

    /// Builds `base ^ exponent`.
    pub fn power(base: usize, exponent: u64) -> Self {
        match (base, exponent) {
            (_, 0) | (1, _) => Self::ONE,
            (0, _) => Self {
                base: 0,
                exponent: 1,
            },
            _ => {
                let (root, k) = primitive_root(base);
                Self {
                    base: root,
                    exponent: exponent.saturating_mul(k),
                }
            }
        }
    }

    /// Normalized base.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Exponent matching [`Entropy::base`].
    pub fn exponent(&self) -> u64 {
        self.exponent
    }

    /// Natural logarithm of the value. Lossy; for display only.
    pub fn ln(&self) -> f64 {
        match self.base {
            0 => f64::NEG_INFINITY,
            base => self.exponent as f64 * (base as f64).ln(),
        }
    }

    /// The value as a `u128`, if it fits.
    pub fn exact(&self) -> Option<u128> {
        let exponent = u32::try_from(self.exponent).ok()?;
        (self.base as u128).checked_pow(exponent)
    }

    fn rank(&self) -> u8 {
        match self.base {
            0 => 0,
            1 => 1,
            _ => 2,
        }
    }
}

/// Smallest `root` with `root ^ k == n`.
fn primitive_root(n: usize) -> (usize, u64) {
    for root in 2..n {
        let mut value = root;
        let mut k = 1;
        while value < n {
            match value.checked_mul(root) {
                Some(next) => {
                    value = next;
                    k += 1;
                }
                None => break,
            }
        }
        if value == n {
            return (root, k);
        }
        if root.saturating_mul(root) > n {
            break;
        }
    }
    (n, 1)
}

impl Ord for Entropy {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal if self.rank() == 2 => {}
            ordering => return ordering,
        }
        if self.base == other.base {
            return self.exponent.cmp(&other.exponent);
        }
        if let (Some(a), Some(b)) = (self.exact(), other.exact()) {
            return a.cmp(&b);
        }
        self.ln().total_cmp(&other.ln())
    }
}

impl PartialOrd for Entropy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entropy {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exact() {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "{}^{}", self.base, self.exponent),
        }
    }
}

/// Ranks unresolved cells; lower entropy is collapsed first.
pub trait EntropyCalculator: fmt::Debug + Send + Sync {
    /// Entropy of an unresolved `cell` on a `width`×`height` grid.
    fn cell_entropy<S: Symbol>(&self, cell: &Cell<S>, width: usize, height: usize) -> Entropy;

    /// Picks an unresolved cell of minimal entropy.
    ///
    /// Ties are collected in row-major order and broken by `strategy`.
    fn select_lowest_entropy_cell<S: Symbol, R: Rng + ?Sized>(
        &self,
        grid: &PossibilityGrid<S>,
        strategy: SelectionStrategy,
        rng: &mut R,
    ) -> Result<(usize, usize), EntropyError> {
        let mut lowest: Option<Entropy> = None;
        let mut tied: Vec<(usize, usize)> = Vec::new();
        for cell in grid.unresolved() {
            let entropy = self.cell_entropy(cell, grid.width, grid.height);
            match lowest.map(|current| entropy.cmp(&current)) {
                Some(Ordering::Greater) => {}
                Some(Ordering::Equal) => tied.push(cell.coords()),
                Some(Ordering::Less) | None => {
                    lowest = Some(entropy);
                    tied.clear();
                    tied.push(cell.coords());
                }
            }
        }
        let choice = match strategy {
            SelectionStrategy::RandomLowest => tied.choose(rng).copied(),
            SelectionStrategy::FirstMinimum => tied.first().copied(),
        }
        .ok_or(EntropyError::NothingToSelect)?;
        if let Some(entropy) = lowest {
            trace!(
                "Selected {:?} with entropy {} among {} tied cells",
                choice,
                entropy,
                tied.len()
            );
        }
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wfc_rules::Tile;

    #[test]
    fn test_trivial_powers() {
        assert_eq!(Entropy::power(7, 0), Entropy::ONE);
        assert_eq!(Entropy::power(1, 400), Entropy::ONE);
        assert!(Entropy::power(0, 3) < Entropy::ONE);
        assert!(Entropy::ONE < Entropy::power(2, 1));
    }

    #[test]
    fn test_powers_are_normalized() {
        assert_eq!(Entropy::power(4, 3), Entropy::power(2, 6));
        assert_eq!(Entropy::power(8, 2), Entropy::power(4, 3));
        assert_eq!(Entropy::power(9, 1).base(), 3);
        assert_eq!(Entropy::power(9, 1).exponent(), 2);
        assert_eq!(Entropy::power(6, 5).base(), 6);
    }

    #[test]
    fn test_ordering_beyond_machine_range() {
        // 3^200 < 2^318 < 3^201
        assert!(Entropy::power(3, 200) < Entropy::power(2, 318));
        assert!(Entropy::power(2, 318) < Entropy::power(3, 201));
        assert!(Entropy::power(4, 500) > Entropy::power(4, 499));
        assert!(Entropy::power(2, 1000) < Entropy::power(3, 1000));
    }

    #[test]
    fn test_display() {
        assert_eq!(Entropy::power(3, 2).to_string(), "9");
        assert_eq!(Entropy::power(2, 200).to_string(), "2^200");
    }

    #[test]
    fn test_select_on_resolved_grid_fails() {
        let mut grid = PossibilityGrid::<Tile>::new(2, 1).unwrap();
        for (x, y) in [(0, 0), (1, 0)] {
            grid.get_mut(x, y).unwrap().commit(Tile::Water).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            OptionCountEntropy.select_lowest_entropy_cell(
                &grid,
                SelectionStrategy::RandomLowest,
                &mut rng
            ),
            Err(EntropyError::NothingToSelect)
        );
    }

    #[test]
    fn test_first_minimum_is_row_major() {
        let mut grid = PossibilityGrid::<Tile>::new(3, 3).unwrap();
        for (x, y) in [(2, 0), (0, 2)] {
            grid.get_mut(x, y)
                .unwrap()
                .remove_options(&[Tile::Stone])
                .unwrap();
        }
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            OptionCountEntropy.select_lowest_entropy_cell(
                &grid,
                SelectionStrategy::FirstMinimum,
                &mut rng
            ),
            Ok((2, 0))
        );
    }
}
