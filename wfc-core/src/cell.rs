use bitvec::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use wfc_rules::Symbol;

/// Errors raised by a single cell mutation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError {
    /// The mutation would leave the cell with no options, or asked for a
    /// value the cell can no longer take.
    #[error("Contradiction at ({0}, {1})")]
    Contradiction(usize, usize),
    /// `collapse` was called on a cell that already holds a value.
    #[error("Cell ({0}, {1}) is already resolved")]
    AlreadyResolved(usize, usize),
}

/// A single grid position.
///
/// An unresolved cell holds a non-empty option set and no value. A resolved
/// cell holds exactly one committed value and an empty option set. Options
/// are stored as one bit per alphabet member, indexed by [`Symbol::index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<S: Symbol> {
    x: usize,
    y: usize,
    options: BitVec,
    value: Option<S>,
}

impl<S: Symbol> Cell<S> {
    /// Creates an unresolved cell holding the full alphabet.
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            options: bitvec![1; S::count()],
            value: None,
        }
    }

    /// Column of this cell.
    pub const fn x(&self) -> usize {
        self.x
    }

    /// Row of this cell.
    pub const fn y(&self) -> usize {
        self.y
    }

    /// `(x, y)`.
    pub const fn coords(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// The committed value, if any.
    pub const fn value(&self) -> Option<S> {
        self.value
    }

    /// True iff a committed value is set.
    pub const fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    /// Number of remaining options. Zero once resolved.
    pub fn option_count(&self) -> usize {
        self.options.count_ones()
    }

    /// Remaining options in alphabet order.
    pub fn options(&self) -> impl Iterator<Item = S> + '_ {
        self.options.iter_ones().filter_map(S::from_index)
    }

    /// Whether `value` is still among the options.
    pub fn has_option(&self, value: S) -> bool {
        self.options.get(value.index()).is_some_and(|bit| *bit)
    }

    /// Options as a bitmask, bit `i` standing for `S::ALL[i]`.
    pub fn mask(&self) -> u32 {
        self.options
            .iter_ones()
            .fold(0, |mask, index| mask | (1 << index))
    }

    /// Removes every listed value that is present and returns how many were
    /// removed. A resolved cell has nothing left to remove.
    ///
    /// Leaves the cell untouched and reports a contradiction when the removal
    /// would empty the option set.
    pub fn remove_options(&mut self, values: &[S]) -> Result<usize, CellError> {
        if self.is_resolved() {
            return Ok(0);
        }
        let mut remaining = self.options.clone();
        for value in values {
            if let Some(mut bit) = remaining.get_mut(value.index()) {
                *bit = false;
            }
        }
        let removed = self.options.count_ones() - remaining.count_ones();
        if remaining.not_any() {
            return Err(CellError::Contradiction(self.x, self.y));
        }
        self.options = remaining;
        Ok(removed)
    }

    /// Commits one option chosen uniformly at random.
    pub fn collapse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<S, CellError> {
        if self.is_resolved() {
            return Err(CellError::AlreadyResolved(self.x, self.y));
        }
        let candidates: Vec<S> = self.options().collect();
        let value = *candidates
            .choose(rng)
            .ok_or(CellError::Contradiction(self.x, self.y))?;
        self.settle(value);
        Ok(value)
    }

    /// Commits `value`, which must still be among the options.
    ///
    /// Committing a resolved cell to its own value is a no-op; any other value
    /// is a contradiction.
    pub fn commit(&mut self, value: S) -> Result<(), CellError> {
        match self.value {
            Some(current) if current == value => Ok(()),
            Some(_) => Err(CellError::Contradiction(self.x, self.y)),
            None if self.has_option(value) => {
                self.settle(value);
                Ok(())
            }
            None => Err(CellError::Contradiction(self.x, self.y)),
        }
    }

    /// Commits the only remaining option. Returns `None` unless the cell is
    /// unresolved with exactly one option.
    pub fn resolve_singleton(&mut self) -> Option<S> {
        if self.is_resolved() || self.option_count() != 1 {
            return None;
        }
        let value = self.options().next()?;
        self.settle(value);
        Some(value)
    }

    fn settle(&mut self, value: S) {
        self.value = Some(value);
        self.options.fill(false);
    }
}
