use super::{Entropy, EntropyCalculator};
use crate::cell::Cell;
use wfc_rules::Symbol;

/// Entropy equal to the number of remaining options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionCountEntropy;

impl EntropyCalculator for OptionCountEntropy {
    fn cell_entropy<S: Symbol>(&self, cell: &Cell<S>, _width: usize, _height: usize) -> Entropy {
        Entropy::power(cell.option_count(), 1)
    }
}

/// Option count raised to a distance-from-edge exponent.
///
/// For a cell at `(x, y)` on a `w`×`h` grid the exponent is
/// `max(x, w - x)² + max(y, h - y)²`. Cells near a corner get the largest
/// exponent, so with two or more options they rank last; the centre ranks
/// first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeBiasedEntropy;

impl EdgeBiasedEntropy {
    /// The exponent applied at `(x, y)`.
    pub fn exponent(x: usize, y: usize, width: usize, height: usize) -> u64 {
        let dx = x.max(width.saturating_sub(x)) as u64;
        let dy = y.max(height.saturating_sub(y)) as u64;
        dx * dx + dy * dy
    }
}

impl EntropyCalculator for EdgeBiasedEntropy {
    fn cell_entropy<S: Symbol>(&self, cell: &Cell<S>, width: usize, height: usize) -> Entropy {
        let (x, y) = cell.coords();
        Entropy::power(cell.option_count(), Self::exponent(x, y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::{Digit, Tile};

    #[test]
    fn test_option_count_ignores_position() {
        let mut cell = Cell::<Digit>::new(8, 8);
        assert_eq!(OptionCountEntropy.cell_entropy(&cell, 9, 9), Entropy::power(9, 1));
        let drop: Vec<Digit> = Digit::ALL[..5].to_vec();
        cell.remove_options(&drop).unwrap();
        assert_eq!(OptionCountEntropy.cell_entropy(&cell, 9, 9), Entropy::power(4, 1));
    }

    #[test]
    fn test_edge_exponent_uses_distance_to_far_edge() {
        // Uses w - x rather than w - 1 - x.
        assert_eq!(EdgeBiasedEntropy::exponent(0, 0, 4, 4), 32);
        assert_eq!(EdgeBiasedEntropy::exponent(2, 2, 4, 4), 8);
        assert_eq!(EdgeBiasedEntropy::exponent(3, 3, 4, 4), 18);
        assert_eq!(EdgeBiasedEntropy::exponent(1, 0, 5, 3), 16 + 9);
    }

    #[test]
    fn test_edge_bias_prefers_centre_at_equal_counts() {
        let corner = Cell::<Tile>::new(0, 0);
        let centre = Cell::<Tile>::new(8, 8);
        let e_corner = EdgeBiasedEntropy.cell_entropy(&corner, 16, 16);
        let e_centre = EdgeBiasedEntropy.cell_entropy(&centre, 16, 16);
        assert_eq!(e_corner, Entropy::power(4, 512));
        assert_eq!(e_centre, Entropy::power(4, 128));
        assert!(e_centre < e_corner);
    }

    #[test]
    fn test_edge_bias_singleton_is_one() {
        let mut cell = Cell::<Tile>::new(0, 0);
        cell.remove_options(&[Tile::Water, Tile::Sand, Tile::Grass])
            .unwrap();
        assert_eq!(EdgeBiasedEntropy.cell_entropy(&cell, 6, 6), Entropy::ONE);
    }
}
