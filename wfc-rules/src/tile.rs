use crate::{RulesError, Symbol};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Terrain tile kinds used by the map generator.
///
/// Each tile owns a distinct power-of-two flag so an option set can be shown
/// as a 4-bit mask in debug dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Tile {
    /// Flag `1`.
    Water,
    /// Flag `2`.
    Sand,
    /// Flag `4`.
    Grass,
    /// Flag `8`.
    Stone,
}

impl Tile {
    /// Number of tile kinds.
    pub const COUNT: usize = 4;

    /// The bitmask flag of this tile.
    pub const fn flag(self) -> u8 {
        1 << (self as u8)
    }

    /// Maps a single flag (`1`, `2`, `4` or `8`) back to its tile.
    pub fn from_flag(flag: u8) -> Result<Self, RulesError> {
        match flag {
            1 => Ok(Self::Water),
            2 => Ok(Self::Sand),
            4 => Ok(Self::Grass),
            8 => Ok(Self::Stone),
            other => Err(RulesError::InvalidFlag(other)),
        }
    }

    /// Lists every tile whose flag is set in `mask`, in flag order.
    pub fn from_mask(mask: u8) -> Result<Vec<Self>, RulesError> {
        if mask >= 16 {
            return Err(RulesError::InvalidMask(mask));
        }
        Ok(Self::ALL
            .iter()
            .copied()
            .filter(|tile| mask & tile.flag() != 0)
            .collect())
    }

    /// Combines a set of tiles into a mask.
    pub fn mask_of(tiles: impl IntoIterator<Item = Self>) -> u8 {
        tiles.into_iter().fold(0, |mask, tile| mask | tile.flag())
    }

    /// Human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Water => "Water",
            Self::Sand => "Sand",
            Self::Grass => "Grass",
            Self::Stone => "Stone",
        }
    }
}

impl Symbol for Tile {
    const ALL: &'static [Self] = &[Self::Water, Self::Sand, Self::Grass, Self::Stone];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_distinct_powers_of_two() {
        let flags: Vec<u8> = Tile::ALL.iter().map(|t| t.flag()).collect();
        assert_eq!(flags, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, tile) in Tile::ALL.iter().enumerate() {
            assert_eq!(tile.index(), i);
            assert_eq!(Tile::from_index(i), Some(*tile));
        }
        assert_eq!(Tile::from_index(4), None);
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(Tile::from_flag(4), Ok(Tile::Grass));
        assert_eq!(Tile::from_flag(3), Err(RulesError::InvalidFlag(3)));
        assert_eq!(Tile::from_flag(0), Err(RulesError::InvalidFlag(0)));
    }

    #[test]
    fn test_from_mask_lists_set_flags() {
        assert_eq!(Tile::from_mask(0), Ok(vec![]));
        assert_eq!(Tile::from_mask(0b0101), Ok(vec![Tile::Water, Tile::Grass]));
        assert_eq!(Tile::from_mask(15).map(|v| v.len()), Ok(4));
        assert_eq!(Tile::from_mask(16), Err(RulesError::InvalidMask(16)));
    }

    #[test]
    fn test_mask_of_inverts_from_mask() {
        for mask in 0..16u8 {
            let tiles = Tile::from_mask(mask).unwrap();
            assert_eq!(Tile::mask_of(tiles), mask);
        }
    }
}
