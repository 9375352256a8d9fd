use crate::{Symbol, Tile};

/// Options a resolved tile strikes from each orthogonal neighbor.
/// Indexed by `Tile::index`.
const RESOLVED_STRIKES: [&[Tile]; Tile::COUNT] = [
    &[Tile::Grass, Tile::Stone], // Water
    &[Tile::Stone],              // Sand
    &[Tile::Water],              // Grass
    &[Tile::Water, Tile::Sand],  // Stone
];

/// `(missing, struck)`: when `missing` is no longer among an unresolved
/// source's options, `struck` is removed from its neighbors.
const MISSING_STRIKES: &[(Tile, Tile)] = &[(Tile::Grass, Tile::Stone), (Tile::Sand, Tile::Water)];

/// Pairwise tile compatibility for terrain generation.
///
/// Holds two fixed lookup tables: what a committed tile removes from its
/// neighbors, and the partial rule applied while a source cell is still
/// unresolved but has lost options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyTable {
    resolved: [&'static [Tile]; Tile::COUNT],
    missing: &'static [(Tile, Tile)],
}

impl AdjacencyTable {
    /// The Water/Sand/Grass/Stone coastline table.
    pub const TERRAIN: Self = Self {
        resolved: RESOLVED_STRIKES,
        missing: MISSING_STRIKES,
    };

    /// Tiles that may not sit orthogonally next to a committed `tile`.
    #[inline]
    pub fn struck_by(&self, tile: Tile) -> &'static [Tile] {
        self.resolved[tile.index()]
    }

    /// Tiles to strike from the neighbors of an unresolved cell whose
    /// remaining options are `options`.
    pub fn struck_by_options(&self, options: &[Tile]) -> Vec<Tile> {
        self.missing
            .iter()
            .filter(|(missing, _)| !options.contains(missing))
            .map(|&(_, struck)| struck)
            .collect()
    }

    /// Checks whether `a` and `b` may be orthogonal neighbors.
    pub fn check(&self, a: Tile, b: Tile) -> bool {
        !self.struck_by(a).contains(&b) && !self.struck_by(b).contains(&a)
    }

    /// Every orthogonal pair in a row-major map that breaks [`Self::check`],
    /// as `((x, y), (x, y))` with the second cell right of or below the first.
    pub fn clashes(&self, tiles: &[Tile], width: usize) -> Vec<((usize, usize), (usize, usize))> {
        if width == 0 {
            return Vec::new();
        }
        let height = tiles.len() / width;
        let at = |x: usize, y: usize| tiles[y * width + x];
        let mut out = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if x + 1 < width && !self.check(at(x, y), at(x + 1, y)) {
                    out.push(((x, y), (x + 1, y)));
                }
                if y + 1 < height && !self.check(at(x, y), at(x, y + 1)) {
                    out.push(((x, y), (x, y + 1)));
                }
            }
        }
        out
    }
}

impl Default for AdjacencyTable {
    fn default() -> Self {
        Self::TERRAIN
    }
}
