use std::fmt::Debug;
use std::hash::Hash;

/// A member of a fixed domain alphabet.
///
/// Every solver instantiation works over a small closed set of values known at
/// compile time. Option sets store one bit per alphabet member, addressed by
/// [`Symbol::index`], so `ALL[s.index()] == s` must hold for every symbol.
pub trait Symbol: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every member of the alphabet, in bit order.
    const ALL: &'static [Self];

    /// Position of this symbol inside [`Symbol::ALL`].
    fn index(self) -> usize;

    /// Looks up the symbol stored at `index`, if any.
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Size of the alphabet.
    fn count() -> usize {
        Self::ALL.len()
    }
}
