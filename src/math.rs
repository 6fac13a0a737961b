use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Type alias for sets that iterate in a canonical order. Used wherever the order of
/// elements matters, for example for the transition relation of an automaton or for
/// the subsets built during determinization.
pub type OrderedSet<S> = BTreeSet<S>;
/// Type alias for maps that iterate in a canonical order.
pub type OrderedMap<K, V> = BTreeMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// A partition groups elements of type `I` into disjoint classes. Two partitions are
/// considered equal if they consist of the same classes, regardless of the order in
/// which the classes are stored.
#[derive(Debug, Clone)]
pub struct Partition<I: Hash + Eq>(Vec<BTreeSet<I>>);

impl<I: Hash + Eq> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Hash + Eq> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Hash + Eq> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Hash + Eq> Eq for Partition<I> {}

impl<I: Hash + Eq + Ord> Partition<I> {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a new partition from an iterator that yields iterators which yield
    /// elements of type `I`. Empty classes are dropped.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<BTreeSet<_>>())
                .filter(|class| !class.is_empty())
                .collect(),
        )
    }

    /// Returns the index of the class containing `elem`, if any.
    pub fn class_of(&self, elem: &I) -> Option<usize> {
        self.0.iter().position(|class| class.contains(elem))
    }
}

impl<I: Hash + Eq + Ord> From<Vec<BTreeSet<I>>> for Partition<I> {
    fn from(value: Vec<BTreeSet<I>>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;

    #[test]
    fn partition_equality_ignores_class_order() {
        let left = Partition::new([vec![0usize, 1], vec![2]]);
        let right = Partition::new([vec![2usize], vec![1, 0]]);
        assert_eq!(left, right);
        assert_eq!(left.size(), 2);
        assert_eq!(right.class_of(&1), Some(1));
        assert_eq!(left.class_of(&7), None);
    }

    #[test]
    fn partition_drops_empty_classes() {
        let partition = Partition::new([vec![1usize], vec![], vec![2, 3]]);
        assert_eq!(partition.size(), 2);
    }
}
