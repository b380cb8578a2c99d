use std::collections::BTreeSet;
use std::fmt;

/// Combinaison canonique : numéros distincts triés par ordre croissant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Combination<T>(Vec<T>);

/// Ensemble dédupliqué et ordonné de combinaisons.
pub type ComboSet<T> = BTreeSet<Combination<T>>;

impl<T: Ord> Combination<T> {
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort();
        Self(items)
    }
}

impl<T> Combination<T> {
    pub fn items(&self) -> &[T] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: fmt::Display> fmt::Display for Combination<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_items() {
        let combo = Combination::new(vec![9u8, 2, 5]);
        assert_eq!(combo.items(), &[2, 5, 9]);
    }

    #[test]
    fn test_permutations_are_equal() {
        let mut set = ComboSet::new();
        set.insert(Combination::new(vec![3u8, 1, 2]));
        set.insert(Combination::new(vec![2u8, 3, 1]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_display() {
        let combo = Combination::new(vec![12u8, 3]);
        assert_eq!(combo.to_string(), "(3, 12)");
    }
}
