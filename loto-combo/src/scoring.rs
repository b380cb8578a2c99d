use std::collections::HashMap;
use std::hash::Hash;

use crate::combination::{ComboSet, Combination};

/// Score par numéro (typiquement le score de fusion).
pub type ScoreMap<T> = HashMap<T, f64>;

/// Pondération appliquée quand aucune carte de scores n'est fournie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Chaque numéro vaut 0.
    #[default]
    Zero,
    /// Chaque numéro vaut sa propre valeur numérique.
    ItemValue,
}

/// Valeur numérique d'un numéro, utilisée par [`Fallback::ItemValue`].
pub trait ItemValue {
    fn item_value(&self) -> f64;
}

macro_rules! impl_item_value {
    ($($t:ty),*) => {
        $(impl ItemValue for $t {
            fn item_value(&self) -> f64 {
                *self as f64
            }
        })*
    };
}

impl_item_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

/// Note les combinaisons à partir d'une carte de scores optionnelle.
///
/// Avec une carte, un numéro absent vaut 0. Sans carte, ou avec une carte vide, c'est le
/// [`Fallback`] qui décide.
pub struct Scorer<'a, T> {
    scores: Option<&'a ScoreMap<T>>,
    fallback: Fallback,
}

impl<T> Clone for Scorer<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Scorer<'_, T> {}

impl<'a, T> Scorer<'a, T>
where
    T: Eq + Hash + ItemValue,
{
    pub fn new(scores: Option<&'a ScoreMap<T>>, fallback: Fallback) -> Self {
        Self {
            scores: scores.filter(|map| !map.is_empty()),
            fallback,
        }
    }

    /// Carte de scores, chaque numéro valant sa propre valeur si la carte est vide.
    pub fn with_scores(scores: &'a ScoreMap<T>) -> Self {
        Self::new(Some(scores), Fallback::ItemValue)
    }

    pub fn without_scores(fallback: Fallback) -> Self {
        Self::new(None, fallback)
    }

    pub fn scores(&self) -> Option<&'a ScoreMap<T>> {
        self.scores
    }

    pub fn item_score(&self, item: &T) -> f64 {
        match self.scores {
            Some(map) => map.get(item).copied().unwrap_or(0.0),
            None => match self.fallback {
                Fallback::Zero => 0.0,
                Fallback::ItemValue => item.item_value(),
            },
        }
    }

    /// Moyenne arithmétique des scores des numéros de la combinaison.
    pub fn combo_score(&self, combo: &Combination<T>) -> f64 {
        if combo.is_empty() {
            return 0.0;
        }
        let total: f64 = combo.items().iter().map(|item| self.item_score(item)).sum();
        total / combo.len() as f64
    }

    /// Moyenne des moyennes par combinaison (0 pour un ensemble vide).
    pub fn average(&self, combinations: &ComboSet<T>) -> f64 {
        if combinations.is_empty() {
            return 0.0;
        }
        let total: f64 = combinations.iter().map(|c| self.combo_score(c)).sum();
        total / combinations.len() as f64
    }
}

pub fn average_combo_score<T>(
    combinations: &ComboSet<T>,
    scores: Option<&ScoreMap<T>>,
    fallback: Fallback,
) -> f64
where
    T: Eq + Hash + ItemValue,
{
    Scorer::new(scores, fallback).average(combinations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combos(raw: &[&[u8]]) -> ComboSet<u8> {
        raw.iter().map(|c| Combination::new(c.to_vec())).collect()
    }

    #[test]
    fn test_item_value_fallback() {
        let set = combos(&[&[1, 2], &[3, 4]]);
        let score = average_combo_score(&set, None, Fallback::ItemValue);
        assert!((score - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_fallback() {
        let set = combos(&[&[1, 2], &[3, 4]]);
        assert_eq!(average_combo_score(&set, None, Fallback::Zero), 0.0);
    }

    #[test]
    fn test_missing_entries_score_zero() {
        let map: ScoreMap<u8> = [(1, 1.0), (2, 3.0)].into_iter().collect();
        let set = combos(&[&[1, 2], &[1, 9]]);
        // (1+3)/2 = 2.0 ; (1+0)/2 = 0.5 ; moyenne = 1.25
        let score = average_combo_score(&set, Some(&map), Fallback::ItemValue);
        assert!((score - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_mean_of_means_not_flat_mean() {
        let map: ScoreMap<u8> = [(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (5, 5.0)]
            .into_iter()
            .collect();
        let set = combos(&[&[1, 2], &[3, 4, 5]]);
        // (1.5 + 4.0) / 2 = 2.75, la moyenne à plat serait 3.0
        let score = Scorer::with_scores(&map).average(&set);
        assert!((score - 2.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_map_uses_fallback() {
        let empty: ScoreMap<u8> = ScoreMap::new();
        let set = combos(&[&[1, 2], &[3, 4]]);
        let score = average_combo_score(&set, Some(&empty), Fallback::ItemValue);
        assert!((score - 2.5).abs() < 1e-12);
        assert!((Scorer::with_scores(&empty).average(&set) - 2.5).abs() < 1e-12);
        assert!(Scorer::with_scores(&empty).scores().is_none());
        assert_eq!(average_combo_score(&set, Some(&empty), Fallback::Zero), 0.0);
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let set: ComboSet<u8> = ComboSet::new();
        assert_eq!(Scorer::without_scores(Fallback::ItemValue).average(&set), 0.0);
    }
}
