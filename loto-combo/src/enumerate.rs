use std::hash::Hash;

use itertools::Itertools;
use log::debug;

use crate::combination::{ComboSet, Combination};
use crate::error::ComboError;
use crate::partition::distinct;

/// Mode « connecté » : toutes les combinaisons de `k` numéros parmi le pool.
///
/// Un pool vide donne un ensemble vide ; `k == 0` ou `k` supérieur au nombre de numéros
/// distincts est une erreur.
pub fn enumerate_linked<T>(pool: &[T], k: usize) -> Result<ComboSet<T>, ComboError>
where
    T: Ord + Hash + Clone,
{
    let pool = distinct(pool);
    if k == 0 {
        return Err(ComboError::InvalidSelectionSize { k, available: pool.len() });
    }
    if pool.is_empty() {
        return Ok(ComboSet::new());
    }
    if k > pool.len() {
        return Err(ComboError::InvalidSelectionSize { k, available: pool.len() });
    }

    Ok(pool.into_iter().combinations(k).map(Combination::new).collect())
}

/// Mode « colonnes » : pour chaque choix de `k` colonnes, produit cartésien des colonnes
/// choisies en ne gardant que les tuples aux numéros tous distincts.
///
/// Un même tuple trié peut venir de plusieurs choix de colonnes ; il n'apparaît qu'une fois.
pub fn enumerate_grouped<T>(groups: &[Vec<T>], k: usize) -> Result<ComboSet<T>, ComboError>
where
    T: Ord + Clone,
{
    if k == 0 {
        return Err(ComboError::InvalidSelectionSize { k, available: groups.len() });
    }
    if k > groups.len() {
        return Err(ComboError::InsufficientGroups { k, groups: groups.len() });
    }

    let mut combos = ComboSet::new();
    let mut current: Vec<&T> = Vec::with_capacity(k);

    for chosen in (0..groups.len()).combinations(k) {
        let selected: Vec<&[T]> = chosen.iter().map(|&g| groups[g].as_slice()).collect();
        if selected.iter().any(|g| g.is_empty()) {
            continue;
        }
        collect_products(&selected, &mut current, &mut combos);
    }

    debug!(
        "{} colonnes, k={} : {} combinaisons uniques",
        groups.len(),
        k,
        combos.len()
    );
    Ok(combos)
}

/// Parcours en profondeur du produit cartésien. Une branche qui reprend un numéro déjà
/// présent est abandonnée avant d'être complétée.
fn collect_products<'a, T: Ord + Clone>(
    groups: &[&'a [T]],
    current: &mut Vec<&'a T>,
    out: &mut ComboSet<T>,
) {
    let Some((head, rest)) = groups.split_first() else {
        out.insert(Combination::new(current.iter().map(|&item| item.clone()).collect()));
        return;
    };

    for item in head.iter() {
        if current.contains(&item) {
            continue;
        }
        current.push(item);
        collect_products(rest, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_vecs(set: &ComboSet<u8>) -> Vec<Vec<u8>> {
        set.iter().map(|c| c.items().to_vec()).collect()
    }

    #[test]
    fn test_linked_three_choose_two() {
        let combos = enumerate_linked(&[3u8, 1, 2], 2).unwrap();
        assert_eq!(as_vecs(&combos), vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn test_linked_cardinality() {
        let pool: Vec<u8> = (1..=10).collect();
        assert_eq!(enumerate_linked(&pool, 3).unwrap().len(), 120);
        assert_eq!(enumerate_linked(&pool, 10).unwrap().len(), 1);
        assert_eq!(enumerate_linked(&pool, 1).unwrap().len(), 10);
    }

    #[test]
    fn test_linked_invalid_sizes() {
        assert_eq!(
            enumerate_linked(&[1u8, 2, 3], 0).unwrap_err(),
            ComboError::InvalidSelectionSize { k: 0, available: 3 }
        );
        assert_eq!(
            enumerate_linked(&[1u8, 2, 3], 4).unwrap_err(),
            ComboError::InvalidSelectionSize { k: 4, available: 3 }
        );
    }

    #[test]
    fn test_linked_empty_pool() {
        let pool: Vec<u8> = vec![];
        assert!(enumerate_linked(&pool, 3).unwrap().is_empty());
    }

    #[test]
    fn test_linked_duplicates_in_pool() {
        let combos = enumerate_linked(&[1u8, 1, 2, 2], 2).unwrap();
        assert_eq!(as_vecs(&combos), vec![vec![1, 2]]);
    }

    #[test]
    fn test_grouped_one_per_group() {
        let groups = vec![vec![1u8, 4], vec![2, 5], vec![3, 6]];
        let combos = enumerate_grouped(&groups, 3).unwrap();
        assert_eq!(combos.len(), 8);
        for combo in &combos {
            let items = combo.items();
            assert!(items.iter().any(|n| [1, 4].contains(n)));
            assert!(items.iter().any(|n| [2, 5].contains(n)));
            assert!(items.iter().any(|n| [3, 6].contains(n)));
        }
    }

    #[test]
    fn test_grouped_two_of_three() {
        let groups = vec![vec![1u8, 4], vec![2, 5], vec![3, 6]];
        // 3 paires de colonnes × 4 produits
        assert_eq!(enumerate_grouped(&groups, 2).unwrap().len(), 12);
    }

    #[test]
    fn test_grouped_insufficient_groups() {
        let groups = vec![vec![1u8], vec![2]];
        assert_eq!(
            enumerate_grouped(&groups, 3).unwrap_err(),
            ComboError::InsufficientGroups { k: 3, groups: 2 }
        );
    }

    #[test]
    fn test_grouped_zero_k() {
        let groups = vec![vec![1u8], vec![2]];
        assert!(matches!(
            enumerate_grouped(&groups, 0),
            Err(ComboError::InvalidSelectionSize { .. })
        ));
    }

    #[test]
    fn test_grouped_overlapping_groups_deduplicated() {
        // Colonnes mal construites : 2 apparaît deux fois
        let groups = vec![vec![1u8, 2], vec![2, 3]];
        let combos = enumerate_grouped(&groups, 2).unwrap();
        assert_eq!(as_vecs(&combos), vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn test_grouped_same_sorted_tuple_from_two_choices() {
        let groups = vec![vec![1u8, 2], vec![1, 2], vec![1, 2]];
        let combos = enumerate_grouped(&groups, 2).unwrap();
        assert_eq!(as_vecs(&combos), vec![vec![1, 2]]);
    }

    #[test]
    fn test_grouped_empty_groups() {
        let groups: Vec<Vec<u8>> = vec![vec![], vec![], vec![]];
        assert!(enumerate_grouped(&groups, 2).unwrap().is_empty());

        let groups = vec![vec![1u8, 2], vec![], vec![3]];
        assert_eq!(as_vecs(&enumerate_grouped(&groups, 2).unwrap()), vec![vec![1, 3], vec![2, 3]]);
    }

    #[test]
    fn test_grouped_idempotent() {
        let groups = vec![vec![1u8, 5, 9], vec![2, 6], vec![3, 7], vec![4, 8]];
        let a = enumerate_grouped(&groups, 3).unwrap();
        let b = enumerate_grouped(&groups, 3).unwrap();
        assert_eq!(a, b);
    }
}
