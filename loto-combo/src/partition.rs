use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use crate::error::ComboError;
use crate::scoring::ScoreMap;

/// Répartit les numéros en `group_count` colonnes, dans l'ordre naturel croissant.
pub fn partition<T>(items: &[T], group_count: usize) -> Result<Vec<Vec<T>>, ComboError>
where
    T: Ord + Hash + Clone,
{
    partition_by(items, group_count, |a, b| a.cmp(b))
}

/// Répartit les numéros par score décroissant : les mieux classés tombent dans des
/// colonnes différentes. Un numéro sans score passe en dernier.
pub fn partition_by_score<T>(
    items: &[T],
    group_count: usize,
    scores: &ScoreMap<T>,
) -> Result<Vec<Vec<T>>, ComboError>
where
    T: Ord + Hash + Clone,
{
    partition_by(items, group_count, |a, b| {
        let sa = scores.get(a).copied().unwrap_or(f64::NEG_INFINITY);
        let sb = scores.get(b).copied().unwrap_or(f64::NEG_INFINITY);
        sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
    })
}

/// Trie selon `compare` (à égalité : ordre naturel), puis affecte le i-ème numéro à la
/// colonne `i % group_count`. Les doublons de l'entrée sont ignorés.
pub fn partition_by<T, F>(
    items: &[T],
    group_count: usize,
    compare: F,
) -> Result<Vec<Vec<T>>, ComboError>
where
    T: Ord + Hash + Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    if group_count == 0 {
        return Err(ComboError::InvalidConfiguration(
            "le nombre de colonnes doit être ≥ 1".to_string(),
        ));
    }

    let mut sorted = distinct(items);
    sorted.sort();
    sorted.sort_by(compare);

    let mut groups: Vec<Vec<T>> = vec![Vec::new(); group_count];
    for (i, item) in sorted.into_iter().enumerate() {
        groups[i % group_count].push(item);
    }
    Ok(groups)
}

/// Supprime les doublons en gardant la première occurrence.
pub(crate) fn distinct<T: Hash + Eq + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_ascending() {
        let groups = partition(&[6u8, 1, 4, 3, 2, 5], 3).unwrap();
        assert_eq!(groups, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    }

    #[test]
    fn test_zero_groups_rejected() {
        let err = partition(&[1u8, 2, 3], 0).unwrap_err();
        assert!(matches!(err, ComboError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_more_groups_than_items() {
        let groups = partition(&[1u8, 2], 4).unwrap();
        assert_eq!(groups, vec![vec![1], vec![2], vec![], vec![]]);
    }

    #[test]
    fn test_duplicates_removed() {
        let groups = partition(&[3u8, 3, 1, 1, 2], 2).unwrap();
        assert_eq!(groups, vec![vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_sizes_differ_by_at_most_one() {
        let items: Vec<u8> = (1..=39).collect();
        for group_count in 1..=12 {
            let groups = partition(&items, group_count).unwrap();
            let max = groups.iter().map(Vec::len).max().unwrap();
            let min = groups.iter().map(Vec::len).min().unwrap();
            assert!(max - min <= 1, "{group_count} colonnes : {min}..{max}");
            let total: usize = groups.iter().map(Vec::len).sum();
            assert_eq!(total, 39);
        }
    }

    #[test]
    fn test_partition_by_score_spreads_top_ranked() {
        let scores: ScoreMap<u8> = [(1, 0.1), (2, 0.9), (3, 0.8), (4, 0.7), (5, 0.2), (6, 0.3)]
            .into_iter()
            .collect();
        let groups = partition_by_score(&[1, 2, 3, 4, 5, 6], 3, &scores).unwrap();
        // Ordre décroissant : 2, 3, 4, 6, 5, 1
        assert_eq!(groups, vec![vec![2, 6], vec![3, 5], vec![4, 1]]);
    }

    #[test]
    fn test_partition_by_score_ties_and_missing() {
        let scores: ScoreMap<u8> = [(4, 1.0), (2, 1.0)].into_iter().collect();
        let groups = partition_by_score(&[4, 3, 2, 1], 2, &scores).unwrap();
        // 2 et 4 à égalité (ordre naturel), puis 1 et 3 sans score
        assert_eq!(groups, vec![vec![2, 1], vec![4, 3]]);
    }

    #[test]
    fn test_partition_by_custom_order() {
        let groups = partition_by(&[1u8, 2, 3, 4], 2, |a, b| b.cmp(a)).unwrap();
        assert_eq!(groups, vec![vec![4, 2], vec![3, 1]]);
    }
}
