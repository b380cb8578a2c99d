use std::hash::Hash;
use std::ops::RangeInclusive;

use log::debug;

use crate::combination::ComboSet;
use crate::enumerate::enumerate_grouped;
use crate::error::ComboError;
use crate::partition::{partition, partition_by_score};
use crate::scoring::{ItemValue, Scorer};

/// Meilleure répartition trouvée par [`find_best_partition`].
#[derive(Debug, Clone)]
pub struct BestPartition<T> {
    pub group_count: usize,
    pub groups: Vec<Vec<T>>,
    pub combinations: ComboSet<T>,
    pub score: f64,
}

/// Essaie chaque nombre de colonnes de la plage (bornes incluses) et garde celui dont le
/// score moyen des combinaisons est strictement le plus haut. À égalité, le premier gagne.
///
/// Avec une carte de scores, la répartition suit l'ordre des scores décroissants ; sinon
/// l'ordre naturel. Les nombres de colonnes inférieurs à `k` sont ignorés, les scores NaN
/// ne sont jamais retenus.
pub fn find_best_partition<T>(
    items: &[T],
    scorer: Scorer<'_, T>,
    group_counts: RangeInclusive<usize>,
    k: usize,
) -> Result<BestPartition<T>, ComboError>
where
    T: Ord + Hash + Clone + ItemValue,
{
    if k == 0 {
        return Err(ComboError::InvalidSelectionSize { k, available: items.len() });
    }
    if group_counts.is_empty() {
        return Err(ComboError::InvalidConfiguration(format!(
            "plage de colonnes vide : {}..={}",
            group_counts.start(),
            group_counts.end()
        )));
    }

    let max_groups = *group_counts.end();
    let mut best: Option<BestPartition<T>> = None;
    let mut best_score = f64::NEG_INFINITY;
    let mut tried = false;

    for group_count in group_counts {
        if group_count < k {
            debug!("{group_count} colonnes ignorées (k={k})");
            continue;
        }

        let groups = match scorer.scores() {
            Some(scores) => partition_by_score(items, group_count, scores)?,
            None => partition(items, group_count)?,
        };
        let combinations = enumerate_grouped(&groups, k)?;
        let score = scorer.average(&combinations);
        tried = true;
        debug!(
            "{group_count} colonnes : {} combinaisons, score moyen {score:.4}",
            combinations.len()
        );

        if score.is_nan() {
            debug!("{group_count} colonnes : score non numérique ignoré");
            continue;
        }
        if best.is_none() || score > best_score {
            best_score = score;
            best = Some(BestPartition {
                group_count,
                groups,
                combinations,
                score,
            });
        }
    }

    match best {
        Some(best) => Ok(best),
        None if tried => Err(ComboError::UnscorablePartitions),
        None => Err(ComboError::InsufficientGroups { k, groups: max_groups }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Fallback, ScoreMap};

    #[test]
    fn test_first_candidate_wins_ties() {
        // Sans carte et avec Fallback::Zero, tous les scores valent 0
        let items: Vec<u8> = (1..=10).collect();
        let best = find_best_partition(&items, Scorer::without_scores(Fallback::Zero), 3..=6, 3)
            .unwrap();
        assert_eq!(best.group_count, 3);
        assert_eq!(best.score, 0.0);
    }

    #[test]
    fn test_best_score_is_maximum() {
        let items: Vec<u8> = (1..=10).collect();
        let scores: ScoreMap<u8> = items.iter().map(|&n| (n, n as f64)).collect();
        let scorer = Scorer::with_scores(&scores);
        let best = find_best_partition(&items, scorer, 3..=6, 3).unwrap();

        for group_count in 3..=6 {
            let groups = partition_by_score(&items, group_count, &scores).unwrap();
            let combos = enumerate_grouped(&groups, 3).unwrap();
            assert!(scorer.average(&combos) <= best.score);
        }
        assert_eq!(best.groups.len(), best.group_count);
    }

    #[test]
    fn test_skips_group_counts_below_k() {
        let items: Vec<u8> = (1..=8).collect();
        let best = find_best_partition(&items, Scorer::without_scores(Fallback::ItemValue), 1..=4, 3)
            .unwrap();
        assert!(best.group_count >= 3);
    }

    #[test]
    fn test_all_candidates_below_k() {
        let items: Vec<u8> = (1..=8).collect();
        let err = find_best_partition(&items, Scorer::without_scores(Fallback::Zero), 1..=2, 3)
            .unwrap_err();
        assert_eq!(err, ComboError::InsufficientGroups { k: 3, groups: 2 });
    }

    #[test]
    fn test_empty_range() {
        let items: Vec<u8> = (1..=8).collect();
        #[allow(clippy::reversed_empty_ranges)]
        let err = find_best_partition(&items, Scorer::without_scores(Fallback::Zero), 6..=3, 3)
            .unwrap_err();
        assert!(matches!(err, ComboError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_nan_scores_never_chosen() {
        let items: Vec<u8> = (1..=8).collect();
        let scores: ScoreMap<u8> = items.iter().map(|&n| (n, f64::NAN)).collect();
        let err = find_best_partition(&items, Scorer::with_scores(&scores), 3..=6, 3).unwrap_err();
        assert_eq!(err, ComboError::UnscorablePartitions);
    }

    #[test]
    fn test_empty_score_map_partitions_naturally() {
        let items: Vec<u8> = vec![6, 1, 5, 2, 4, 3];
        let empty: ScoreMap<u8> = ScoreMap::new();
        let best = find_best_partition(&items, Scorer::with_scores(&empty), 3..=3, 3).unwrap();
        assert_eq!(best.groups, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
        assert!((best.score - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let items: Vec<u8> = vec![5, 17, 23, 31, 8, 12, 39, 2];
        let scores: ScoreMap<u8> = items.iter().map(|&n| (n, (n % 7) as f64)).collect();
        let a = find_best_partition(&items, Scorer::with_scores(&scores), 3..=6, 3).unwrap();
        let b = find_best_partition(&items, Scorer::with_scores(&scores), 3..=6, 3).unwrap();
        assert_eq!(a.group_count, b.group_count);
        assert_eq!(a.groups, b.groups);
        assert_eq!(a.combinations, b.combinations);
    }
}
