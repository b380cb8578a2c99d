use std::collections::BTreeMap;

/// Suggère un nombre de colonnes d'après la dispersion des finales (`n % 10`) et des
/// dizaines (`n / 10`) : plus les numéros se concentrent, plus on ouvre de colonnes.
pub fn suggest_group_count<T>(numbers: &[T], min_groups: usize, max_groups: usize) -> usize
where
    T: Copy + Into<u32>,
{
    let mut tails: BTreeMap<u32, usize> = BTreeMap::new();
    let mut heads: BTreeMap<u32, usize> = BTreeMap::new();
    for &n in numbers {
        let n: u32 = n.into();
        *tails.entry(n % 10).or_default() += 1;
        *heads.entry(n / 10).or_default() += 1;
    }

    let (Some(tail_std), Some(head_std)) = (sample_std(&tails), sample_std(&heads)) else {
        return min_groups;
    };

    let score = (tail_std + head_std) / 2.0;
    if score > 2.5 {
        max_groups
    } else if score > 1.5 {
        (min_groups + 1).max(max_groups.saturating_sub(1))
    } else {
        min_groups
    }
}

/// Écart-type corrigé (n − 1) des effectifs ; indéfini sous deux valeurs.
fn sample_std(counts: &BTreeMap<u32, usize>) -> Option<f64> {
    let n = counts.len();
    if n < 2 {
        return None;
    }
    let mean = counts.values().sum::<usize>() as f64 / n as f64;
    let variance = counts
        .values()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_numbers_get_min() {
        let numbers: Vec<u8> = (1..=39).collect();
        assert_eq!(suggest_group_count(&numbers, 3, 6), 3);
    }

    #[test]
    fn test_concentrated_tails_get_max() {
        let numbers: Vec<u32> = vec![1, 11, 21, 31, 41, 51, 61, 71, 2];
        assert_eq!(suggest_group_count(&numbers, 3, 6), 6);
    }

    #[test]
    fn test_moderate_concentration() {
        let numbers: Vec<u32> = vec![1, 11, 21, 31, 41, 2];
        assert_eq!(suggest_group_count(&numbers, 3, 6), 5);
    }

    #[test]
    fn test_undefined_std_falls_back_to_min() {
        let empty: Vec<u8> = vec![];
        assert_eq!(suggest_group_count(&empty, 3, 6), 3);
        assert_eq!(suggest_group_count(&[7u8], 3, 6), 3);
    }
}
