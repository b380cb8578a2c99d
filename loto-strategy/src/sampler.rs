use anyhow::{Context, Result};
use chrono::Datelike;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;

/// Génère un seed déterministe basé sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

/// Tirage pondéré sans remise : chaque élément retenu est retiré avant le tirage suivant.
/// Retourne au plus `amount` éléments, dans l'ordre du tirage.
pub fn weighted_sample<T: Copy>(items: &[T], weights: &[f64], amount: usize, rng: &mut StdRng) -> Result<Vec<T>> {
    let mut remaining: Vec<(T, f64)> = items.iter().copied().zip(weights.iter().copied()).collect();
    let mut selected = Vec::with_capacity(amount.min(remaining.len()));

    while selected.len() < amount && !remaining.is_empty() {
        let dist = WeightedIndex::<f64>::new(remaining.iter().map(|(_, w)| *w))
            .context("Poids de tirage invalides")?;
        let (item, _) = remaining.remove(dist.sample(rng));
        selected.push(item);
    }
    Ok(selected)
}
