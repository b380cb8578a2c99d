//! Apprentissage de préférences par renforcement sur des tirages simulés.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use loto_db::models::POOL_SIZE;

use crate::sampler::weighted_sample;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RlParams {
    pub num_select: usize,
    pub episodes: usize,
    pub hit_weight: f64,
    pub roi_weight: f64,
    pub overlap_penalty: f64,
    pub learning_rate: f64,
    /// Plancher des préférences avant renormalisation.
    pub min_preference: f64,
    pub stake: f64,
    pub prize_per_hit: f64,
}

impl Default for RlParams {
    fn default() -> Self {
        Self {
            num_select: 5,
            episodes: 1000,
            hit_weight: 0.4,
            roi_weight: 0.4,
            overlap_penalty: 0.2,
            learning_rate: 0.01,
            min_preference: 0.01,
            stake: 300.0,
            prize_per_hit: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RlOutcome {
    /// (numéro, préférence) par préférence décroissante.
    pub preferences: Vec<(u8, f64)>,
    pub reward_history: Vec<f64>,
    pub top_numbers: Vec<u8>,
}

pub fn roi(hits: usize, params: &RlParams) -> f64 {
    (hits as f64 * params.prize_per_hit - params.stake) / params.stake
}

/// Récompense d'une sélection : taux de réussite et rendement, moins le recouvrement
/// avec la sélection précédente.
pub fn episode_reward(selection: &[u8], draw: &BTreeSet<u8>, previous: &[u8], params: &RlParams) -> f64 {
    let n = selection.len().max(1) as f64;
    let hits = selection.iter().filter(|&&s| draw.contains(&s)).count();
    let overlap = if previous.is_empty() {
        0.0
    } else {
        selection.iter().filter(|&&s| previous.contains(&s)).count() as f64 / n
    };
    params.hit_weight * (hits as f64 / n) + params.roi_weight * roi(hits, params)
        - params.overlap_penalty * overlap
}

fn update_preferences(preferences: &mut [f64], selection: &[u8], reward: f64, params: &RlParams) {
    for &n in selection {
        preferences[(n - 1) as usize] += params.learning_rate * reward;
    }
    for p in preferences.iter_mut() {
        *p = p.max(params.min_preference);
    }
    let total: f64 = preferences.iter().sum();
    for p in preferences.iter_mut() {
        *p /= total;
    }
}

pub fn run_rl_simulation(params: &RlParams, seed: u64) -> Result<RlOutcome> {
    let pool_size = POOL_SIZE as usize;
    if params.num_select == 0 || params.num_select > pool_size {
        bail!("num_select doit être entre 1 et {}, reçu {}", pool_size, params.num_select);
    }
    if params.stake <= 0.0 {
        bail!("La mise doit être positive");
    }

    let numbers: Vec<u8> = (1..=POOL_SIZE).collect();
    let mut preferences = vec![1.0 / pool_size as f64; pool_size];
    let mut reward_history = Vec::with_capacity(params.episodes);
    let mut previous: Vec<u8> = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..params.episodes {
        let selection = weighted_sample(&numbers, &preferences, params.num_select, &mut rng)?;
        let draw: BTreeSet<u8> = rand::seq::index::sample(&mut rng, pool_size, params.num_select)
            .into_iter()
            .map(|i| (i + 1) as u8)
            .collect();

        let reward = episode_reward(&selection, &draw, &previous, params);
        update_preferences(&mut preferences, &selection, reward, params);
        reward_history.push(reward);
        previous = selection;
    }

    let mut ranked: Vec<(u8, f64)> = numbers.iter().copied().zip(preferences).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let top_numbers = ranked.iter().take(10).map(|(n, _)| *n).collect();

    debug!("simulation RL : {} épisodes", params.episodes);
    Ok(RlOutcome { preferences: ranked, reward_history, top_numbers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi() {
        let params = RlParams::default();
        assert!((roi(0, &params) + 1.0).abs() < 1e-12);
        assert!((roi(3, &params) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_episode_reward() {
        let params = RlParams::default();
        let draw = BTreeSet::from([1, 2, 3, 4, 5]);
        // 2 réussites sur 5, pas de sélection précédente
        let r = episode_reward(&[1, 2, 10, 11, 12], &draw, &[], &params);
        let expected = 0.4 * 0.4 + 0.4 * ((1000.0 - 300.0) / 300.0);
        assert!((r - expected).abs() < 1e-12);

        // recouvrement total avec la précédente
        let r2 = episode_reward(&[1, 2, 10, 11, 12], &draw, &[1, 2, 10, 11, 12], &params);
        assert!((r2 - (expected - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_update_keeps_distribution() {
        let params = RlParams::default();
        let mut prefs = vec![1.0 / 39.0; 39];
        update_preferences(&mut prefs, &[1, 2, 3], -10.0, &params);
        let total: f64 = prefs.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        // les numéros pénalisés tombent au plancher avant renormalisation
        assert!(prefs[0] < prefs[10]);
    }

    #[test]
    fn test_simulation_outcome() {
        let params = RlParams { episodes: 200, ..RlParams::default() };
        let outcome = run_rl_simulation(&params, 42).unwrap();
        assert_eq!(outcome.reward_history.len(), 200);
        assert_eq!(outcome.preferences.len(), 39);
        assert_eq!(outcome.top_numbers.len(), 10);
        let total: f64 = outcome.preferences.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(outcome.preferences.windows(2).all(|w| w[0].1 >= w[1].1));

        let again = run_rl_simulation(&params, 42).unwrap();
        assert_eq!(outcome.top_numbers, again.top_numbers);
    }

    #[test]
    fn test_invalid_selection_size() {
        let params = RlParams { num_select: 0, ..RlParams::default() };
        assert!(run_rl_simulation(&params, 1).is_err());
        let params = RlParams { num_select: 40, ..RlParams::default() };
        assert!(run_rl_simulation(&params, 1).is_err());
    }
}
