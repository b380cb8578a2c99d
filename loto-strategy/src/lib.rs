//! Stratégies de sélection de numéros pour le 5/39 : features par numéro,
//! modèles, score de fusion, plans de mise et simulateurs.

pub mod backtest;
pub mod betting;
pub mod config;
pub mod features;
pub mod fusion;
pub mod models;
pub mod performance;
pub mod pipeline;
pub mod report;
pub mod rl;
pub mod sampler;
pub mod simulation;

#[cfg(test)]
pub(crate) fn make_test_draws(n: usize) -> Vec<loto_db::models::Draw> {
    // draws[0] = le plus récent
    (0..n)
        .map(|i| {
            let base = (i % 7) as u8;
            let offset = ((i / 7) % 3) as u8;
            let mut numbers = [
                base * 5 + 1 + offset,
                base * 5 + 2 + offset,
                base * 5 + 3 + offset,
                (base * 5 + 9 + offset) % 39 + 1,
                (base * 5 + 15 + offset) % 39 + 1,
            ];
            numbers.sort();
            loto_db::models::Draw {
                date: format!("{:04}-{:02}-{:02}", 2024 - (i / 336), 12 - (i / 28) % 12, 28 - i % 28),
                numbers,
            }
        })
        .collect()
}
