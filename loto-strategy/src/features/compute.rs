use loto_db::models::{Draw, PICK_COUNT, POOL_SIZE};

use super::{FeatureRow, UPCOMING_DATE};

const HOT_TAIL_COUNT: usize = 3;
const RECENT_HOT_RATIO: f64 = 1.5;

/// Features de chaque numéro pour le tirage `target_draw_idx`, calculées sur les tirages
/// strictement plus anciens. draws[0] = le plus récent.
pub fn extract_features_for_draw(draws: &[Draw], target_draw_idx: usize) -> Vec<FeatureRow> {
    let target = &draws[target_draw_idx];
    let history = if target_draw_idx + 1 < draws.len() {
        &draws[target_draw_idx + 1..]
    } else {
        &[]
    };
    rows_for_history(history, &target.date, |n| target.contains(n))
}

pub fn upcoming_features(draws: &[Draw]) -> Vec<FeatureRow> {
    rows_for_history(draws, UPCOMING_DATE, |_| false)
}

fn rows_for_history(history: &[Draw], date: &str, drawn: impl Fn(u8) -> bool) -> Vec<FeatureRow> {
    let hot_tails = hot_tails(history, 10);
    (1..=POOL_SIZE)
        .map(|number| FeatureRow {
            date: date.to_string(),
            number,
            features: compute_features_for_number(number, history, &hot_tails),
            label: if drawn(number) { 1.0 } else { 0.0 },
        })
        .collect()
}

fn compute_features_for_number(number: u8, history: &[Draw], hot_tails: &[u8]) -> Vec<f64> {
    let tail = number % 10;

    let draw_streak = history.iter().take_while(|d| d.contains(number)).count() as f64;

    let appearances: Vec<usize> = history
        .iter()
        .enumerate()
        .filter(|(_, d)| d.contains(number))
        .map(|(i, _)| i)
        .take(2)
        .collect();
    let cooldown = appearances.first().copied().unwrap_or(history.len()) as f64;
    let last_draw_gap = match appearances.as_slice() {
        [a, b] => (b - a) as f64,
        _ => history.len() as f64,
    };

    let freq_10 = count_in(number, history, 0, 10);
    let freq_20 = count_in(number, history, 0, 20);
    let freq_30 = count_in(number, history, 0, 30);
    // 10 derniers contre les 10 précédents
    let momentum = freq_10 - count_in(number, history, 10, 20);

    let tail_freq_10 = history
        .iter()
        .take(10)
        .flat_map(|d| d.numbers.iter())
        .filter(|&&n| n % 10 == tail)
        .count() as f64;
    let is_hot_tail = if hot_tails.contains(&tail) { 1.0 } else { 0.0 };

    let streak_cooldown_combo = draw_streak / (1.0 + cooldown);

    let window = history.len().min(10) as f64;
    let expected = window * PICK_COUNT as f64 / POOL_SIZE as f64;
    let is_recent_hot = if window > 0.0 && freq_10 > RECENT_HOT_RATIO * expected { 1.0 } else { 0.0 };

    vec![
        draw_streak,                // 0
        last_draw_gap,              // 1
        cooldown,                   // 2
        momentum,                   // 3
        freq_10,                    // 4
        freq_20,                    // 5
        freq_30,                    // 6
        tail as f64,                // 7
        (number / 10) as f64,       // 8
        tail_freq_10,               // 9
        is_hot_tail,                // 10
        streak_cooldown_combo,      // 11
        is_recent_hot,              // 12
    ]
}

fn count_in(number: u8, history: &[Draw], from: usize, to: usize) -> f64 {
    let to = to.min(history.len());
    if from >= to {
        return 0.0;
    }
    history[from..to].iter().filter(|d| d.contains(number)).count() as f64
}

/// Les trois chiffres des unités les plus fréquents sur la fenêtre (à égalité, le plus petit).
fn hot_tails(history: &[Draw], window: usize) -> Vec<u8> {
    let mut counts = [0usize; 10];
    for draw in history.iter().take(window) {
        for &n in &draw.numbers {
            counts[(n % 10) as usize] += 1;
        }
    }
    let mut tails: Vec<u8> = (0..10).filter(|&t| counts[t as usize] > 0).collect();
    tails.sort_by(|a, b| counts[*b as usize].cmp(&counts[*a as usize]).then(a.cmp(b)));
    tails.truncate(HOT_TAIL_COUNT);
    tails
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(date: &str, numbers: [u8; 5]) -> Draw {
        Draw { date: date.to_string(), numbers }
    }

    fn history() -> Vec<Draw> {
        vec![
            draw("2024-01-05", [1, 11, 21, 30, 39]),
            draw("2024-01-04", [1, 2, 3, 4, 5]),
            draw("2024-01-03", [6, 7, 8, 9, 10]),
            draw("2024-01-02", [1, 12, 13, 14, 15]),
            draw("2024-01-01", [16, 17, 18, 19, 20]),
        ]
    }

    fn features_of(rows: &[FeatureRow], number: u8) -> &[f64] {
        &rows[(number - 1) as usize].features
    }

    #[test]
    fn test_streak_and_cooldown() {
        let rows = upcoming_features(&history());
        let one = features_of(&rows, 1);
        assert_eq!(one[0], 2.0); // draw_streak
        assert_eq!(one[2], 0.0); // cooldown
        assert_eq!(one[1], 1.0); // last_draw_gap
        let six = features_of(&rows, 6);
        assert_eq!(six[0], 0.0);
        assert_eq!(six[2], 2.0);
        assert_eq!(six[1], 5.0); // une seule apparition
    }

    #[test]
    fn test_never_drawn_cooldown_is_history_len() {
        let rows = upcoming_features(&history());
        let never = features_of(&rows, 25);
        assert_eq!(never[2], 5.0);
        assert_eq!(never[4], 0.0);
        assert_eq!(never[11], 0.0);
    }

    #[test]
    fn test_tail_and_zone() {
        let rows = upcoming_features(&history());
        let n = features_of(&rows, 37);
        assert_eq!(n[7], 7.0);
        assert_eq!(n[8], 3.0);
    }

    #[test]
    fn test_hot_tails() {
        // unité 1 : cinq fois, unités 0 et 9 : trois fois
        let tails = hot_tails(&history(), 10);
        assert_eq!(tails.len(), 3);
        assert_eq!(tails[0], 1);
        assert_eq!(tails[1], 0);
        assert_eq!(tails[2], 9);
        let rows = upcoming_features(&history());
        assert_eq!(features_of(&rows, 31)[10], 1.0);
        assert_eq!(features_of(&rows, 30)[10], 1.0);
    }

    #[test]
    fn test_recent_hot() {
        // 1 sorti 3 fois en 5 tirages, attendu 5*5/39 ≈ 0.64
        let rows = upcoming_features(&history());
        assert_eq!(features_of(&rows, 1)[12], 1.0);
        assert_eq!(features_of(&rows, 2)[12], 1.0);
        assert_eq!(features_of(&rows, 25)[12], 0.0);
    }

    #[test]
    fn test_label_from_target() {
        let draws = history();
        let rows = extract_features_for_draw(&draws, 0);
        assert_eq!(rows[0].label, 1.0);
        assert_eq!(rows[1].label, 0.0);
        assert_eq!(rows[0].date, "2024-01-05");
        // historique sans le tirage cible : 1 a une série de 1
        assert_eq!(rows[0].features[0], 1.0);
    }

    #[test]
    fn test_momentum() {
        let mut draws = Vec::new();
        for i in 0..20 {
            let numbers = if i < 10 { [1, 2, 3, 4, 5] } else { [6, 7, 8, 9, 10] };
            draws.push(draw(&format!("2024-01-{:02}", 28 - i), numbers));
        }
        let rows = upcoming_features(&draws);
        assert_eq!(features_of(&rows, 1)[3], 10.0);
        assert_eq!(features_of(&rows, 6)[3], -10.0);
        assert_eq!(features_of(&rows, 20)[3], 0.0);
    }
}
