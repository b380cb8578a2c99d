use std::collections::BTreeMap;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use textplots::{Chart, Plot, Shape};

use loto_combo::{BestPartition, Plan};
use loto_db::models::Draw;
use loto_strategy::backtest::{ColumnHitReport, FusionBacktest, GroupHit, HitRateReport, IntervalReport};
use loto_strategy::betting::BettingSimulation;
use loto_strategy::fusion::{Selection, StrategyResult};
use loto_strategy::models::digits::DigitPrediction;
use loto_strategy::performance::PerformanceRecord;
use loto_strategy::report::Report;
use loto_strategy::rl::RlOutcome;
use loto_strategy::simulation::{BreakEven, DayOutcome, MonteCarloSummary, MultiWinOutcome};

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers.iter().map(|n| format!("{:2}", n)).collect::<Vec<_>>().join(" - ")
}

pub fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("=> "));
    Ok(pb)
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Date", "Numéros"]);
    for draw in draws {
        table.add_row(vec![draw.date.clone(), join_numbers(&draw.numbers)]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Remplacés         : {}", result.replaced);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_gain_table(gains: &[(String, f64)]) {
    println!("\n== Importance des features (gain moyen) ==\n");
    let mut table = new_table(vec!["Feature", "Gain"]);
    for (feature, gain) in gains {
        table.add_row(vec![feature.clone(), format!("{:.4}", gain)]);
    }
    println!("{table}");
}

pub fn display_strategy(result: &StrategyResult) {
    println!("\n== Classement par score de fusion ==\n");
    let mut table = new_table(vec!["Rang", "Numéro", "Score", "Probabilité", "Gain", "Auto", "Fusion"]);
    for (rank, number) in result.fusion_ranking().iter().enumerate() {
        let Some(s) = result.scored_number(*number) else { continue };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(format!("{:2}", s.number)).fg(Color::Green),
            Cell::new(format!("{:.2}", s.score)),
            Cell::new(format!("{:.4}", s.prob)),
            Cell::new(format!("{:.2}", s.gain_score)),
            Cell::new(format!("{:.4}", s.auto_score)),
            Cell::new(format!("{:.4}", s.fusion_score)),
        ]);
    }
    println!("{table}");

    println!("\n== Sélections combinées ==\n");
    let mut sources_table = new_table(vec!["Numéro", "Stratégies"]);
    for (number, sources) in result.sources() {
        let names = sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ");
        sources_table.add_row(vec![format!("{:2}", number), names]);
    }
    println!("{sources_table}");

    println!();
    for selection in Selection::ALL {
        println!("  {:<10} → {} numéros", selection.name(), result.selection(selection).len());
    }
    println!("  Total combiné : {} numéros", result.sources().len());
}

fn display_plan(title: &str, plan: &Plan<u8>, preview: usize) {
    println!("\n📌 {}", title);
    println!("  Combinaisons : {}", plan.total_combos);
    println!("  Coût total   : {}", plan.total_cost);
    println!("  Score moyen  : {:.4}", plan.aggregate_score);
    if plan.total_combos > 0 {
        println!("  Aperçu :");
        for combo in plan.preview(preview) {
            println!("    {}", combo);
        }
    }
}

fn display_groups(groups: &[Vec<u8>]) {
    for (i, group) in groups.iter().enumerate() {
        let mut sorted = group.clone();
        sorted.sort();
        println!("  Colonne {} → {}", i + 1, join_numbers(&sorted));
    }
}

pub fn display_betting(sim: &BettingSimulation) {
    println!("\nNuméros retenus : {}", join_numbers(&sim.numbers));
    display_plan("Mise connectée", &sim.linked, 5);
    display_best_column(&sim.best_column);
    display_plan(&format!("Meilleure mise en colonnes ({} colonnes)", sim.best_column.group_count), &sim.column, 5);
}

fn display_best_column(best: &BestPartition<u8>) {
    println!("\nRépartition retenue ({} colonnes, score {:.4}) :", best.group_count, best.score);
    display_groups(&best.groups);
}

pub fn display_custom_columns(groups: &[Vec<u8>], plan: &Plan<u8>) {
    println!("\nColonnes :");
    display_groups(groups);
    display_plan(&format!("Mise en colonnes libre ({} colonnes)", groups.len()), plan, 5);
}

pub fn display_hit_rate(report: &HitRateReport) {
    println!("\n📊 Réussite globale sur {} tirages", report.periods);
    println!("  Numéros trouvés : {}", report.total_hits);
    println!("  Moyenne par tirage : {:.2}", report.average_hits);
    display_distribution("Trouvés", &report.distribution);
}

fn display_distribution(label: &str, distribution: &BTreeMap<usize, usize>) {
    let mut table = new_table(vec![label, "Tirages"]);
    for (k, count) in distribution {
        table.add_row(vec![k.to_string(), count.to_string()]);
    }
    println!("{table}");
}

pub fn display_column_hits(report: &ColumnHitReport) {
    println!("\n🧪 Colonnes touchées (objectif : au moins {})", report.k);
    println!("  Réussites : {} / {} ({:.2}%)", report.successes, report.periods, report.rate * 100.0);
    display_distribution("Colonnes", &report.distribution);
    if !report.preview.is_empty() {
        println!("  Premiers tirages touchant 3 colonnes :");
        for draw in &report.preview {
            println!("    {} → {}", draw.date, join_numbers(&draw.numbers));
        }
    }
}

pub fn display_group_hits(hits: &[GroupHit]) {
    println!("\n🔍 Derniers tirages touchant 3 colonnes ({})", hits.len());
    let mut table = new_table(vec!["Date", "Dans les colonnes", "Tirage"]);
    for hit in hits {
        table.add_row(vec![hit.date.clone(), join_numbers(&hit.hit_numbers), join_numbers(&hit.numbers)]);
    }
    println!("{table}");
}

pub fn display_intervals(report: &IntervalReport) {
    println!("\n📊 Écarts entre tirages touchant 3 colonnes ({} occurrences)", report.hits.len());
    match report.mean_interval {
        Some(mean) => {
            println!("  Écart moyen : {:.2} tirages", mean);
            let recent = report.hits.len().saturating_sub(10);
            for pair in report.hits[recent..].windows(2) {
                println!("    {} → {} : {} tirages", pair[0].1, pair[1].1, pair[1].0 - pair[0].0);
            }
        }
        None => println!("  Pas assez d'occurrences pour calculer un écart."),
    }
}

pub fn display_fusion_backtest(report: &FusionBacktest) {
    println!("\n📊 Backtest des sélections combinées");
    println!("  Tirages        : {}", report.periods);
    println!("  Avec réussite  : {}", report.hit_periods);
    println!("  Taux           : {:.2}%", report.hit_rate * 100.0);
    println!("  Moyenne        : {:.2}", report.mean_hits);
    println!("  Écart-type     : {:.2}", report.std_hits);
}

pub fn display_digits(prediction: &DigitPrediction) {
    println!("\n== Prédiction des chiffres ==\n");
    let mut table = new_table(vec!["Chiffre", "P(unités)", "P(dizaines)"]);
    for digit in 0..prediction.tail_probabilities.len() {
        let head = prediction
            .head_probabilities
            .get(digit)
            .map(|p| format!("{:.3}", p))
            .unwrap_or_default();
        table.add_row(vec![
            digit.to_string(),
            format!("{:.3}", prediction.tail_probabilities[digit]),
            head,
        ]);
    }
    println!("{table}");
    println!("  Unités retenues   : {:?}", prediction.tails);
    println!("  Dizaines retenues : {:?}", prediction.heads);
    println!("  Candidats         : {}", join_numbers(&prediction.candidates));
    println!("  Sélection         : {}", join_numbers(&prediction.numbers));
}

pub fn display_day_outcome(outcome: &DayOutcome) {
    println!("Gain au jour {} :", outcome.day);
    println!("  Mises cumulées : {}", outcome.cumulative_cost);
    println!("  Gain           : {}", outcome.reward);
    println!("  Bilan net      : {}", outcome.net_profit);
}

pub fn display_multi_wins(outcome: &MultiWinOutcome) {
    println!("Jours gagnants {:?} :", outcome.win_days);
    println!("  Mises cumulées : {}", outcome.cumulative_cost);
    println!("  Gains          : {}", outcome.total_reward);
    println!("  Bilan net      : {}", outcome.net_profit);
}

pub fn display_break_even(outcome: &BreakEven, max_days: u32) {
    match outcome {
        BreakEven::Reached { day, multiplier, daily_cost, cumulative_cost, reward, net_profit } => {
            println!("Premier jour rentable : {} (multiplicateur {:.2})", day, multiplier);
            println!("  Mise du jour   : {}", daily_cost);
            println!("  Mises cumulées : {}", cumulative_cost);
            println!("  Gain           : {}", reward);
            println!("  Bilan net      : {}", net_profit);
        }
        BreakEven::NotReached { cumulative_cost } => {
            println!("Aucun jour rentable sur {} jours (mises cumulées : {})", max_days, cumulative_cost);
        }
    }
}

pub fn display_monte_carlo(summary: &MonteCarloSummary) {
    println!("Monte-Carlo sur {} essais :", summary.trials);
    println!("  Bilan moyen    : {:.2}", summary.average_profit);
    println!("  Meilleur bilan : {}", summary.max_profit);
    println!("  Pire bilan     : {}", summary.min_profit);
    println!("  Bilans positifs: {:.2}%", summary.positive_rate * 100.0);
}

pub fn display_profit_curve(curve: &[(u32, i64)]) {
    if curve.is_empty() {
        println!("  (Pas de données à afficher)");
        return;
    }
    let points: Vec<(f32, f32)> = curve.iter().map(|&(d, p)| (d as f32, p as f32)).collect();
    let x_max = curve.len().max(2) as f32;
    println!("Bilan net d'un gain au jour d :");
    let shape = Shape::Lines(&points);
    let mut chart = Chart::new(120, 40, 1.0, x_max);
    println!("{}", chart.lineplot(&shape));
}

pub fn display_performance(record: &PerformanceRecord) {
    println!("\n📈 Bilan du tirage du {}", record.date);
    println!("  Mise           : {}", record.invested);
    println!("  Gain           : {}", record.won);
    println!("  Bilan net      : {}", record.profit);
    println!("  Rendement      : {:.2}%", record.roi);
    if record.is_profitable {
        println!("  ✅ Tirage gagnant");
    } else {
        println!("  ❌ Tirage perdant");
    }
}

pub fn display_rl(outcome: &RlOutcome) {
    println!("\n== Préférences apprises ==\n");
    let mut table = new_table(vec!["Rang", "Numéro", "Préférence"]);
    for (rank, (number, pref)) in outcome.preferences.iter().take(10).enumerate() {
        table.add_row(vec![(rank + 1).to_string(), format!("{:2}", number), format!("{:.4}", pref)]);
    }
    println!("{table}");

    let skip = outcome.reward_history.len().saturating_sub(10);
    let last: Vec<String> = outcome.reward_history[skip..].iter().map(|r| format!("{:.3}", r)).collect();
    println!("  10 dernières récompenses : {}", last.join(", "));

    if outcome.reward_history.len() > 1 {
        let points: Vec<(f32, f32)> = outcome
            .reward_history
            .iter()
            .enumerate()
            .map(|(i, r)| (i as f32, *r as f32))
            .collect();
        let shape = Shape::Lines(&points);
        let mut chart = Chart::new(120, 30, 0.0, points.len() as f32);
        println!("{}", chart.lineplot(&shape));
    }
}

pub fn display_report(report: &Report) {
    println!("\n== Rapport du {} ==", report.timestamp);
    if let Some(draw) = &report.draw {
        println!("  Tirage ajouté : {} → {}", draw.date, join_numbers(&draw.numbers));
    }
    let top: Vec<String> = report.fusion_top10.iter().map(|e| e.number.to_string()).collect();
    println!("  Top fusion        : {}", top.join(", "));
    println!("  Connecté          : {} combinaisons, coût {}", report.linked.count, report.linked.total_cost);
    println!("  Colonnes          : {} combinaisons, coût {}", report.column.count, report.column.total_cost);
    let rl: Vec<String> = report.rl_top10.iter().map(|n| n.to_string()).collect();
    println!("  Préférences RL    : {}", rl.join(", "));
}
