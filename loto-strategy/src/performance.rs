//! Bilan d'un tirage joué : mise, gain, rendement.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub date: String,
    pub invested: u64,
    pub won: u64,
    pub profit: i64,
    /// Rendement en pourcentage, arrondi au centième ; 0 sans mise.
    pub roi: f64,
    pub is_profitable: bool,
    #[serde(default)]
    pub notes: String,
}

pub fn evaluate_performance(date: &str, invested: u64, won: u64, notes: &str) -> PerformanceRecord {
    let profit = won as i64 - invested as i64;
    let roi = if invested > 0 {
        let raw = (won as f64 / invested as f64 - 1.0) * 100.0;
        (raw * 100.0).round_ties_even() / 100.0
    } else {
        0.0
    };
    PerformanceRecord {
        date: date.to_string(),
        invested,
        won,
        profit,
        roi,
        is_profitable: profit > 0,
        notes: notes.to_string(),
    }
}

/// Ajoute l'enregistrement au journal, une ligne JSON par tirage.
pub fn append_performance_log(path: &Path, record: &PerformanceRecord) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    writeln!(file, "{}", serde_json::to_string(record)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profitable_draw() {
        let record = evaluate_performance("2024-03-05", 300, 1000, "");
        assert_eq!(record.profit, 700);
        assert!((record.roi - 233.33).abs() < 1e-9);
        assert!(record.is_profitable);
    }

    #[test]
    fn test_losing_draw() {
        let record = evaluate_performance("2024-03-05", 400, 100, "colonnes");
        assert_eq!(record.profit, -300);
        assert_eq!(record.roi, -75.0);
        assert!(!record.is_profitable);
        assert_eq!(record.notes, "colonnes");
    }

    #[test]
    fn test_nothing_invested() {
        let record = evaluate_performance("2024-03-05", 0, 0, "");
        assert_eq!(record.roi, 0.0);
        assert_eq!(record.profit, 0);
        assert!(!record.is_profitable);

        let lucky = evaluate_performance("2024-03-05", 0, 500, "");
        assert_eq!(lucky.roi, 0.0);
        assert!(lucky.is_profitable);
    }

    #[test]
    fn test_break_even_is_not_profitable() {
        let record = evaluate_performance("2024-03-05", 250, 250, "");
        assert_eq!(record.roi, 0.0);
        assert!(!record.is_profitable);
    }

    #[test]
    fn test_log_appends_json_lines() {
        let path = std::env::temp_dir().join(format!("loto_perf_{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        append_performance_log(&path, &evaluate_performance("2024-03-05", 300, 0, "")).unwrap();
        append_performance_log(&path, &evaluate_performance("2024-03-06", 300, 900, "")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<PerformanceRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].profit, 600);
        std::fs::remove_file(&path).unwrap();
    }
}
