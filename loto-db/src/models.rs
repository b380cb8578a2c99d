use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Numéros 1 à 39.
pub const POOL_SIZE: u8 = 39;
/// Cinq numéros par tirage.
pub const PICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Draw {
    /// Date normalisée `YYYY-MM-DD`.
    pub date: String,
    /// Numéros triés par ordre croissant.
    pub numbers: [u8; PICK_COUNT],
}

impl Draw {
    pub fn new(date: &str, numbers: &[u8]) -> Result<Self> {
        validate_numbers(numbers)?;
        let mut sorted = [0u8; PICK_COUNT];
        sorted.copy_from_slice(numbers);
        sorted.sort();
        Ok(Self {
            date: standardize_date(date)?,
            numbers: sorted,
        })
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    /// Représentation `01,05,12,30,39`.
    pub fn numbers_label(&self) -> String {
        self.numbers
            .iter()
            .map(|n| format!("{:02}", n))
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub fn validate_numbers(numbers: &[u8]) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        bail!("{} numéros attendus, {} reçus", PICK_COUNT, numbers.len());
    }
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro {} hors limites (1-{})", n, POOL_SIZE);
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}

/// Extrait toutes les suites de chiffres d'une saisie libre (`"3, 15 22-30 39"`).
pub fn parse_numbers_safely(input: &str) -> Vec<u8> {
    input
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<u8>().ok())
        .collect()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d/%m/%Y"];

/// Normalise une date en `YYYY-MM-DD`.
pub fn standardize_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date.format("%Y-%m-%d").to_string());
        }
    }
    bail!("Format de date invalide: '{}'", raw)
}
