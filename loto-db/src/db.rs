use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Draw, PICK_COUNT};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    date      TEXT PRIMARY KEY,
    number_1  INTEGER NOT NULL,
    number_2  INTEGER NOT NULL,
    number_3  INTEGER NOT NULL,
    number_4  INTEGER NOT NULL,
    number_5  INTEGER NOT NULL
);
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("loto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Un tirage déjà présent pour la même date est remplacé.
pub fn upsert_draw(conn: &Connection, draw: &Draw) -> Result<UpsertOutcome> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM draws WHERE date = ?1)",
        [&draw.date],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO draws (date, number_1, number_2, number_3, number_4, number_5)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            draw.date,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
        ],
    ).context("Échec de l'insertion")?;

    Ok(if exists { UpsertOutcome::Replaced } else { UpsertOutcome::Inserted })
}

fn row_to_draw(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draw> {
    let mut numbers = [0u8; PICK_COUNT];
    for (i, slot) in numbers.iter_mut().enumerate() {
        *slot = row.get::<_, u8>(i + 1)?;
    }
    Ok(Draw {
        date: row.get(0)?,
        numbers,
    })
}

/// Derniers tirages, le plus récent en premier.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT date, number_1, number_2, number_3, number_4, number_5
         FROM draws ORDER BY date DESC LIMIT ?1"
    )?;
    let draws = stmt.query_map([limit], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Tirages entre deux dates incluses, du plus ancien au plus récent.
pub fn fetch_draws_between(conn: &Connection, start: &str, end: &str) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT date, number_1, number_2, number_3, number_4, number_5
         FROM draws WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC"
    )?;
    let draws = stmt.query_map([start, end], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn latest_date(conn: &Connection) -> Result<Option<String>> {
    let date: Option<String> = conn.query_row("SELECT MAX(date) FROM draws", [], |row| row.get(0))?;
    Ok(date)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
