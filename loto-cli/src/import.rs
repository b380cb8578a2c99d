use anyhow::{Context, Result};
use loto_db::rusqlite::Connection;
use std::path::Path;

use loto_db::db::{upsert_draw, UpsertOutcome};
use loto_db::models::{parse_numbers_safely, Draw};

/// Ligne `date,n1,n2,...` ; les numéros peuvent aussi tenir dans un seul champ (`"3,8,15,22,39"`).
fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let raw_date = record
        .get(0)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .context("Date manquante")?;

    let numbers: Vec<u8> = record
        .iter()
        .skip(1)
        .flat_map(parse_numbers_safely)
        .collect();

    Draw::new(raw_date, &numbers)
}

#[derive(Debug, Default)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub replaced: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    import_reader(conn, reader)
}

fn import_reader<R: std::io::Read>(conn: &Connection, mut reader: csv::Reader<R>) -> Result<ImportResult> {
    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        let draw = match record_result.map_err(anyhow::Error::from).and_then(|r| parse_record(&r)) {
            Ok(draw) => draw,
            Err(e) => {
                log::warn!("ligne {} ignorée : {:#}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };
        match upsert_draw(&tx, &draw) {
            Ok(UpsertOutcome::Inserted) => result.inserted += 1,
            Ok(UpsertOutcome::Replaced) => result.replaced += 1,
            Err(e) => {
                log::warn!("insertion du tirage {} impossible : {:#}", draw.date, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loto_db::db::{count_draws, fetch_last_draws, migrate};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes())
    }

    #[test]
    fn test_import_columns_and_single_field() {
        let conn = setup();
        let data = "date,numbers\n2024-01-02,3,8,15,22,39\n2024/01/03,\"1, 2, 3, 4, 5\"\n";
        let result = import_reader(&conn, reader(data)).unwrap();
        assert_eq!(result.total_records, 2);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.errors, 0);

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws[0].date, "2024-01-03");
        assert_eq!(draws[1].numbers, [3, 8, 15, 22, 39]);
    }

    #[test]
    fn test_import_counts_errors() {
        let conn = setup();
        let data = "date,numbers\n2024-01-02,3,8,15,22\nhier,1,2,3,4,5\n2024-01-04,1,2,3,4,40\n2024-01-05,1,2,3,4,5\n";
        let result = import_reader(&conn, reader(data)).unwrap();
        assert_eq!(result.total_records, 4);
        assert_eq!(result.errors, 3);
        assert_eq!(result.inserted, 1);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_import_replaces_same_date() {
        let conn = setup();
        let data = "date,numbers\n2024-01-02,3,8,15,22,39\n02/01/2024,1,2,3,4,5\n";
        let result = import_reader(&conn, reader(data)).unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.replaced, 1);
        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws[0].numbers, [1, 2, 3, 4, 5]);
    }
}
