use std::path::Path;

use anyhow::{Context, Result};

use super::{FeatureRow, FEATURE_NAMES};

/// Écrit la table au format `date,number,<features>,is_drawn`.
pub fn write_feature_csv(rows: &[FeatureRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    write_rows(&mut writer, rows)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, rows: &[FeatureRow]) -> Result<()> {
    let mut header = vec!["date", "number"];
    header.extend_from_slice(FEATURE_NAMES);
    header.push("is_drawn");
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.date.clone(), row.number.to_string()];
        record.extend(row.features.iter().map(|v| format_value(*v)));
        record.push(format_value(row.label));
        writer.write_record(&record)?;
    }
    Ok(())
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.6}", v)
    }
}
