use crate::error::{ReportError, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| ReportError::output(path, e))?;
    for r in rows {
        wtr.serialize(r).map_err(|e| ReportError::output(path, e))?;
    }
    wtr.flush().map_err(|e| ReportError::output(path, e))?;
    debug!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).map_err(|e| ReportError::output(path, e))?;
    std::fs::write(path, s).map_err(|e| ReportError::output(path, e))?;
    debug!(path = %path.display(), "wrote json");
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankingRow;

    fn rows() -> Vec<RankingRow> {
        vec![
            RankingRow { rank: 1, name: "MIRAFLORES".into(), tonnes: "120.50".into() },
            RankingRow { rank: 2, name: "SURCO".into(), tonnes: "98.00".into() },
        ]
    }

    #[test]
    fn csv_uses_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.csv");
        write_csv(&path, &rows()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Rank,Name,Tonnes\n1,MIRAFLORES,120.50\n2,SURCO,98.00\n");
    }

    #[test]
    fn json_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &rows()[0]).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["Name"], "MIRAFLORES");
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.csv");
        let err = write_csv(&path, &rows()).unwrap_err();
        assert!(matches!(err, ReportError::Output { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn preview_is_truncated_markdown() {
        let text = render_table(&rows(), 1);
        assert!(text.contains("MIRAFLORES"));
        assert!(!text.contains("SURCO"));
        assert!(text.lines().next().unwrap().starts_with('|'));
        assert_eq!(render_table::<RankingRow>(&[], 5), "(no rows)");
    }
}
