use crate::config::{
    SourceConfig, COL_DEPARTMENT, COL_DISTRICT, COL_LATITUDE, COL_LONGITUDE, COL_PERIOD,
    COL_PROVINCE, COL_RURAL_POP, COL_URBAN_POP,
};
use crate::error::{ReportError, Result};
use crate::measures::FRACTIONS;
use crate::normalize::{normalize, RawTable, Table};
use crate::types::{FactRow, FactTable};
use crate::util::{head_count, normalize_key, whole_year};
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

pub const WASTE_SOURCE: &str = "waste";
pub const LOCATION_SOURCE: &str = "location";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub waste_rows: usize,
    pub location_rows: usize,
    pub joined_rows: usize,
    /// Distinct waste districts with no location row.
    pub unmatched_districts: Vec<String>,
    pub coercion_failures: usize,
}

/// Read a delimited source into text cells, decoding it first.
pub fn read_raw(source_name: &'static str, source: &SourceConfig) -> Result<RawTable> {
    let bytes = std::fs::read(&source.path)
        .map_err(|e| ReportError::load(source_name, &source.path, e))?;
    // A UTF-8 byte-order mark is dropped here.
    let text = source.encoding.decode(&bytes).ok_or_else(|| {
        ReportError::load(
            source_name,
            &source.path,
            format!("not valid {} text", source.encoding.name()),
        )
    })?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(source.delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| ReportError::load(source_name, &source.path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut records = Vec::new();
    for result in rdr.records() {
        let rec = result.map_err(|e| ReportError::load(source_name, &source.path, e))?;
        records.push(rec.iter().map(str::to_string).collect());
    }
    debug!(source = source_name, rows = records.len(), "read source");
    Ok(RawTable { headers, records })
}

fn require_columns(
    table: &Table,
    source_name: &'static str,
    source: &SourceConfig,
    columns: &[&str],
) -> Result<()> {
    for column in columns {
        if !table.has_column(column) {
            return Err(ReportError::MissingColumn {
                source_name,
                path: source.path.clone(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Coordinates outside the WGS84 range are treated like unparseable ones.
fn coordinate(value: Option<f64>, limit: f64) -> Option<f64> {
    value.filter(|v| (-limit..=limit).contains(v))
}

/// Load both sources and inner-join them on the district name.
///
/// Output order is deterministic: waste rows in file order, and for each of
/// them the matching location rows in file order.
pub fn load(waste: &SourceConfig, location: &SourceConfig) -> Result<(FactTable, LoadReport)> {
    let mut waste_numeric: Vec<&str> = FRACTIONS.to_vec();
    waste_numeric.push(COL_PERIOD);
    let waste_table = normalize(read_raw(WASTE_SOURCE, waste)?, &waste_numeric);
    require_columns(
        &waste_table,
        WASTE_SOURCE,
        waste,
        &[COL_DEPARTMENT, COL_PROVINCE, COL_DISTRICT, COL_PERIOD],
    )?;
    for fraction in FRACTIONS.iter().filter(|f| !waste_table.has_column(f)) {
        warn!(fraction, "waste source has no column for fraction; treating as missing");
    }

    let location_table = normalize(
        read_raw(LOCATION_SOURCE, location)?,
        &[COL_LATITUDE, COL_LONGITUDE, COL_URBAN_POP, COL_RURAL_POP],
    );
    require_columns(&location_table, LOCATION_SOURCE, location, &[COL_DISTRICT])?;

    let mut by_district: HashMap<String, Vec<usize>> = HashMap::new();
    for row in 0..location_table.row_count() {
        if let Some(name) = location_table.text(COL_DISTRICT, row) {
            by_district.entry(normalize_key(name)).or_default().push(row);
        }
    }

    let mut rows = Vec::new();
    let mut unmatched = BTreeSet::new();
    for w in 0..waste_table.row_count() {
        // Rows without a district name cannot take part in the join.
        let Some(district) = waste_table.text(COL_DISTRICT, w).map(normalize_key) else {
            continue;
        };
        let Some(matches) = by_district.get(&district) else {
            unmatched.insert(district);
            continue;
        };
        let department = normalize_key(waste_table.text(COL_DEPARTMENT, w).unwrap_or_default());
        let province = normalize_key(waste_table.text(COL_PROVINCE, w).unwrap_or_default());
        let period = waste_table.number(COL_PERIOD, w).and_then(whole_year);
        let fractions: Vec<Option<f64>> =
            FRACTIONS.iter().map(|f| waste_table.number(f, w)).collect();

        for &l in matches {
            rows.push(FactRow {
                department: department.clone(),
                province: province.clone(),
                district: district.clone(),
                period,
                fractions: fractions.clone(),
                urban_population: location_number(&location_table, COL_URBAN_POP, l),
                rural_population: location_number(&location_table, COL_RURAL_POP, l),
                latitude: coordinate(location_table.number(COL_LATITUDE, l), 90.0),
                longitude: coordinate(location_table.number(COL_LONGITUDE, l), 180.0),
            });
        }
    }

    let report = LoadReport {
        waste_rows: waste_table.row_count(),
        location_rows: location_table.row_count(),
        joined_rows: rows.len(),
        unmatched_districts: unmatched.into_iter().collect(),
        coercion_failures: waste_table.total_coercion_failures()
            + location_table.total_coercion_failures(),
    };
    if !report.unmatched_districts.is_empty() {
        debug!(
            count = report.unmatched_districts.len(),
            "waste districts without a location row were left out of the join"
        );
    }
    info!(
        waste_rows = report.waste_rows,
        location_rows = report.location_rows,
        joined_rows = report.joined_rows,
        coercion_failures = report.coercion_failures,
        "loaded fact table"
    );
    Ok((FactTable::new(rows), report))
}

fn location_number(table: &Table, column: &str, row: usize) -> Option<u64> {
    table.number(column, row).and_then(head_count)
}
