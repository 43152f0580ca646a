// Group-and-sum rollups over one waste fraction.
//
// Missing readings are skipped by the sum (a group with nothing but missing
// readings totals 0). Compare `delta`, where a missing reading means zero
// generation.
use crate::error::Result;
use crate::measures::Measure;
use crate::types::{FactRow, FactTable};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Department,
    Province,
    District,
}

impl Level {
    fn key(self, row: &FactRow) -> &str {
        match self {
            Level::Department => &row.department,
            Level::Province => &row.province,
            Level::District => &row.district,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    pub total: f64,
}

/// Sum `measure` per group at `level`, largest total first, ties by name.
pub fn aggregate_by(table: &FactTable, measure: &str, level: Level) -> Result<Vec<GroupTotal>> {
    let measure = Measure::parse(measure)?;
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for row in table.rows() {
        let total = groups.entry(level.key(row)).or_insert(0.0);
        if let Some(v) = row.value(measure) {
            *total += v;
        }
    }
    let mut ranked: Vec<GroupTotal> = groups
        .into_iter()
        .map(|(name, total)| GroupTotal {
            name: name.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    debug!(%measure, ?level, groups = ranked.len(), "aggregated");
    Ok(ranked)
}

pub fn aggregate_by_district(table: &FactTable, measure: &str) -> Result<Vec<GroupTotal>> {
    aggregate_by(table, measure, Level::District)
}

pub fn aggregate_by_province(table: &FactTable, measure: &str) -> Result<Vec<GroupTotal>> {
    aggregate_by(table, measure, Level::Province)
}
