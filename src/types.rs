use crate::measures::{Measure, FRACTIONS};
use serde::Serialize;
use tabled::Tabled;

/// One (district, period) observation after the join.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub department: String,
    pub province: String,
    pub district: String,
    pub period: Option<i32>,
    /// One slot per entry of `FRACTIONS`, `None` where the cell was empty or
    /// unparseable.
    pub fractions: Vec<Option<f64>>,
    pub urban_population: Option<u64>,
    pub rural_population: Option<u64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl FactRow {
    pub fn value(&self, measure: Measure) -> Option<f64> {
        self.fractions.get(measure.index()).copied().flatten()
    }
}

/// The unified fact table. Never mutated once built; filters hand back new,
/// smaller tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactTable {
    rows: Vec<FactRow>,
}

impl FactTable {
    pub fn new(rows: Vec<FactRow>) -> Self {
        debug_assert!(rows.iter().all(|r| r.fractions.len() == FRACTIONS.len()));
        FactTable { rows }
    }

    pub fn rows(&self) -> &[FactRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy out the rows matching `keep` into a fresh table.
    pub fn subset<F>(&self, keep: F) -> FactTable
    where
        F: Fn(&FactRow) -> bool,
    {
        FactTable {
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Tonnes")]
    #[tabled(rename = "Tonnes")]
    pub tonnes: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DeltaRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "District")]
    #[tabled(rename = "District")]
    pub district: String,
    #[serde(rename = "From")]
    #[tabled(rename = "From")]
    pub value_a: String,
    #[serde(rename = "To")]
    #[tabled(rename = "To")]
    pub value_b: String,
    #[serde(rename = "Delta")]
    #[tabled(rename = "Delta")]
    pub delta: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CompositionRow {
    #[serde(rename = "Fraction")]
    #[tabled(rename = "Fraction")]
    pub fraction: String,
    #[serde(rename = "Tonnes")]
    #[tabled(rename = "Tonnes")]
    pub tonnes: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub department: Option<String>,
    pub province: Option<String>,
    pub period: Option<i32>,
    pub measure: String,
    pub rows_in_scope: usize,
    pub districts_in_scope: usize,
    pub total_tonnes: f64,
    pub top_district: Option<String>,
    pub delta_periods: Option<(i32, i32)>,
    pub net_delta: Option<f64>,
    pub views_failed: Vec<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Fact row with every fraction missing except the ones given.
    pub fn fact(
        department: &str,
        province: &str,
        district: &str,
        period: i32,
        values: &[(&str, f64)],
    ) -> FactRow {
        let mut fractions = vec![None; FRACTIONS.len()];
        for (name, v) in values {
            let m = Measure::parse(name).expect("fixture uses a known fraction");
            fractions[m.index()] = Some(*v);
        }
        FactRow {
            department: department.to_string(),
            province: province.to_string(),
            district: district.to_string(),
            period: Some(period),
            fractions,
            urban_population: None,
            rural_population: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Two departments, three provinces, a few districts over 2019 and 2023.
    pub fn sample_table() -> FactTable {
        FactTable::new(vec![
            fact("LIMA", "LIMA", "MIRAFLORES", 2019, &[("QRESIDUOS_ALIMENTOS", 70.5), ("QRESIDUOS_PAPEL_BLANCO", 4.0)]),
            fact("LIMA", "LIMA", "MIRAFLORES", 2023, &[("QRESIDUOS_ALIMENTOS", 50.0), ("QRESIDUOS_PAPEL_BLANCO", 6.0)]),
            fact("LIMA", "LIMA", "SURCO", 2019, &[("QRESIDUOS_ALIMENTOS", 40.0)]),
            fact("LIMA", "LIMA", "SURCO", 2023, &[("QRESIDUOS_ALIMENTOS", 58.0)]),
            fact("LIMA", "LIMA", "BARRANCO", 2023, &[]),
            fact("LIMA", "HUAURA", "HUACHO", 2019, &[("QRESIDUOS_ALIMENTOS", 300.0)]),
            fact("CUSCO", "CUSCO", "CUSCO", 2019, &[("QRESIDUOS_PAPEL_BLANCO", 50.0)]),
            fact("CUSCO", "CUSCO", "CUSCO", 2023, &[]),
            fact("CUSCO", "CUSCO", "WANCHAQ", 2019, &[("QRESIDUOS_PAPEL_BLANCO", 10.0)]),
            fact("CUSCO", "CUSCO", "WANCHAQ", 2023, &[("QRESIDUOS_PAPEL_BLANCO", 25.0)]),
            fact("CUSCO", "URUBAMBA", "OLLANTAYTAMBO", 2023, &[("QRESIDUOS_PAPEL_BLANCO", 3.0)]),
        ])
    }
}
